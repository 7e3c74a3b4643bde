//! Hard link creation and error classification.

use std::io;
use std::path::Path;

/// Creates and removes hard links.
///
/// Implementations must behave like [`std::fs::hard_link`] and
/// [`std::fs::remove_file`].
pub trait Linker: Send + Sync {
    fn hard_link(&self, source: &Path, destination: &Path) -> io::Result<()>;

    fn remove_link(&self, path: &Path) -> io::Result<()>;
}

/// Links through the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLinker;

impl Linker for FsLinker {
    fn hard_link(&self, source: &Path, destination: &Path) -> io::Result<()> {
        std::fs::hard_link(source, destination)
    }

    fn remove_link(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// How a link attempt ended.
#[derive(Debug)]
pub enum LinkOutcome {
    Created,
    /// The destination name was already taken.
    AlreadyExists,
    SourceMissing,
    /// Source and destination are on different volumes.
    CrossDevice(io::Error),
    Failed(io::Error),
}

impl LinkOutcome {
    pub fn classify(result: io::Result<()>) -> Self {
        match result {
            Ok(()) => LinkOutcome::Created,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => LinkOutcome::AlreadyExists,
            Err(e) if e.kind() == io::ErrorKind::NotFound => LinkOutcome::SourceMissing,
            Err(e) if is_cross_device(&e) => LinkOutcome::CrossDevice(e),
            Err(e) => LinkOutcome::Failed(e),
        }
    }
}

/// EXDEV on unix, ERROR_NOT_SAME_DEVICE on Windows.
pub fn is_cross_device(e: &io::Error) -> bool {
    const CROSS_DEVICE_CODE: i32 = if cfg!(windows) { 17 } else { 18 };
    e.kind() == io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(CROSS_DEVICE_CODE)
}
