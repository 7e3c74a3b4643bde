//! Mock linker for testing.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::mirror::Linker;

#[derive(Debug, Clone, Copy)]
enum InjectedFailure {
    Os(i32),
    Kind(io::ErrorKind),
}

impl InjectedFailure {
    fn to_error(self) -> io::Error {
        match self {
            InjectedFailure::Os(code) => io::Error::from_raw_os_error(code),
            InjectedFailure::Kind(kind) => io::Error::from(kind),
        }
    }
}

/// Linker that creates and removes real hard links except where a failure
/// was injected.
///
/// Failures are keyed by file name, so a test can make a single chart or
/// asset fail with any OS error, such as `EXDEV` (18).
///
/// # Example
///
/// ```rust,ignore
/// use chartlink_core::testing::MockLinker;
///
/// let linker = MockLinker::new().fail_with_os_error("B.srtb", 18);
/// let mirror = HardlinkMirror::with_linker(source, mirror_dir, linker);
/// ```
#[derive(Debug, Default)]
pub struct MockLinker {
    failures: Mutex<HashMap<OsString, InjectedFailure>>,
    removal_failures: Mutex<HashMap<OsString, InjectedFailure>>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl MockLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail links whose destination is named `file_name` with a raw OS error.
    pub fn fail_with_os_error(self, file_name: &str, code: i32) -> Self {
        self.inject(file_name, InjectedFailure::Os(code));
        self
    }

    /// Fail links whose destination is named `file_name` with an error of `kind`.
    pub fn fail_with_kind(self, file_name: &str, kind: io::ErrorKind) -> Self {
        self.inject(file_name, InjectedFailure::Kind(kind));
        self
    }

    /// Fail removal of files named `file_name` with an error of `kind`.
    pub fn fail_removal_with_kind(self, file_name: &str, kind: io::ErrorKind) -> Self {
        self.removal_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(OsString::from(file_name), InjectedFailure::Kind(kind));
        self
    }

    /// Every `(source, destination)` pair passed to `hard_link`, in order.
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn inject(&self, file_name: &str, failure: InjectedFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(OsString::from(file_name), failure);
    }
}

impl Linker for MockLinker {
    fn hard_link(&self, source: &Path, destination: &Path) -> io::Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((source.to_path_buf(), destination.to_path_buf()));

        let injected = destination.file_name().and_then(|name| {
            self.failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(name)
                .copied()
        });

        match injected {
            Some(failure) => Err(failure.to_error()),
            None => std::fs::hard_link(source, destination),
        }
    }

    fn remove_link(&self, path: &Path) -> io::Result<()> {
        let injected = path.file_name().and_then(|name| {
            self.removal_failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(name)
                .copied()
        });

        match injected {
            Some(failure) => Err(failure.to_error()),
            None => std::fs::remove_file(path),
        }
    }
}
