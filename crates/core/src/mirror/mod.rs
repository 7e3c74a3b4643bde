//! Hard link mirror of the custom charts folder.
//!
//! The mirror holds hard links to a chosen subset of charts together with the
//! album art and clips they reference:
//!
//! ```text
//! {mirror}/*.srtb
//! {mirror}/AlbumArt/*
//! {mirror}/AudioClips/*
//! ```
//!
//! [`HardlinkMirror::reconcile`] prunes files no target refers to and then
//! links every target. Link creation goes through the [`Linker`] trait.
//!
//! # Example
//!
//! ```ignore
//! use chartlink_core::mirror::HardlinkMirror;
//!
//! let mirror = HardlinkMirror::new("/games/srxd/Custom", "/games/srxd/chart_hardlinks");
//! let outcome = mirror.reconcile(&targets, |idx, total| println!("{}/{}", idx + 1, total))?;
//! if outcome.has_error {
//!     eprintln!("{}", outcome.error_message.unwrap_or_default());
//! }
//! ```

mod error;
mod layout;
mod linker;
mod reconciler;
mod types;

pub use error::MirrorError;
pub use layout::{
    find_asset, list_chart_files, list_files, AssetKind, ChartsLayout, ALBUM_ART_DIR,
    AUDIO_CLIPS_DIR, CHART_EXTENSION,
};
pub use linker::{is_cross_device, FsLinker, LinkOutcome, Linker};
pub use reconciler::{HardlinkMirror, CROSS_VOLUME_MESSAGE};
pub use types::{PruneSummary, SyncOutcome};
