//! Chart descriptor parsing.
//!
//! A descriptor is everything the index needs to know about one chart file:
//! display metadata, per-tier difficulty levels and the names of the assets
//! the chart references. Parsing is behind the [`DescriptorParser`] trait;
//! [`SrtbParser`] reads Spin Rhythm XD `.srtb` files.

mod clip;
mod error;
mod srtb;
mod types;

pub use clip::probe_clip_duration;
pub use error::ParseError;
pub use srtb::SrtbParser;
pub use types::{ChartDescriptor, ChartDifficulty};

use std::path::Path;

/// Reads chart files into descriptors.
pub trait DescriptorParser: Send + Sync {
    /// Parse the chart file at `path`.
    fn parse(&self, path: &Path) -> Result<ChartDescriptor, ParseError>;

    /// Fill in `clip_duration` by inspecting the clip the descriptor references.
    fn read_clip_metadata(&self, descriptor: &mut ChartDescriptor) -> Result<(), ParseError>;
}
