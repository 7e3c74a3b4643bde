//! Clip length probing.

use std::path::Path;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use super::error::ParseError;

/// Length of the audio file at `path` in whole seconds.
///
/// Only container headers are read; nothing is decoded.
pub fn probe_clip_duration(path: &Path) -> Result<u32, ParseError> {
    let file = std::fs::File::open(path).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ParseError::clip_probe(path, e))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ParseError::clip_probe(path, "no audio track"))?;

    let params = &track.codec_params;
    let sample_rate = params
        .sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| ParseError::clip_probe(path, "unknown sample rate"))?;
    let n_frames = params
        .n_frames
        .ok_or_else(|| ParseError::clip_probe(path, "unknown frame count"))?;

    let seconds = n_frames / u64::from(sample_rate);
    debug!(
        "Clip {}: {} frames at {} Hz = {}s",
        path.display(),
        n_frames,
        sample_rate,
        seconds
    );

    u32::try_from(seconds).map_err(|_| ParseError::clip_probe(path, "duration out of range"))
}
