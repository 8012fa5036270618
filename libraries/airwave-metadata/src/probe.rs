/// Metadata probe implementation using lofty
use crate::error::MetadataError;
use airwave_core::{LoadError, TrackId, TrackProbe, TrackTiming};
use lofty::AudioFile;
use std::io::Cursor;

/// Probe that reads stream properties with the lofty library
///
/// Bitrate comes from the audio stream when lofty reports it, otherwise from
/// the overall file bitrate. Missing values are reported as zero and rejected
/// later by `Track::new`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyProbe;

impl LoftyProbe {
    /// Create a new probe
    pub fn new() -> Self {
        Self
    }

    /// Read timing from an in-memory payload
    fn read_timing(payload: &[u8]) -> Result<TrackTiming, MetadataError> {
        let probe = lofty::Probe::new(Cursor::new(payload)).guess_file_type()?;

        if probe.file_type().is_none() {
            return Err(MetadataError::UnsupportedFormat(
                "unrecognized audio container".to_string(),
            ));
        }

        let tagged_file = probe.read()?;
        let properties = tagged_file.properties();

        // lofty reports kbps
        let kbps = properties
            .audio_bitrate()
            .filter(|kbps| *kbps > 0)
            .or_else(|| properties.overall_bitrate())
            .unwrap_or(0);

        Ok(TrackTiming::new(
            properties.duration(),
            kbps.saturating_mul(1000),
        ))
    }
}

impl TrackProbe for LoftyProbe {
    fn probe(&self, id: &TrackId, payload: &[u8]) -> Result<TrackTiming, LoadError> {
        Self::read_timing(payload).map_err(|e| e.into_load_error(id))
    }
}
