/// Core error types for Airwave
use crate::types::TrackId;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a track identifier into a broadcast-ready track
///
/// These errors are always absorbed by the engine: the station skips to the
/// next identifier instead of stopping.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The audio file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Metadata could not be extracted from the payload
    #[error("Failed to probe {id}: {reason}")]
    Probe {
        /// Track that failed
        id: TrackId,
        /// Probe failure description
        reason: String,
    },

    /// Duration is missing or zero
    #[error("Track has no usable duration: {0}")]
    MissingDuration(TrackId),

    /// Bitrate is missing or zero
    #[error("Track has no usable bitrate: {0}")]
    MissingBitrate(TrackId),

    /// The file contained no bytes
    #[error("Track payload is empty: {0}")]
    EmptyPayload(TrackId),

    /// External bitrate normalization failed
    #[error("Failed to transcode {id}: {reason}")]
    Transcode {
        /// Track that failed
        id: TrackId,
        /// Transcoder failure description
        reason: String,
    },
}

impl LoadError {
    /// Create a probe error
    pub fn probe(id: TrackId, reason: impl Into<String>) -> Self {
        Self::Probe {
            id,
            reason: reason.into(),
        }
    }

    /// Create a transcode error
    pub fn transcode(id: TrackId, reason: impl Into<String>) -> Self {
        Self::Transcode {
            id,
            reason: reason.into(),
        }
    }
}

/// Failure to list the track source
///
/// Treated as an empty playlist by the playlist store.
#[derive(Error, Debug)]
#[error("Failed to scan {location}: {reason}")]
pub struct ScanError {
    /// Where the scan was attempted (directory path)
    pub location: String,
    /// Scan failure description
    pub reason: String,
}

impl ScanError {
    /// Create a scan error
    pub fn new(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Station-level outcomes visible to callers of the engine
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationError {
    /// No track is available (station is idle)
    #[error("No audio files in the playlist.")]
    EmptyPlaylist,

    /// A track is being loaded and nothing is playing yet
    #[error("Next track is still loading")]
    TrackNotReady,

    /// The engine task is no longer running
    #[error("Station is not running")]
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_messages_name_the_track() {
        let err = LoadError::MissingBitrate(TrackId::new("music/a.mp3"));
        assert_eq!(err.to_string(), "Track has no usable bitrate: music/a.mp3");

        let err = LoadError::probe(TrackId::new("b.mp3"), "not an mpeg stream");
        assert_eq!(err.to_string(), "Failed to probe b.mp3: not an mpeg stream");
    }

    #[test]
    fn empty_playlist_message_matches_http_body() {
        assert_eq!(
            StationError::EmptyPlaylist.to_string(),
            "No audio files in the playlist."
        );
    }
}
