//! Domain types for the station

use crate::error::LoadError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Track identifier
///
/// Tracks are identified by the path of their audio file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(PathBuf);

impl TrackId {
    /// Create a new track ID
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Get the underlying path
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Human-readable name (file basename)
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for TrackId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for TrackId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Timing metadata of an encoded track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTiming {
    /// Total playback duration
    pub duration: Duration,

    /// Encoded bitrate in bits per second
    pub bitrate: u32,
}

impl TrackTiming {
    /// Create timing metadata
    pub fn new(duration: Duration, bitrate: u32) -> Self {
        Self { duration, bitrate }
    }
}

/// A track that is ready to be broadcast
///
/// Fields are private: the only way to obtain a `Track` is `Track::new`,
/// which guarantees a non-empty payload, a positive duration, and a positive
/// bitrate.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    payload: Bytes,
    timing: TrackTiming,
}

impl Track {
    /// Build a ready track
    ///
    /// # Errors
    /// - `LoadError::EmptyPayload` if the payload has no bytes
    /// - `LoadError::MissingDuration` if the duration is zero
    /// - `LoadError::MissingBitrate` if the bitrate is zero
    pub fn new(
        id: TrackId,
        payload: impl Into<Bytes>,
        timing: TrackTiming,
    ) -> Result<Self, LoadError> {
        let payload = payload.into();

        if payload.is_empty() {
            return Err(LoadError::EmptyPayload(id));
        }
        if timing.duration.is_zero() {
            return Err(LoadError::MissingDuration(id));
        }
        if timing.bitrate == 0 {
            return Err(LoadError::MissingBitrate(id));
        }

        Ok(Self {
            id,
            payload,
            timing,
        })
    }

    /// Track identifier
    pub fn id(&self) -> &TrackId {
        &self.id
    }

    /// Human-readable name (file basename)
    pub fn name(&self) -> String {
        self.id.name()
    }

    /// Full encoded payload
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload length in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Timing metadata
    pub fn timing(&self) -> TrackTiming {
        self.timing
    }

    /// Total playback duration
    pub fn duration(&self) -> Duration {
        self.timing.duration
    }

    /// Bitrate in bits per second
    pub fn bitrate(&self) -> u32 {
        self.timing.bitrate
    }
}

/// How the playlist picks the next track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Next index, wrapping at the end
    #[default]
    Sequential,

    /// Uniformly random index
    Random,
}

/// Station state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationState {
    /// No playlist loaded or playlist empty
    #[default]
    Idle,

    /// Track fetch in flight (or waiting to retry)
    Loading,

    /// Current track is being delivered
    Playing,

    /// Current track exhausted, selecting the next one
    Advancing,
}

impl StationState {
    /// Lowercase state name
    pub fn as_str(&self) -> &'static str {
        match self {
            StationState::Idle => "idle",
            StationState::Loading => "loading",
            StationState::Playing => "playing",
            StationState::Advancing => "advancing",
        }
    }
}

impl fmt::Display for StationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
