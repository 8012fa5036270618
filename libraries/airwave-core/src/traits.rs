/// Core traits for Airwave
///
/// These are the seams between the broadcast engine and the outside world:
/// metadata extraction and track loading. Both are treated as black boxes by
/// the engine.
use crate::error::{LoadError, ScanError};
use crate::types::{Track, TrackId, TrackTiming};
use async_trait::async_trait;

/// Track source
///
/// Produces the ordered list of playable identifiers (e.g. a music directory).
pub trait TrackSource: Send + Sync {
    /// List playable tracks in playback order
    ///
    /// # Errors
    /// Returns a `ScanError` if the source cannot be listed
    fn list_tracks(&self) -> Result<Vec<TrackId>, ScanError>;
}

/// Metadata probe
///
/// Extracts `(duration, bitrate)` from an encoded audio payload. Implementations
/// may return zero values; `Track::new` rejects them.
pub trait TrackProbe: Send + Sync {
    /// Probe a payload belonging to `id`
    ///
    /// # Errors
    /// Returns `LoadError::Probe` if the payload cannot be parsed
    fn probe(&self, id: &TrackId, payload: &[u8]) -> Result<TrackTiming, LoadError>;
}

/// Track loader
///
/// Resolves an identifier into a fully valid `Track`. A loader never returns a
/// partially populated track: either every field is valid or an error is
/// returned.
///
/// Loading may block on disk or external processes; the engine always runs it
/// off the tick loop.
#[async_trait]
pub trait TrackLoader: Send + Sync {
    /// Load the track identified by `id`
    ///
    /// # Errors
    /// Returns a `LoadError` if the payload cannot be read or its timing is unknown
    async fn load(&self, id: &TrackId) -> Result<Track, LoadError>;
}
