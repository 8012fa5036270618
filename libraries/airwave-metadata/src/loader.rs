/// File-backed track loader
use crate::probe::LoftyProbe;
use airwave_core::{LoadError, Track, TrackId, TrackLoader, TrackProbe};
use async_trait::async_trait;
use std::sync::Arc;

/// Probe a payload off the async runtime and build a ready `Track`
///
/// Shared by every loader so timing validation happens in exactly one place
/// (`Track::new`).
///
/// # Errors
/// Returns the probe's error, or the `Track::new` validation error
pub async fn probe_into_track(
    probe: Arc<dyn TrackProbe>,
    id: &TrackId,
    payload: Vec<u8>,
) -> Result<Track, LoadError> {
    let probe_id = id.clone();
    let (payload, timing) = tokio::task::spawn_blocking(move || {
        let timing = probe.probe(&probe_id, &payload);
        (payload, timing)
    })
    .await
    .map_err(|e| LoadError::probe(id.clone(), format!("probe task failed: {}", e)))?;

    let timing = timing?;
    tracing::debug!(
        "Probed {}: {:?} at {} bps ({} bytes)",
        id,
        timing.duration,
        timing.bitrate,
        payload.len()
    );

    Track::new(id.clone(), payload, timing)
}

/// Loads tracks by reading the whole file and probing it
#[derive(Clone)]
pub struct FileTrackLoader {
    probe: Arc<dyn TrackProbe>,
}

impl FileTrackLoader {
    /// Create a loader with a custom probe
    pub fn new(probe: Arc<dyn TrackProbe>) -> Self {
        Self { probe }
    }

    /// Probe used by this loader
    pub fn probe(&self) -> Arc<dyn TrackProbe> {
        Arc::clone(&self.probe)
    }
}

impl Default for FileTrackLoader {
    fn default() -> Self {
        Self::new(Arc::new(LoftyProbe::new()))
    }
}

#[async_trait]
impl TrackLoader for FileTrackLoader {
    async fn load(&self, id: &TrackId) -> Result<Track, LoadError> {
        let payload = tokio::fs::read(id.path())
            .await
            .map_err(|source| LoadError::Io {
                path: id.path().to_path_buf(),
                source,
            })?;

        probe_into_track(self.probe(), id, payload).await
    }
}
