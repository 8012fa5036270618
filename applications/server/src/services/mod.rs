/// Server services
pub mod transcoding;

pub use transcoding::{TranscodingLoader, TranscodingService};

use crate::config::TranscodingSettings;
use airwave_core::TrackLoader;
use airwave_metadata::FileTrackLoader;
use std::sync::Arc;

/// Track loader for the configured transcoding mode
///
/// Tracks go through FFmpeg when transcoding is enabled and are read as-is
/// otherwise.
pub fn track_loader(settings: &TranscodingSettings) -> Arc<dyn TrackLoader> {
    if settings.enabled {
        tracing::info!(
            "Normalizing tracks to {}k MP3 with {}",
            settings.bitrate_kbps,
            settings.ffmpeg_path.display()
        );
        Arc::new(TranscodingLoader::new(TranscodingService::new(
            settings.ffmpeg_path.clone(),
            settings.bitrate_kbps,
        )))
    } else {
        Arc::new(FileTrackLoader::default())
    }
}
