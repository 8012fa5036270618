/// Transcoding service - FFmpeg wrapper that normalizes tracks to constant-bitrate MP3
use crate::error::{Result, ServerError};
use airwave_core::{LoadError, Track, TrackId, TrackLoader, TrackProbe};
use airwave_metadata::{probe_into_track, LoftyProbe};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct TranscodingService {
    ffmpeg_path: PathBuf,
    bitrate_kbps: u32,
}

impl TranscodingService {
    pub fn new(ffmpeg_path: PathBuf, bitrate_kbps: u32) -> Self {
        Self {
            ffmpeg_path,
            bitrate_kbps,
        }
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    /// FFmpeg arguments that write `input` as MP3 to stdout
    pub fn arguments(&self, input: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.display().to_string(),
            "-vn".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.bitrate_kbps),
            "-f".to_string(),
            "mp3".to_string(),
            "pipe:1".to_string(),
        ]
    }

    /// Transcode an audio file and return the MP3 bytes
    pub async fn normalize(&self, input: &Path) -> Result<Vec<u8>> {
        let output = Command::new(&self.ffmpeg_path)
            .args(self.arguments(input))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ServerError::Transcoding(format!(
                "FFmpeg failed: {}",
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(ServerError::Transcoding(
                "FFmpeg produced no output".to_string(),
            ));
        }

        Ok(output.stdout)
    }
}

/// Track loader that normalizes every file through FFmpeg before probing
///
/// Keeps the whole playlist at one bitrate so the byte clock stays accurate
/// for VBR sources.
#[derive(Clone)]
pub struct TranscodingLoader {
    service: TranscodingService,
    probe: Arc<dyn TrackProbe>,
}

impl TranscodingLoader {
    pub fn new(service: TranscodingService) -> Self {
        Self {
            service,
            probe: Arc::new(LoftyProbe::new()),
        }
    }
}

#[async_trait]
impl TrackLoader for TranscodingLoader {
    async fn load(&self, id: &TrackId) -> std::result::Result<Track, LoadError> {
        let payload = self
            .service
            .normalize(id.path())
            .await
            .map_err(|e| LoadError::transcode(id.clone(), e.to_string()))?;

        tracing::debug!(
            "Transcoded {} to {} bytes at {}k",
            id,
            payload.len(),
            self.service.bitrate_kbps()
        );

        probe_into_track(Arc::clone(&self.probe), id, payload).await
    }
}
