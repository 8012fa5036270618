/// Server configuration
use crate::error::{Result, ServerError};
use airwave_core::SelectionPolicy;
use airwave_metadata::ScanConfig;
use airwave_playback::clock::{MAX_TICK, MIN_TICK};
use airwave_playback::{EngineConfig, MAX_BACKOFF};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_station")]
    pub station: StationSettings,

    #[serde(default = "default_transcoding")]
    pub transcoding: TranscodingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationSettings {
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub recursive: bool,

    #[serde(default)]
    pub selection: SelectionPolicy,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Windows queued per listener before it is dropped as lagging
    #[serde(default = "default_client_buffer")]
    pub client_buffer: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodingSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,
}

impl StationSettings {
    /// Directory listing options
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            extensions: self
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            recursive: self.recursive,
        }
    }

    /// Broadcast engine options
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tick: Duration::from_millis(self.tick_ms),
            policy: self.selection,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            client_buffer: self.client_buffer,
            ..EngineConfig::default()
        }
    }
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `config.toml` is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables, e.g. AIRWAVE_STATION__MUSIC_DIR
        settings = settings.add_source(
            config::Environment::with_prefix("AIRWAVE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("station.extensions")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let tick = Duration::from_millis(self.station.tick_ms);
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(ServerError::Config(format!(
                "station.tick_ms must be between {} and {}",
                MIN_TICK.as_millis(),
                MAX_TICK.as_millis()
            )));
        }

        if self.station.retry_backoff_ms == 0 {
            return Err(ServerError::Config(
                "station.retry_backoff_ms must be greater than zero".to_string(),
            ));
        }

        if self.station.max_backoff_ms < self.station.retry_backoff_ms {
            return Err(ServerError::Config(
                "station.max_backoff_ms must not be less than station.retry_backoff_ms"
                    .to_string(),
            ));
        }

        if Duration::from_millis(self.station.max_backoff_ms) > MAX_BACKOFF {
            return Err(ServerError::Config(format!(
                "station.max_backoff_ms must not exceed {}",
                MAX_BACKOFF.as_millis()
            )));
        }

        if self.station.client_buffer == 0 {
            return Err(ServerError::Config(
                "station.client_buffer must be greater than zero".to_string(),
            ));
        }

        if self.station.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(ServerError::Config(
                "station.extensions must list at least one extension".to_string(),
            ));
        }

        if self.transcoding.bitrate_kbps == 0 {
            return Err(ServerError::Config(
                "transcoding.bitrate_kbps must be greater than zero".to_string(),
            ));
        }

        if self.transcoding.enabled && !self.transcoding.ffmpeg_path.exists() {
            return Err(ServerError::Config(format!(
                "FFmpeg not found at {:?}",
                self.transcoding.ffmpeg_path
            )));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_station() -> StationSettings {
    StationSettings {
        music_dir: default_music_dir(),
        extensions: default_extensions(),
        recursive: false,
        selection: SelectionPolicy::default(),
        tick_ms: default_tick_ms(),
        retry_backoff_ms: default_retry_backoff_ms(),
        max_backoff_ms: default_max_backoff_ms(),
        client_buffer: default_client_buffer(),
    }
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("music")
}

fn default_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

fn default_tick_ms() -> u64 {
    100
}

fn default_retry_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_client_buffer() -> usize {
    256
}

fn default_transcoding() -> TranscodingSettings {
    TranscodingSettings {
        enabled: false,
        ffmpeg_path: default_ffmpeg_path(),
        bitrate_kbps: default_bitrate_kbps(),
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("/usr/bin/ffmpeg")
}

fn default_bitrate_kbps() -> u32 {
    128
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            station: default_station(),
            transcoding: default_transcoding(),
        }
    }
}
