/// Shared application state
use crate::config::ServerConfig;
use airwave_playback::StationHandle;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub station: StationHandle,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(station: StationHandle, config: Arc<ServerConfig>) -> Self {
        Self { station, config }
    }
}
