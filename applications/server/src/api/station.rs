/// Station control API routes
use crate::{error::Result, state::AppState};
use airwave_core::StationState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Sentinel reported when nothing is on air
pub const NO_SONG: &str = "No songs available";

#[derive(Debug, Serialize)]
pub struct NowPlayingResponse {
    pub current_song: String,
    pub state: StationState,
    pub position_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub bitrate: Option<u32>,
    pub listeners: usize,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<usize>,
}

/// GET /now-playing
pub async fn now_playing(State(app_state): State<AppState>) -> Json<NowPlayingResponse> {
    let status = app_state.station.status();
    let track = status.track.as_ref();

    Json(NowPlayingResponse {
        current_song: track.map_or_else(|| NO_SONG.to_string(), |t| t.name.clone()),
        state: status.state,
        position_ms: track.map(|t| t.position_ms),
        duration_ms: track.map(|t| t.duration_ms),
        bitrate: track.map(|t| t.bitrate),
        listeners: status.listeners,
        started_at: track.map(|t| t.started_at),
    })
}

/// POST /skip-song
pub async fn skip_song(State(app_state): State<AppState>) -> Result<Json<ActionResponse>> {
    let skipped = app_state.station.skip().await?;
    tracing::info!("Skip requested, {} taken off air", skipped);

    Ok(Json(ActionResponse {
        success: true,
        message: "Skipped to the next song.".to_string(),
        tracks: None,
    }))
}

/// GET /reload-playlist
pub async fn reload_playlist(State(app_state): State<AppState>) -> Result<Json<ActionResponse>> {
    let tracks = app_state.station.reload().await?;

    Ok(Json(ActionResponse {
        success: true,
        message: "Playlist reloaded".to_string(),
        tracks: Some(tracks),
    }))
}
