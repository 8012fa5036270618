/// API route modules
pub mod events;
pub mod health;
pub mod radio;
pub mod station;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full HTTP surface
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/radio", get(radio::radio))
        .route("/now-playing", get(station::now_playing))
        .route("/skip-song", post(station::skip_song))
        .route("/reload-playlist", get(station::reload_playlist))
        .route("/events", get(events::events))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
