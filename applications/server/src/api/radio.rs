/// Live audio stream
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
};
use futures_util::StreamExt;
use std::convert::Infallible;

/// GET /radio
/// Tune in to the station: catch-up bytes first, then the live edge until the
/// client disconnects
pub async fn radio(State(app_state): State<AppState>) -> Result<Response> {
    let listener = app_state.station.connect().await?;
    tracing::debug!("{} tuned in", listener.id());

    // Dropping the body (client hangup) drops the listener and unregisters it
    let body = Body::from_stream(listener.map(Ok::<_, Infallible>));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", "no")
        .body(body)
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}
