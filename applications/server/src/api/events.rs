/// Station event feed
use crate::state::AppState;
use async_stream::stream;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

/// GET /events
///
/// Server-sent events: a `sync` event carrying the current status, then one
/// event per station transition, named after its `type`. Subscribing happens
/// before the snapshot is taken so no transition falls between the two.
pub async fn events(
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.station.subscribe();
    let status = app_state.station.status();

    let stream = stream! {
        if let Ok(json) = serde_json::to_string(&status) {
            yield Ok::<_, Infallible>(Event::default().event("sync").data(json));
        }

        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        yield Ok(Event::default().event(event.kind()).data(json));
                    }
                    Err(e) => tracing::warn!("Failed to encode {} event: {}", event.kind(), e),
                },
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!("Event subscriber lagged, {} events missed", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
