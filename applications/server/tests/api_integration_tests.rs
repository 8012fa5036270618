/// API integration tests
/// Tests complete HTTP request/response cycles against a running station
mod common;

use airwave_core::StationState;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use common::{create_test_app, wait_for_status, wait_until_playing, MemoryLoader};
use http_body_util::BodyExt;
use std::time::Duration;
use tower::util::ServiceExt;

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn post(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn json(response: Response) -> serde_json::Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

/// Read an event stream body until `needle` shows up, returning what was read
async fn read_until(body: &mut Body, needle: &str) -> String {
    let mut text = String::new();
    while !text.contains(needle) {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Ok(data) = frame.into_data() {
            text.push_str(std::str::from_utf8(&data).unwrap());
        }
    }
    text
}

/// Test GET /health
#[tokio::test]
async fn test_health() {
    let app = create_test_app(&["a.mp3"], MemoryLoader::default());

    let response = get(&app.router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

/// Test every endpoint against an empty playlist
#[tokio::test]
async fn test_empty_playlist_reports_no_track() {
    let app = create_test_app(&[], MemoryLoader::default());
    wait_for_status(&app.station, |s| s.state == StationState::Idle).await;

    let response = get(&app.router, "/radio").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["error"], "No audio files in the playlist.");

    let response = get(&app.router, "/now-playing").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["current_song"], "No songs available");
    assert_eq!(body["state"], "idle");
    assert!(body["bitrate"].is_null());

    let response = post(&app.router, "/skip-song").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test GET /now-playing while a track is on air
#[tokio::test]
async fn test_now_playing() {
    let app = create_test_app(&["music/a.mp3", "music/b.mp3"], MemoryLoader::default());
    wait_until_playing(&app.station).await;

    let body = json(get(&app.router, "/now-playing").await).await;
    assert_eq!(body["current_song"], "a.mp3");
    assert_eq!(body["state"], "playing");
    assert_eq!(body["bitrate"], 128_000);
    assert_eq!(body["duration_ms"], 60_000);
    assert_eq!(body["listeners"], 0);
    assert!(body["started_at"].is_string());
}

/// Test GET /radio streams audio and unregisters on hangup
#[tokio::test]
async fn test_radio_streams_audio() {
    let app = create_test_app(&["a.mp3"], MemoryLoader::default());
    wait_until_playing(&app.station).await;

    let response = get(&app.router, "/radio").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers()["x-accel-buffering"], "no");

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let data = frame.into_data().unwrap();
    assert!(!data.is_empty());
    assert!(data.iter().all(|b| *b == 0x55));

    wait_for_status(&app.station, |s| s.listeners == 1).await;

    // Client hangs up
    drop(body);
    wait_for_status(&app.station, |s| s.listeners == 0).await;
}

/// Test CORS is open for browser players
#[tokio::test]
async fn test_cors_is_permissive() {
    let app = create_test_app(&["a.mp3"], MemoryLoader::default());

    let request = Request::builder()
        .uri("/now-playing")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

/// Test POST /skip-song moves to the next track
#[tokio::test]
async fn test_skip_song() {
    let app = create_test_app(&["a.mp3", "b.mp3"], MemoryLoader::default());
    wait_until_playing(&app.station).await;

    let response = post(&app.router, "/skip-song").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Skipped to the next song.");

    let status = wait_for_status(&app.station, |s| s.current_name() == Some("b.mp3")).await;
    assert_eq!(status.state, StationState::Playing);
}

/// Test POST /skip-song is refused while the next track loads
#[tokio::test]
async fn test_skip_while_loading_conflicts() {
    let loader = MemoryLoader {
        delay: Duration::from_secs(30),
    };
    let app = create_test_app(&["a.mp3"], loader);
    wait_for_status(&app.station, |s| s.state == StationState::Loading).await;

    let response = post(&app.router, "/skip-song").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Test GET /reload-playlist starts an idle station
#[tokio::test]
async fn test_reload_playlist() {
    let app = create_test_app(&[], MemoryLoader::default());
    wait_for_status(&app.station, |s| s.state == StationState::Idle).await;

    app.source.set(&["a.mp3", "b.mp3", "c.mp3"]);
    let response = get(&app.router, "/reload-playlist").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Playlist reloaded");
    assert_eq!(body["tracks"], 3);

    let status = wait_until_playing(&app.station).await;
    assert_eq!(status.current_name(), Some("a.mp3"));
}

/// Test GET /events sends a status snapshot, then station transitions
#[tokio::test]
async fn test_events_feed() {
    let app = create_test_app(&["a.mp3", "b.mp3"], MemoryLoader::default());
    wait_until_playing(&app.station).await;

    let response = get(&app.router, "/events").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    let mut body = response.into_body();
    let sync = read_until(&mut body, "event: sync").await;
    assert!(sync.contains(r#""state":"playing""#));
    assert!(sync.contains("a.mp3"));

    let response = post(&app.router, "/skip-song").await;
    assert_eq!(response.status(), StatusCode::OK);

    let skipped = read_until(&mut body, "event: track_skipped").await;
    assert!(skipped.contains(r#""type":"track_skipped""#));

    let started = read_until(&mut body, "event: track_started").await;
    assert!(started.contains("b.mp3"));
}
