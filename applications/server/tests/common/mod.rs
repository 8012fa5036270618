/// Common test utilities and fixtures
use airwave_core::{
    LoadError, ScanError, StationState, Track, TrackId, TrackLoader, TrackSource, TrackTiming,
};
use airwave_playback::{EngineConfig, PlaylistStore, StationHandle, StationStatus};
use airwave_server::{api, config::ServerConfig, state::AppState};
use async_trait::async_trait;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Track source whose listing can be swapped between reloads
#[derive(Default)]
pub struct MemorySource(Mutex<Vec<TrackId>>);

impl MemorySource {
    pub fn set(&self, names: &[&str]) {
        *self.0.lock().unwrap() = names.iter().map(|n| TrackId::new(*n)).collect();
    }
}

impl TrackSource for MemorySource {
    fn list_tracks(&self) -> Result<Vec<TrackId>, ScanError> {
        Ok(self.0.lock().unwrap().clone())
    }
}

/// Loader producing one-minute 128 kbps tracks, optionally after a delay
#[derive(Default)]
pub struct MemoryLoader {
    pub delay: Duration,
}

#[async_trait]
impl TrackLoader for MemoryLoader {
    async fn load(&self, id: &TrackId) -> Result<Track, LoadError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Track::new(
            id.clone(),
            vec![0x55u8; fixtures::TRACK_BYTES],
            TrackTiming::new(Duration::from_secs(60), fixtures::BITRATE),
        )
    }
}

pub struct TestApp {
    pub router: Router,
    pub station: StationHandle,
    pub source: Arc<MemorySource>,
}

/// Start a station over `names` and build the full router around it
pub fn create_test_app(names: &[&str], loader: MemoryLoader) -> TestApp {
    let source = Arc::new(MemorySource::default());
    source.set(names);

    let playlist = Arc::new(PlaylistStore::new(source.clone()));
    playlist.reload();

    let station =
        airwave_playback::spawn(EngineConfig::default(), playlist, Arc::new(loader)).unwrap();
    let app_state = AppState::new(station.clone(), Arc::new(ServerConfig::default()));

    TestApp {
        router: api::router(app_state),
        station,
        source,
    }
}

/// Wait (bounded) until the station status satisfies `predicate`
pub async fn wait_for_status(
    station: &StationHandle,
    predicate: impl FnMut(&StationStatus) -> bool,
) -> StationStatus {
    let mut status = station.status_receiver();
    let result = tokio::time::timeout(Duration::from_secs(5), status.wait_for(predicate))
        .await
        .expect("timed out waiting for station status")
        .expect("station stopped");
    result.clone()
}

pub async fn wait_until_playing(station: &StationHandle) -> StationStatus {
    wait_for_status(station, |s| s.state == StationState::Playing).await
}

pub mod fixtures {
    pub const BITRATE: u32 = 128_000;
    pub const TRACK_BYTES: usize = 60 * 16_000;
}
