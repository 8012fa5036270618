//! Airwave - Broadcast Engine
//!
//! The live-radio core of Airwave: one shared timeline, many listeners.
//!
//! This crate provides:
//! - Playlist rotation (sequential or random) with atomic reloads
//! - A broadcast clock mapping elapsed time to a byte offset
//! - Fan-out of byte windows to listeners with per-listener isolation
//! - Load failure recovery with bounded retry backoff
//!
//! # Architecture
//!
//! `BroadcastEngine` owns all playback state and runs a tick loop on a single
//! task. `StationHandle` and `Listener` talk to it through channels, so no
//! request handler ever mutates the timeline directly. Track loading goes
//! through the `TrackLoader` trait and runs on separate tasks.
//!
//! # Example
//!
//! ```rust,no_run
//! use airwave_core::{LoadError, Track, TrackId, TrackLoader, TrackTiming};
//! use airwave_core::{ScanError, TrackSource};
//! use airwave_playback::{spawn, EngineConfig, PlaylistStore};
//! use futures_util::StreamExt;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Tones;
//!
//! impl TrackSource for Tones {
//!     fn list_tracks(&self) -> Result<Vec<TrackId>, ScanError> {
//!         Ok(vec![TrackId::new("tone.mp3")])
//!     }
//! }
//!
//! #[async_trait::async_trait]
//! impl TrackLoader for Tones {
//!     async fn load(&self, id: &TrackId) -> Result<Track, LoadError> {
//!         let timing = TrackTiming::new(Duration::from_secs(2), 128_000);
//!         Track::new(id.clone(), vec![0u8; 32_000], timing)
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let playlist = Arc::new(PlaylistStore::new(Arc::new(Tones)));
//! playlist.reload();
//!
//! let station = spawn(EngineConfig::default(), playlist, Arc::new(Tones))?;
//! let mut listener = station.connect().await?;
//! while let Some(bytes) = listener.next().await {
//!     println!("{} bytes", bytes.len());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod clock;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod events;
pub mod handle;
pub mod playlist;
pub mod registry;

pub use clock::{BroadcastClock, TickOutcome};
pub use cursor::PlaybackCursor;
pub use engine::{retry_delay, spawn, BroadcastEngine, EngineConfig, MAX_BACKOFF};
pub use error::{ClientWriteFailure, PlaybackError, Result};
pub use events::{ClientWriteFailureKind, NowPlaying, StationEvent, StationStatus};
pub use handle::{Listener, StationHandle};
pub use playlist::{PlaylistStore, Selection};
pub use registry::{ClientConnection, ClientRegistry, ListenerId};
