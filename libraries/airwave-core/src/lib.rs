//! Airwave Core
//!
//! Platform-agnostic types, traits, and error handling shared by every Airwave
//! crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackId`, `Track`, `TrackTiming`, `SelectionPolicy`, `StationState`
//! - **Core Traits**: `TrackSource` (playlist listing), `TrackProbe` (metadata extraction),
//!   `TrackLoader` (identifier to ready track)
//! - **Error Handling**: `LoadError` for per-track failures, `StationError` for
//!   station-level outcomes
//!
//! # Example
//!
//! ```rust
//! use airwave_core::{Track, TrackId, TrackTiming};
//! use std::time::Duration;
//!
//! let id = TrackId::new("music/intro.mp3");
//! let timing = TrackTiming::new(Duration::from_secs(2), 128_000);
//! let track = Track::new(id, vec![0u8; 32_000], timing).unwrap();
//!
//! assert_eq!(track.name(), "intro.mp3");
//! assert_eq!(track.payload_len(), 32_000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{LoadError, ScanError, StationError};
pub use traits::{TrackLoader, TrackProbe, TrackSource};
pub use types::{SelectionPolicy, StationState, Track, TrackId, TrackTiming};
