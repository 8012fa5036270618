//! Airwave Metadata
//!
//! The I/O collaborators of the broadcast engine.
//!
//! This crate provides:
//! - Directory listing filtered to supported audio extensions (`DirectoryScanner`,
//!   `MusicDirectory` as the playlist's track source)
//! - Duration and bitrate extraction from encoded payloads (`LoftyProbe`)
//! - File-backed track loading (`FileTrackLoader`)
//!
//! # Example
//!
//! ```rust,no_run
//! use airwave_core::TrackLoader;
//! use airwave_metadata::{DirectoryScanner, FileTrackLoader, ScanConfig};
//! use std::path::Path;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = DirectoryScanner::new(ScanConfig::default());
//! let tracks = scanner.list_tracks(Path::new("music"))?;
//!
//! let loader = FileTrackLoader::default();
//! if let Some(first) = tracks.first() {
//!     let track = loader.load(first).await?;
//!     println!("{} ({:?}, {} bps)", track.name(), track.duration(), track.bitrate());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod loader;
mod probe;
mod scanner;

pub use error::{MetadataError, Result};
pub use loader::{probe_into_track, FileTrackLoader};
pub use probe::LoftyProbe;
pub use scanner::{DirectoryScanner, MusicDirectory, ScanConfig};
