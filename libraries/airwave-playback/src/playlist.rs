//! Playlist store
//!
//! Holds the ordered list of playable identifiers and rotates through it.
//! `reload` swaps the whole list under a write lock so readers never observe a
//! partially replaced playlist.

use airwave_core::{SelectionPolicy, TrackId, TrackSource};
use rand::Rng;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Playlist contents and rotation position
#[derive(Debug, Default)]
struct Playlist {
    tracks: Vec<TrackId>,

    /// Position of the current track; always `< tracks.len()` when non-empty
    index: usize,

    /// Bumped on every replace
    generation: u64,
}

/// A track picked from the playlist, and which playlist it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Picked identifier
    pub id: TrackId,

    /// Playlist generation at pick time
    pub generation: u64,
}

/// Thread-safe playlist with sequential and random rotation
pub struct PlaylistStore {
    source: Arc<dyn TrackSource>,
    inner: RwLock<Playlist>,
}

impl PlaylistStore {
    /// Create an empty store backed by `source`
    ///
    /// Call `reload` to populate it.
    pub fn new(source: Arc<dyn TrackSource>) -> Self {
        Self {
            source,
            inner: RwLock::new(Playlist::default()),
        }
    }

    /// Rescan the track source and replace the playlist
    ///
    /// A scan failure is logged and yields an empty playlist. The rotation
    /// index is kept (wrapped into the new length).
    ///
    /// Returns the new playlist length.
    pub fn reload(&self) -> usize {
        let tracks = match self.source.list_tracks() {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!("Playlist scan failed, treating as empty: {}", e);
                Vec::new()
            }
        };

        let len = tracks.len();
        self.replace(tracks);

        if len == 0 {
            tracing::warn!("No tracks found, playlist is empty");
        } else {
            tracing::info!("Loaded {} tracks", len);
        }

        len
    }

    /// Atomically replace the playlist contents
    pub fn replace(&self, tracks: Vec<TrackId>) {
        let mut playlist = self.write();
        playlist.index = if tracks.is_empty() {
            0
        } else {
            playlist.index % tracks.len()
        };
        playlist.tracks = tracks;
        playlist.generation += 1;
    }

    /// Advance and return the next identifier
    ///
    /// Returns `None` when the playlist is empty.
    pub fn next(&self, policy: SelectionPolicy) -> Option<TrackId> {
        self.select_next(policy).map(|selection| selection.id)
    }

    /// Identifier at the present index, without advancing
    pub fn current(&self) -> Option<TrackId> {
        self.select_current().map(|selection| selection.id)
    }

    /// Like `next`, tagged with the generation it was picked from
    pub fn select_next(&self, policy: SelectionPolicy) -> Option<Selection> {
        let mut playlist = self.write();
        let len = playlist.tracks.len();
        if len == 0 {
            return None;
        }

        playlist.index = match policy {
            SelectionPolicy::Sequential => (playlist.index + 1) % len,
            SelectionPolicy::Random => rand::thread_rng().gen_range(0..len),
        };

        Some(Selection {
            id: playlist.tracks[playlist.index].clone(),
            generation: playlist.generation,
        })
    }

    /// Like `current`, tagged with the generation it was picked from
    pub fn select_current(&self) -> Option<Selection> {
        let playlist = self.read();
        playlist.tracks.get(playlist.index).map(|id| Selection {
            id: id.clone(),
            generation: playlist.generation,
        })
    }

    /// Present rotation index
    pub fn index(&self) -> usize {
        self.read().index
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.read().tracks.len()
    }

    /// Check if the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.read().tracks.is_empty()
    }

    /// Replace counter, used to detect superseded loads
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Snapshot of all identifiers in order
    pub fn tracks(&self) -> Vec<TrackId> {
        self.read().tracks.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Playlist> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Playlist> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PlaylistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let playlist = self.read();
        f.debug_struct("PlaylistStore")
            .field("tracks", &playlist.tracks.len())
            .field("index", &playlist.index)
            .field("generation", &playlist.generation)
            .finish_non_exhaustive()
    }
}
