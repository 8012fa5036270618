//! Station events and status snapshots
//!
//! The engine publishes a `StationStatus` snapshot on a watch channel after
//! every state change and delivery tick, and emits `StationEvent`s on a
//! broadcast channel at transition points:
//! - State changes
//! - Track start, finish, skip, and load failure
//! - Listener join and leave
//! - Playlist reloads

use crate::error::ClientWriteFailure;
use crate::registry::ListenerId;
use airwave_core::{StationState, TrackId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Events emitted by the broadcast engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StationEvent {
    /// Station state changed
    StateChanged {
        /// Previous state
        from: StationState,
        /// New state
        to: StationState,
    },

    /// A track went on air
    TrackStarted {
        /// Track identifier
        track_id: TrackId,
        /// Duration in milliseconds
        duration_ms: u64,
        /// Bitrate in bits per second
        bitrate: u32,
    },

    /// A track played to its end
    TrackFinished {
        /// Track identifier
        track_id: TrackId,
    },

    /// A track was cut short by an admin skip
    TrackSkipped {
        /// Track identifier
        track_id: TrackId,
        /// Bytes delivered before the skip
        delivered_bytes: usize,
    },

    /// A track could not be loaded and was passed over
    TrackFailed {
        /// Track identifier
        track_id: TrackId,
        /// Load error message
        reason: String,
    },

    /// A listener connected
    ListenerJoined {
        /// Listener identifier
        listener: ListenerId,
        /// Catch-up bytes sent on join
        catch_up_bytes: usize,
    },

    /// A listener was removed
    ListenerLeft {
        /// Listener identifier
        listener: ListenerId,
        /// Write failure that caused the removal, if any
        failure: Option<ClientWriteFailureKind>,
    },

    /// The playlist was rescanned
    PlaylistReloaded {
        /// New playlist length
        tracks: usize,
    },
}

impl StationEvent {
    /// Snake-case event name, matching the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::TrackStarted { .. } => "track_started",
            Self::TrackFinished { .. } => "track_finished",
            Self::TrackSkipped { .. } => "track_skipped",
            Self::TrackFailed { .. } => "track_failed",
            Self::ListenerJoined { .. } => "listener_joined",
            Self::ListenerLeft { .. } => "listener_left",
            Self::PlaylistReloaded { .. } => "playlist_reloaded",
        }
    }
}

/// Serializable form of `ClientWriteFailure`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientWriteFailureKind {
    /// Queue was full
    Lagging,
    /// Receiver was gone
    Disconnected,
}

impl From<ClientWriteFailure> for ClientWriteFailureKind {
    fn from(failure: ClientWriteFailure) -> Self {
        match failure {
            ClientWriteFailure::Lagging => Self::Lagging,
            ClientWriteFailure::Disconnected => Self::Disconnected,
        }
    }
}

/// The on-air track as seen by observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlaying {
    /// Track identifier
    pub id: TrackId,
    /// Human-readable name (file basename)
    pub name: String,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Bitrate in bits per second
    pub bitrate: u32,
    /// Playback position in milliseconds
    pub position_ms: u64,
    /// Live edge offset into the payload
    pub delivered_bytes: usize,
    /// Total payload size
    pub payload_len: usize,
    /// Wall-clock time the track went on air
    pub started_at: DateTime<Utc>,
}

/// Snapshot of the whole station
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StationStatus {
    /// Engine state
    pub state: StationState,
    /// On-air track, present only while `Playing`
    pub track: Option<NowPlaying>,
    /// Registered listeners
    pub listeners: usize,
}

impl StationStatus {
    /// Basename of the on-air track
    pub fn current_name(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.name.as_str())
    }
}
