//! Playback cursor for the on-air track

use airwave_core::Track;
use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;

/// The on-air track, when it started, and how much of it has gone out
///
/// `delivered` only grows and never exceeds the payload length.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    track: Track,
    origin: Instant,
    delivered: usize,
}

impl PlaybackCursor {
    /// Start a cursor at `origin` with nothing delivered
    pub fn new(track: Track, origin: Instant) -> Self {
        Self {
            track,
            origin,
            delivered: 0,
        }
    }

    /// The on-air track
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Bytes already sent to listeners
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Time since origin (zero if `now` is earlier)
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.origin)
    }

    /// Move the live edge to `offset` and return the newly covered bytes
    ///
    /// Offsets behind the current edge yield an empty window; offsets past the
    /// payload are clamped.
    pub fn advance_to(&mut self, offset: usize) -> Bytes {
        let end = offset.min(self.track.payload_len());
        if end <= self.delivered {
            return Bytes::new();
        }

        let window = self.track.payload().slice(self.delivered..end);
        self.delivered = end;
        window
    }

    /// Everything delivered so far, for a listener joining mid-track
    pub fn catch_up(&self) -> Bytes {
        self.track.payload().slice(..self.delivered)
    }
}
