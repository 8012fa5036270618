//! Broadcast clock
//!
//! Maps wall-clock time since a track's origin onto a byte offset inside the
//! track payload. A listener joining at any moment receives the same bytes as
//! everyone else from that moment on.

use crate::cursor::PlaybackCursor;
use crate::error::{PlaybackError, Result};
use std::ops::Range;
use std::time::Duration;
use tokio::time::Instant;

/// Shortest supported tick interval
pub const MIN_TICK: Duration = Duration::from_millis(20);

/// Longest supported tick interval
pub const MAX_TICK: Duration = Duration::from_millis(500);

/// Default tick interval
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

const NANOS_PER_SECOND_TIMES_BITS: u128 = 8_000_000_000;

/// What the engine should do on a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Send this payload range to every listener
    Deliver(Range<usize>),

    /// The track's duration has elapsed
    Complete,
}

/// Converts elapsed time into byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastClock {
    tick: Duration,
}

impl BroadcastClock {
    /// Create a clock with the given tick interval
    ///
    /// # Errors
    /// Returns `PlaybackError::InvalidTick` outside 20ms..=500ms
    pub fn new(tick: Duration) -> Result<Self> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(PlaybackError::InvalidTick(tick));
        }
        Ok(Self { tick })
    }

    /// Tick interval
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Byte offset the live edge should have reached after `elapsed`
    ///
    /// `floor(elapsed_seconds * bitrate / 8)`, clamped to `payload_len`.
    /// Integer math only, so every caller computes the same offset.
    pub fn target_offset(elapsed: Duration, bitrate: u32, payload_len: usize) -> usize {
        let offset = elapsed.as_nanos() * u128::from(bitrate) / NANOS_PER_SECOND_TIMES_BITS;
        usize::try_from(offset).map_or(payload_len, |offset| offset.min(payload_len))
    }

    /// Decide what a tick at `now` produces for `cursor`
    ///
    /// The range may be empty when the live edge has not moved a full byte.
    pub fn evaluate(&self, cursor: &PlaybackCursor, now: Instant) -> TickOutcome {
        let elapsed = cursor.elapsed(now);
        if elapsed >= cursor.track().duration() {
            return TickOutcome::Complete;
        }

        let target = Self::target_offset(
            elapsed,
            cursor.track().bitrate(),
            cursor.track().payload_len(),
        );
        let start = cursor.delivered();
        TickOutcome::Deliver(start..target.max(start))
    }
}

impl Default for BroadcastClock {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK }
    }
}
