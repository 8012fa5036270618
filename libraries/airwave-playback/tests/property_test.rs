//! Property-based tests for the broadcast core
//!
//! Uses proptest to check rotation, clock, cursor, and fan-out invariants
//! across many random inputs.

use airwave_core::{ScanError, SelectionPolicy, Track, TrackId, TrackSource, TrackTiming};
use airwave_playback::{
    BroadcastClock, ClientConnection, ClientRegistry, ListenerId, PlaybackCursor, PlaylistStore,
    TickOutcome,
};
use bytes::Bytes;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

// ===== Helpers =====

struct FixedSource(Vec<TrackId>);

impl TrackSource for FixedSource {
    fn list_tracks(&self) -> Result<Vec<TrackId>, ScanError> {
        Ok(self.0.clone())
    }
}

fn playlist(len: usize) -> PlaylistStore {
    let ids = (0..len).map(|i| TrackId::new(format!("{:03}.mp3", i))).collect();
    let store = PlaylistStore::new(Arc::new(FixedSource(ids)));
    store.reload();
    store
}

fn track(duration_ms: u64, bitrate: u32, len: usize) -> Track {
    let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    Track::new(
        TrackId::new("prop.mp3"),
        payload,
        TrackTiming::new(Duration::from_millis(duration_ms), bitrate),
    )
    .unwrap()
}

// ===== Property Tests =====

proptest! {
    /// Property: sequential rotation visits every track once before repeating
    #[test]
    fn sequential_visits_every_track_once(len in 1usize..60, skip in 0usize..60) {
        let store = playlist(len);
        for _ in 0..skip {
            store.next(SelectionPolicy::Sequential);
        }

        let mut seen = HashSet::new();
        for _ in 0..len {
            let id = store.next(SelectionPolicy::Sequential).unwrap();
            prop_assert!(seen.insert(id), "track repeated within one pass");
        }
        prop_assert_eq!(seen.len(), len);
    }

    /// Property: random rotation always yields a playlist member with a valid index
    #[test]
    fn random_yields_members(len in 1usize..60, draws in 1usize..100) {
        let store = playlist(len);
        let members: HashSet<TrackId> = store.tracks().into_iter().collect();

        for _ in 0..draws {
            let id = store.next(SelectionPolicy::Random).unwrap();
            prop_assert!(members.contains(&id));
            prop_assert!(store.index() < len);
        }
    }

    /// Property: target offset never exceeds the payload, even past the end
    #[test]
    fn target_offset_within_payload(
        elapsed_ms in 0u64..1_000_000,
        bitrate in 1u32..2_000_000,
        len in 0usize..10_000_000,
    ) {
        let offset = BroadcastClock::target_offset(Duration::from_millis(elapsed_ms), bitrate, len);
        prop_assert!(offset <= len);
    }

    /// Property: target offset grows with elapsed time
    #[test]
    fn target_offset_is_monotonic(
        a in 0u64..100_000,
        b in 0u64..100_000,
        bitrate in 1u32..500_000,
    ) {
        let (early, late) = (a.min(b), a.max(b));
        let len = usize::MAX;
        prop_assert!(
            BroadcastClock::target_offset(Duration::from_millis(early), bitrate, len)
                <= BroadcastClock::target_offset(Duration::from_millis(late), bitrate, len)
        );
    }

    /// Property: ticking a cursor produces contiguous, in-bounds windows that
    /// reassemble into a payload prefix
    #[test]
    fn ticks_reassemble_payload_prefix(
        duration_ms in 100u64..5_000,
        bitrate in 8_000u32..320_000,
        len in 1usize..50_000,
        steps in prop::collection::vec(1u64..300, 1..40),
    ) {
        let clock = BroadcastClock::default();
        let origin = Instant::now();
        let mut cursor = PlaybackCursor::new(track(duration_ms, bitrate, len), origin);
        let mut received = Vec::new();
        let mut now = origin;
        let mut last = 0;

        for step in steps {
            now += Duration::from_millis(step);
            match clock.evaluate(&cursor, now) {
                TickOutcome::Complete => break,
                TickOutcome::Deliver(range) => {
                    prop_assert_eq!(range.start, cursor.delivered());
                    prop_assert!(range.end <= len);
                    received.extend_from_slice(&cursor.advance_to(range.end));
                }
            }
            prop_assert!(cursor.delivered() >= last);
            last = cursor.delivered();
        }

        prop_assert_eq!(&received[..], &cursor.track().payload()[..cursor.delivered()]);
    }

    /// Property: a failing listener never changes what the others receive
    #[test]
    fn failed_listener_does_not_affect_others(
        windows in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 1..20),
        fail_after in 0usize..20,
    ) {
        let mut registry = ClientRegistry::new();
        let (healthy_tx, mut healthy_rx) = mpsc::channel(64);
        let (flaky_tx, flaky_rx) = mpsc::channel(64);
        registry.add(ClientConnection::new(ListenerId::new(1), healthy_tx));
        registry.add(ClientConnection::new(ListenerId::new(2), flaky_tx));

        let mut flaky_rx = Some(flaky_rx);
        for (i, window) in windows.iter().enumerate() {
            if i == fail_after {
                flaky_rx.take();
            }
            registry.broadcast(&Bytes::from(window.clone()));
        }

        for window in &windows {
            prop_assert_eq!(healthy_rx.try_recv().unwrap(), Bytes::from(window.clone()));
        }
        prop_assert!(registry.contains(ListenerId::new(1)));
        prop_assert_eq!(registry.contains(ListenerId::new(2)), fail_after >= windows.len());
    }
}
