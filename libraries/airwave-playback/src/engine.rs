//! Broadcast engine
//!
//! The single owner of the station timeline. One task runs the tick loop and
//! is the only code that touches the playback cursor, the listener registry,
//! or the station state. Everything else talks to it through messages:
//!
//! - `StationHandle` sends connect, skip, and reload notifications
//! - Dropped `Listener`s send disconnects
//! - Background load tasks send their outcome
//!
//! Track loads run on their own tasks so a slow disk or probe never delays
//! delivery to listeners already tuned in.

use crate::clock::{BroadcastClock, TickOutcome, DEFAULT_TICK};
use crate::cursor::PlaybackCursor;
use crate::error::{ClientWriteFailure, PlaybackError, Result};
use crate::events::{NowPlaying, StationEvent, StationStatus};
use crate::handle::{Listener, StationHandle};
use crate::playlist::{PlaylistStore, Selection};
use crate::registry::{ClientConnection, ClientRegistry, ListenerId};
use airwave_core::{
    LoadError, SelectionPolicy, StationError, StationState, Track, TrackId, TrackLoader,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};

const COMMAND_CAPACITY: usize = 64;

/// Longest retry delay the engine accepts
pub const MAX_BACKOFF: Duration = Duration::from_secs(3600);

/// Broadcast engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Tick interval (20ms..=500ms)
    pub tick: Duration,

    /// Playlist rotation policy
    pub policy: SelectionPolicy,

    /// Delay before retrying after a failed load
    pub retry_backoff: Duration,

    /// Ceiling for the doubled retry delay
    pub max_backoff: Duration,

    /// Queued windows per listener before it counts as lagging
    pub client_buffer: usize,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            policy: SelectionPolicy::Sequential,
            retry_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            client_buffer: 256,
            event_capacity: 128,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        BroadcastClock::new(self.tick)?;

        if self.retry_backoff.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "retry_backoff must be greater than zero".to_string(),
            ));
        }
        if self.max_backoff < self.retry_backoff {
            return Err(PlaybackError::InvalidConfig(
                "max_backoff must not be shorter than retry_backoff".to_string(),
            ));
        }
        if self.max_backoff > MAX_BACKOFF {
            return Err(PlaybackError::InvalidConfig(format!(
                "max_backoff must not exceed {MAX_BACKOFF:?}"
            )));
        }
        if self.client_buffer == 0 {
            return Err(PlaybackError::InvalidConfig(
                "client_buffer must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "event_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Requests into the engine task
#[derive(Debug)]
pub(crate) enum StationCommand {
    /// Register a new listener
    Connect {
        reply: oneshot::Sender<std::result::Result<Listener, StationError>>,
    },

    /// Cut the on-air track short
    Skip {
        reply: oneshot::Sender<std::result::Result<TrackId, StationError>>,
    },

    /// The playlist was replaced
    PlaylistReloaded { tracks: usize },
}

/// Result of a background load task
struct LoadOutcome {
    ticket: u64,
    id: TrackId,
    result: std::result::Result<Track, LoadError>,
}

/// What the engine is waiting on while `Loading`
#[derive(Debug)]
enum LoadSlot {
    /// A load task is running
    InFlight {
        ticket: u64,
        id: TrackId,
        generation: u64,
    },

    /// Backing off before the next attempt
    Waiting {
        id: TrackId,
        generation: u64,
        retry_at: Instant,
    },
}

/// Single-owner station state machine
pub struct BroadcastEngine {
    config: EngineConfig,
    clock: BroadcastClock,
    playlist: Arc<PlaylistStore>,
    loader: Arc<dyn TrackLoader>,
    registry: ClientRegistry,

    state: StationState,
    cursor: Option<PlaybackCursor>,
    started_at: Option<DateTime<Utc>>,
    slot: Option<LoadSlot>,
    failures: usize,
    next_ticket: u64,
    next_listener: u64,

    commands: mpsc::Receiver<StationCommand>,
    disconnect_tx: mpsc::UnboundedSender<ListenerId>,
    disconnects: mpsc::UnboundedReceiver<ListenerId>,
    load_tx: mpsc::UnboundedSender<LoadOutcome>,
    loads: mpsc::UnboundedReceiver<LoadOutcome>,
    status: watch::Sender<StationStatus>,
    events: broadcast::Sender<StationEvent>,
}

impl BroadcastEngine {
    /// Create an engine and the handle used to control it
    ///
    /// The engine does nothing until `run` is awaited. The playlist should be
    /// loaded beforehand; an empty playlist starts the station `Idle`.
    pub fn new(
        config: EngineConfig,
        playlist: Arc<PlaylistStore>,
        loader: Arc<dyn TrackLoader>,
    ) -> Result<(Self, StationHandle)> {
        config.validate()?;
        let clock = BroadcastClock::new(config.tick)?;

        let (command_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (disconnect_tx, disconnects) = mpsc::unbounded_channel();
        let (load_tx, loads) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(StationStatus::default());
        let (events, _) = broadcast::channel(config.event_capacity);

        let handle = StationHandle::new(
            command_tx,
            status_rx,
            events.clone(),
            Arc::clone(&playlist),
        );

        let engine = Self {
            config,
            clock,
            playlist,
            loader,
            registry: ClientRegistry::new(),
            state: StationState::Idle,
            cursor: None,
            started_at: None,
            slot: None,
            failures: 0,
            next_ticket: 0,
            next_listener: 0,
            commands,
            disconnect_tx,
            disconnects,
            load_tx,
            loads,
            status,
            events,
        };

        Ok((engine, handle))
    }

    /// Run the tick loop until every `StationHandle` is dropped
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.clock.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Broadcast engine started (tick {:?}, {:?} rotation)",
            self.clock.tick(),
            self.config.policy
        );
        self.restart();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(Instant::now()),
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(id) = self.disconnects.recv() => self.on_disconnect(id, None),
                Some(outcome) = self.loads.recv() => self.on_load(outcome),
            }
        }

        tracing::info!("Broadcast engine stopped");
    }

    fn on_tick(&mut self, now: Instant) {
        match self.state {
            StationState::Playing => self.deliver(now),
            StationState::Loading => {
                let due = match &self.slot {
                    Some(LoadSlot::Waiting {
                        id,
                        generation,
                        retry_at,
                    }) if now >= *retry_at => Some(Selection {
                        id: id.clone(),
                        generation: *generation,
                    }),
                    _ => None,
                };
                match due {
                    Some(selection) if selection.generation != self.playlist.generation() => {
                        tracing::debug!("Playlist changed while backing off, restarting");
                        self.restart();
                    }
                    Some(selection) => self.begin_load(selection),
                    None => {}
                }
            }
            StationState::Idle | StationState::Advancing => {}
        }
    }

    fn deliver(&mut self, now: Instant) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };

        match self.clock.evaluate(cursor, now) {
            TickOutcome::Complete => {
                let track_id = cursor.track().id().clone();
                tracing::debug!("Finished {}", track_id);
                self.emit(StationEvent::TrackFinished { track_id });
                self.advance();
            }
            TickOutcome::Deliver(range) => {
                let window = cursor.advance_to(range.end);
                let failed = self.registry.broadcast(&window);
                for (id, failure) in failed {
                    self.on_disconnect(id, Some(failure));
                }
                self.publish_status();
            }
        }
    }

    fn on_command(&mut self, command: StationCommand) {
        match command {
            StationCommand::Connect { reply } => self.connect(reply),
            StationCommand::Skip { reply } => {
                let result = self.skip();
                let _ = reply.send(result);
            }
            StationCommand::PlaylistReloaded { tracks } => self.on_reloaded(tracks),
        }
    }

    fn connect(&mut self, reply: oneshot::Sender<std::result::Result<Listener, StationError>>) {
        if self.state == StationState::Idle {
            let _ = reply.send(Err(StationError::EmptyPlaylist));
            return;
        }

        self.next_listener += 1;
        let id = ListenerId::new(self.next_listener);
        let (sink, receiver) = mpsc::channel(self.config.client_buffer);
        let mut connection = ClientConnection::new(id, sink);

        let catch_up = self
            .cursor
            .as_ref()
            .map(PlaybackCursor::catch_up)
            .unwrap_or_default();
        let catch_up_bytes = catch_up.len();
        if connection.try_write(&catch_up).is_err() {
            return;
        }

        let listener = Listener::new(id, receiver, self.disconnect_tx.clone());
        if reply.send(Ok(listener)).is_err() {
            // Requester went away before the reply; the listener was never seen
            return;
        }

        self.registry.add(connection);
        tracing::info!(
            "{} joined with {} catch-up bytes ({} listening)",
            id,
            catch_up_bytes,
            self.registry.len()
        );
        self.emit(StationEvent::ListenerJoined {
            listener: id,
            catch_up_bytes,
        });
        self.publish_status();
    }

    fn skip(&mut self) -> std::result::Result<TrackId, StationError> {
        match self.state {
            StationState::Idle => Err(StationError::EmptyPlaylist),
            StationState::Loading | StationState::Advancing => Err(StationError::TrackNotReady),
            StationState::Playing => {
                let Some(cursor) = self.cursor.as_ref() else {
                    return Err(StationError::TrackNotReady);
                };
                let track_id = cursor.track().id().clone();
                let delivered_bytes = cursor.delivered();

                tracing::info!("Skipping {} after {} bytes", track_id, delivered_bytes);
                self.emit(StationEvent::TrackSkipped {
                    track_id: track_id.clone(),
                    delivered_bytes,
                });
                self.advance();
                Ok(track_id)
            }
        }
    }

    fn on_reloaded(&mut self, tracks: usize) {
        self.emit(StationEvent::PlaylistReloaded { tracks });

        match self.state {
            StationState::Idle if tracks > 0 => self.restart(),
            StationState::Loading => {
                let current = matches!(
                    &self.slot,
                    Some(LoadSlot::InFlight { generation, .. })
                        if *generation == self.playlist.generation()
                );
                if !current {
                    self.restart();
                }
            }
            _ => {}
        }
    }

    fn on_disconnect(&mut self, id: ListenerId, failure: Option<ClientWriteFailure>) {
        if self.registry.remove(id).is_none() && failure.is_none() {
            return;
        }

        match failure {
            Some(failure) => tracing::info!("Dropped {}: {}", id, failure),
            None => tracing::info!("{} disconnected", id),
        }
        self.emit(StationEvent::ListenerLeft {
            listener: id,
            failure: failure.map(Into::into),
        });
        self.publish_status();
    }

    fn on_load(&mut self, outcome: LoadOutcome) {
        let generation = match &self.slot {
            Some(LoadSlot::InFlight {
                ticket, generation, ..
            }) if *ticket == outcome.ticket => *generation,
            _ => {
                tracing::debug!("Discarding superseded load of {}", outcome.id);
                return;
            }
        };

        if generation != self.playlist.generation() {
            tracing::debug!("Playlist changed while loading {}, restarting", outcome.id);
            self.restart();
            return;
        }

        self.slot = None;
        match outcome.result {
            Ok(track) => self.start_track(track),
            Err(e) => self.on_load_failed(&outcome.id, &e),
        }
    }

    /// Begin again from the playlist's current track
    fn restart(&mut self) {
        self.slot = None;
        self.failures = 0;
        match self.playlist.select_current() {
            Some(selection) => self.begin_load(selection),
            None => self.go_idle(),
        }
    }

    /// Playing -> Advancing -> Loading (or Idle)
    fn advance(&mut self) {
        self.set_state(StationState::Advancing);
        self.cursor = None;
        self.started_at = None;

        match self.playlist.select_next(self.config.policy) {
            Some(selection) => self.begin_load(selection),
            None => self.go_idle(),
        }
    }

    /// Spawn a load for `selection`, keeping the generation it was picked from
    fn begin_load(&mut self, selection: Selection) {
        let Selection { id, generation } = selection;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.slot = Some(LoadSlot::InFlight {
            ticket,
            id: id.clone(),
            generation,
        });
        self.set_state(StationState::Loading);
        tracing::debug!("Loading {}", id);

        let loader = Arc::clone(&self.loader);
        let load_tx = self.load_tx.clone();
        tokio::spawn(async move {
            let result = loader.load(&id).await;
            let _ = load_tx.send(LoadOutcome { ticket, id, result });
        });
    }

    fn start_track(&mut self, track: Track) {
        self.failures = 0;
        tracing::info!(
            "Now playing {} ({:?} at {} bps, {} bytes)",
            track.name(),
            track.duration(),
            track.bitrate(),
            track.payload_len()
        );

        let event = StationEvent::TrackStarted {
            track_id: track.id().clone(),
            duration_ms: duration_ms(track.duration()),
            bitrate: track.bitrate(),
        };
        self.cursor = Some(PlaybackCursor::new(track, Instant::now()));
        self.started_at = Some(Utc::now());
        self.set_state(StationState::Playing);
        self.emit(event);
        self.publish_status();
    }

    fn on_load_failed(&mut self, id: &TrackId, error: &LoadError) {
        self.failures += 1;
        tracing::warn!("Failed to load {}: {}", id, error);
        self.emit(StationEvent::TrackFailed {
            track_id: id.clone(),
            reason: error.to_string(),
        });

        let Some(next) = self.playlist.select_next(self.config.policy) else {
            self.go_idle();
            return;
        };

        let delay = retry_delay(
            self.failures,
            self.playlist.len(),
            self.config.retry_backoff,
            self.config.max_backoff,
        );
        tracing::debug!("Retrying with {} in {:?}", next.id, delay);
        self.slot = Some(LoadSlot::Waiting {
            id: next.id,
            generation: next.generation,
            retry_at: Instant::now() + delay,
        });
        self.publish_status();
    }

    fn go_idle(&mut self) {
        if self.state != StationState::Idle {
            tracing::warn!("Playlist is empty, station is idle");
        }
        self.cursor = None;
        self.started_at = None;
        self.slot = None;
        self.failures = 0;
        self.set_state(StationState::Idle);
        self.publish_status();
    }

    fn set_state(&mut self, state: StationState) {
        if self.state == state {
            return;
        }
        let from = self.state;
        self.state = state;
        tracing::debug!("Station {} -> {}", from, state);
        self.emit(StationEvent::StateChanged { from, to: state });
        self.publish_status();
    }

    fn emit(&self, event: StationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn publish_status(&self) {
        let now = Instant::now();
        let track = match (&self.cursor, self.started_at) {
            (Some(cursor), Some(started_at)) if self.state == StationState::Playing => {
                let track = cursor.track();
                Some(NowPlaying {
                    id: track.id().clone(),
                    name: track.name(),
                    duration_ms: duration_ms(track.duration()),
                    bitrate: track.bitrate(),
                    position_ms: duration_ms(cursor.elapsed(now).min(track.duration())),
                    delivered_bytes: cursor.delivered(),
                    payload_len: track.payload_len(),
                    started_at,
                })
            }
            _ => None,
        };

        self.status.send_replace(StationStatus {
            state: self.state,
            track,
            listeners: self.registry.len(),
        });
    }
}

/// Delay before the next load attempt after `failures` consecutive failures
///
/// `base` until a whole pass over the playlist has failed, then doubled per
/// additional failed pass, capped at `max`.
pub fn retry_delay(
    failures: usize,
    playlist_len: usize,
    base: Duration,
    max: Duration,
) -> Duration {
    let passes = failures.saturating_sub(1) / playlist_len.max(1);
    let factor = 1u32.checked_shl(passes.min(31) as u32).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(max).min(max)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Create an engine, spawn its tick loop, and return the handle
pub fn spawn(
    config: EngineConfig,
    playlist: Arc<PlaylistStore>,
    loader: Arc<dyn TrackLoader>,
) -> Result<StationHandle> {
    let (engine, handle) = BroadcastEngine::new(config, playlist, loader)?;
    tokio::spawn(engine.run());
    Ok(handle)
}
