//! Station handle and listener streams

use crate::engine::StationCommand;
use crate::events::{StationEvent, StationStatus};
use crate::playlist::PlaylistStore;
use crate::registry::ListenerId;
use airwave_core::{StationError, TrackId};
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Cloneable control surface for a running station
///
/// Every request is a message into the engine task; the handle never touches
/// playback state directly.
#[derive(Clone)]
pub struct StationHandle {
    commands: mpsc::Sender<StationCommand>,
    status: watch::Receiver<StationStatus>,
    events: broadcast::Sender<StationEvent>,
    playlist: Arc<PlaylistStore>,
}

impl StationHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<StationCommand>,
        status: watch::Receiver<StationStatus>,
        events: broadcast::Sender<StationEvent>,
        playlist: Arc<PlaylistStore>,
    ) -> Self {
        Self {
            commands,
            status,
            events,
            playlist,
        }
    }

    /// Tune in
    ///
    /// The returned listener first yields the catch-up bytes of the on-air
    /// track, then every live window.
    ///
    /// # Errors
    /// `EmptyPlaylist` while the station is idle, `Stopped` if the engine exited
    pub async fn connect(&self) -> Result<Listener, StationError> {
        let (reply, response) = oneshot::channel();
        self.send(StationCommand::Connect { reply }).await?;
        response.await.map_err(|_| StationError::Stopped)?
    }

    /// Cut the on-air track short and move to the next one
    ///
    /// Returns the identifier of the skipped track.
    ///
    /// # Errors
    /// `EmptyPlaylist` while idle, `TrackNotReady` while a load is pending
    pub async fn skip(&self) -> Result<TrackId, StationError> {
        let (reply, response) = oneshot::channel();
        self.send(StationCommand::Skip { reply }).await?;
        response.await.map_err(|_| StationError::Stopped)?
    }

    /// Rescan the music source and tell the engine
    ///
    /// The on-air track keeps playing. An idle station starts loading if the
    /// new playlist is non-empty.
    ///
    /// Returns the new playlist length.
    pub async fn reload(&self) -> Result<usize, StationError> {
        let playlist = Arc::clone(&self.playlist);
        let tracks = tokio::task::spawn_blocking(move || playlist.reload())
            .await
            .map_err(|e| {
                tracing::error!("Playlist reload task failed: {}", e);
                StationError::Stopped
            })?;

        self.send(StationCommand::PlaylistReloaded { tracks }).await?;
        Ok(tracks)
    }

    /// Latest status snapshot
    pub fn status(&self) -> StationStatus {
        self.status.borrow().clone()
    }

    /// Basename of the on-air track, if one is playing
    pub fn now_playing(&self) -> Option<String> {
        self.status.borrow().current_name().map(str::to_string)
    }

    /// Watch status snapshots as they change
    pub fn status_receiver(&self) -> watch::Receiver<StationStatus> {
        self.status.clone()
    }

    /// Subscribe to station events
    pub fn subscribe(&self) -> broadcast::Receiver<StationEvent> {
        self.events.subscribe()
    }

    /// The playlist backing this station
    pub fn playlist(&self) -> &Arc<PlaylistStore> {
        &self.playlist
    }

    async fn send(&self, command: StationCommand) -> Result<(), StationError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| StationError::Stopped)
    }
}

impl std::fmt::Debug for StationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationHandle")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

/// One tuned-in listener
///
/// Yields audio bytes as a `Stream`. Dropping it unregisters the listener.
#[derive(Debug)]
pub struct Listener {
    id: ListenerId,
    receiver: mpsc::Receiver<Bytes>,
    disconnect: mpsc::UnboundedSender<ListenerId>,
}

impl Listener {
    pub(crate) fn new(
        id: ListenerId,
        receiver: mpsc::Receiver<Bytes>,
        disconnect: mpsc::UnboundedSender<ListenerId>,
    ) -> Self {
        Self {
            id,
            receiver,
            disconnect,
        }
    }

    /// Listener identifier
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Next window, or `None` once the engine has dropped this listener
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.receiver.recv().await
    }

    /// Next already-queued window, if any
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for Listener {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        // Engine may already be gone
        let _ = self.disconnect.send(self.id);
    }
}
