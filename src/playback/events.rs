//! Notifications pushed from the playback core to whoever renders it.

use std::sync::mpsc::Sender;
use std::time::Duration;

use super::error::PlayerError;

/// What a track row's indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowState {
    #[default]
    Idle,
    Playing,
    Paused,
    /// The last attempt to load this track failed.
    Failed,
}

/// Receiver of playback notifications.
///
/// Calls are made while the player's lock is held: implementations must be
/// quick and must not call back into the [`Player`](super::Player).
pub trait PlayerSink: Send + Sync {
    fn on_track_changed(&self, name: &str, is_playing: bool, duration: Duration);
    /// No track is active any more.
    fn on_track_cleared(&self);
    fn on_progress(&self, progress: f64, elapsed: Duration);
    /// Sent once when the session becomes idle, so the progress bar can go away.
    fn on_progress_hidden(&self);
    fn on_state_changed(&self, index: usize, state: RowState);
    fn on_error(&self, error: &PlayerError);
}

/// Owned form of a [`PlayerSink`] notification.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    TrackChanged {
        name: String,
        is_playing: bool,
        duration: Duration,
    },
    TrackCleared,
    Progress {
        progress: f64,
        elapsed: Duration,
    },
    ProgressHidden,
    RowState {
        index: usize,
        state: RowState,
    },
    Error(String),
}

/// Sink that forwards every notification as a [`UiEvent`] over a channel.
/// The terminal event loop drains the other end between frames.
pub struct ChannelSink {
    tx: Sender<UiEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<UiEvent>) -> Self {
        Self { tx }
    }

    fn push(&self, event: UiEvent) {
        // A closed receiver means the UI is shutting down.
        let _ = self.tx.send(event);
    }
}

impl PlayerSink for ChannelSink {
    fn on_track_changed(&self, name: &str, is_playing: bool, duration: Duration) {
        self.push(UiEvent::TrackChanged {
            name: name.to_string(),
            is_playing,
            duration,
        });
    }

    fn on_track_cleared(&self) {
        self.push(UiEvent::TrackCleared);
    }

    fn on_progress(&self, progress: f64, elapsed: Duration) {
        self.push(UiEvent::Progress { progress, elapsed });
    }

    fn on_progress_hidden(&self) {
        self.push(UiEvent::ProgressHidden);
    }

    fn on_state_changed(&self, index: usize, state: RowState) {
        self.push(UiEvent::RowState { index, state });
    }

    fn on_error(&self, error: &PlayerError) {
        self.push(UiEvent::Error(error.to_string()));
    }
}
