//! Application model types: `App` and `NowPlaying`.
//!
//! The `App` struct is what the terminal UI renders. It never reads the
//! player; it is updated only from the [`UiEvent`]s the player pushes.

use std::time::Duration;

use crate::library::Track;
use crate::playback::{LoopMode, PlaybackState, RowState, UiEvent};

/// The track shown in the status box.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub name: String,
    pub duration: Duration,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub playback: PlaybackState,
    /// Row of the active track, if any.
    pub active: Option<usize>,
    pub now_playing: Option<NowPlaying>,
    /// Latest `(fraction, elapsed)` from the progress monitor.
    pub progress: Option<(f64, Duration)>,
    pub rows: Vec<RowState>,
    pub last_error: Option<String>,

    pub follow_playback: bool,
    pub loop_mode: LoopMode,
    pub volume: f32,
    pub current_dir: Option<String>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        let rows = vec![RowState::Idle; tracks.len()];
        Self {
            tracks,
            selected: 0,
            playback: PlaybackState::Stopped,
            active: None,
            now_playing: None,
            progress: None,
            rows,
            last_error: None,

            follow_playback: true,
            loop_mode: LoopMode::default(),
            volume: 1.0,
            current_dir: None,
        }
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Fold one player notification into the model.
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::TrackChanged { name, duration, .. } => {
                self.now_playing = Some(NowPlaying { name, duration });
                self.progress = Some((0.0, Duration::ZERO));
                self.last_error = None;
            }
            UiEvent::TrackCleared => {
                self.now_playing = None;
                self.active = None;
                self.playback = PlaybackState::Stopped;
            }
            UiEvent::Progress { progress, elapsed } => {
                self.progress = Some((progress, elapsed));
            }
            UiEvent::ProgressHidden => {
                self.progress = None;
            }
            UiEvent::RowState { index, state } => self.apply_row_state(index, state),
            UiEvent::Error(msg) => {
                self.last_error = Some(msg);
            }
        }
    }

    fn apply_row_state(&mut self, index: usize, state: RowState) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        *row = state;

        match state {
            RowState::Playing | RowState::Paused => {
                self.active = Some(index);
                self.playback = if state == RowState::Playing {
                    PlaybackState::Playing
                } else {
                    PlaybackState::Paused
                };
                if self.follow_playback {
                    self.selected = index;
                }
            }
            RowState::Idle | RowState::Failed => {
                if self.active == Some(index) {
                    self.active = None;
                    self.playback = PlaybackState::Stopped;
                }
            }
        }
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    /// Disable follow-playback.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Return true if the library contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Set the selected track index, ignoring out-of-range values.
    #[cfg(test)]
    pub fn set_selected(&mut self, idx: usize) {
        if idx < self.tracks.len() {
            self.selected = idx;
        }
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.tracks.len() - 1);
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }
}
