use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info};

use crate::audio::AudioDevice;

use super::clock::Clock;
use super::error::{PlayerError, Result};
use super::events::PlayerSink;
use super::playlist::{LoopMode, Playlist};
use super::session::{PlaybackSession, PlaybackState};

/// Snapshot of the player for callers that need to ask rather than listen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStatus {
    pub state: PlaybackState,
    pub index: Option<usize>,
    pub elapsed: Duration,
    pub duration: Duration,
    pub volume: f32,
    pub loop_mode: LoopMode,
}

/// What one progress-monitor tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Nothing is active; progress counts as `(0, 0)`.
    Idle,
    Progress { progress: f64, elapsed: Duration },
    /// The track finished and the one at `index` was activated.
    Advanced { index: usize },
    /// The track finished and nothing follows it.
    Finished,
    /// The track finished but stopping or advancing failed. The error went
    /// to the sink; the end of this track is not acted on again.
    Failed,
}

struct Core {
    session: PlaybackSession,
    playlist: Playlist,
    loop_mode: LoopMode,
    progress_visible: bool,
}

/// The one owner of the playback session and playlist.
///
/// Cloning gives another handle to the same player. Every operation, from
/// the UI or the progress monitor, runs under a single lock, so nobody ever
/// sees a half-applied transition.
#[derive(Clone)]
pub struct Player {
    core: Arc<Mutex<Core>>,
}

impl Player {
    pub fn new(
        playlist: Playlist,
        device: Box<dyn AudioDevice>,
        sink: Arc<dyn PlayerSink>,
        clock: Arc<dyn Clock>,
        loop_mode: LoopMode,
    ) -> Self {
        let core = Core {
            session: PlaybackSession::new(device, clock, sink),
            playlist,
            loop_mode,
            progress_visible: false,
        };
        Self {
            core: Arc::new(Mutex::new(core)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        // Every transition leaves the session consistent before it can
        // panic into a sink, so a poisoned lock is still usable.
        self.core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Play the track at `index`, stopping whatever was playing.
    pub fn activate(&self, index: usize) -> Result<()> {
        self.lock().activate(index)
    }

    /// Play/pause. When stopped, starts the track under the cursor (or the
    /// first track).
    pub fn toggle(&self) -> Result<()> {
        let mut core = self.lock();
        if core.session.state() != PlaybackState::Stopped {
            return core.session.toggle_pause();
        }
        if core.playlist.is_empty() {
            return Err(core.session.report(PlayerError::EmptyPlaylist));
        }
        let index = core.playlist.current().unwrap_or(0);
        core.activate(index)
    }

    pub fn stop(&self) -> Result<()> {
        self.lock().session.stop()
    }

    /// Seek the playing track to `fraction` of its length.
    pub fn seek(&self, fraction: f64) -> Result<()> {
        self.lock().session.seek(fraction)
    }

    /// Seek relative to the current position by `delta_secs`.
    pub fn scrub(&self, delta_secs: i64) -> Result<()> {
        let mut core = self.lock();
        let Some(p) = core.session.progress() else {
            return Ok(());
        };
        if p.duration.is_zero() {
            return Ok(());
        }
        let target = p.elapsed.as_secs_f64() + delta_secs as f64;
        core.session.seek(target / p.duration.as_secs_f64())
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.lock().session.set_volume(volume)
    }

    pub fn adjust_volume(&self, delta: f32) -> Result<()> {
        let mut core = self.lock();
        let volume = core.session.volume() + delta;
        core.session.set_volume(volume)
    }

    /// Skip forward, wrapping to the first track after the last.
    pub fn next(&self) -> Result<()> {
        let mut core = self.lock();
        match core.playlist.next() {
            Some(index) => core.activate(index),
            None => Err(core.session.report(PlayerError::EmptyPlaylist)),
        }
    }

    /// Skip back. At the first track this does nothing at all.
    pub fn previous(&self) -> Result<()> {
        let mut core = self.lock();
        match core.playlist.previous() {
            Some(index) => core.activate(index),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub fn set_loop_mode(&self, mode: LoopMode) {
        self.lock().loop_mode = mode;
    }

    pub fn cycle_loop_mode(&self) -> LoopMode {
        let mut core = self.lock();
        core.loop_mode = core.loop_mode.cycle();
        core.loop_mode
    }

    pub fn status(&self) -> SessionStatus {
        let core = self.lock();
        let progress = core.session.progress();
        SessionStatus {
            state: core.session.state(),
            index: core.session.active_index(),
            elapsed: progress.map_or(Duration::ZERO, |p| p.elapsed),
            duration: progress.map_or(Duration::ZERO, |p| p.duration),
            volume: core.session.volume(),
            loop_mode: core.loop_mode,
        }
    }

    /// Recompute progress, notify the sink and auto-advance on completion.
    pub fn tick(&self) -> Tick {
        self.lock().tick()
    }
}

impl Core {
    fn activate(&mut self, index: usize) -> Result<()> {
        let Some(track) = self.playlist.select(index).cloned() else {
            return Err(self.session.report(PlayerError::TrackOutOfRange(index)));
        };
        let duration = self.session.activate(&track)?;
        self.playlist.remember_duration(index, duration);
        Ok(())
    }

    fn tick(&mut self) -> Tick {
        let Some(p) = self.session.progress() else {
            if self.progress_visible {
                self.progress_visible = false;
                self.session.sink().on_progress_hidden();
            }
            return Tick::Idle;
        };

        self.progress_visible = true;
        let shown_elapsed = if p.duration.is_zero() {
            p.elapsed
        } else {
            p.elapsed.min(p.duration)
        };
        self.session.sink().on_progress(p.fraction, shown_elapsed);

        if p.state != PlaybackState::Playing {
            return Tick::Progress {
                progress: p.fraction,
                elapsed: p.elapsed,
            };
        }
        let complete = if p.duration.is_zero() {
            self.session.device_drained()
        } else {
            p.fraction >= 1.0
        };
        if !complete || !self.session.claim_completion() {
            return Tick::Progress {
                progress: p.fraction,
                elapsed: p.elapsed,
            };
        }

        info!(index = p.index, "track finished");
        let Some(index) = self.playlist.after_completion(self.loop_mode) else {
            return match self.session.stop() {
                Ok(()) => Tick::Finished,
                Err(e) => {
                    debug!(error = %e, "stop after last track failed");
                    Tick::Failed
                }
            };
        };
        match self.activate(index) {
            Ok(()) => Tick::Advanced { index },
            Err(e) => {
                debug!(error = %e, index, "auto-advance failed");
                Tick::Failed
            }
        }
    }
}
