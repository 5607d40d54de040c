//! The playback state machine.
//!
//! A [`PlaybackSession`] owns the audio device and knows which track (if any)
//! is active and how far into it playback is. The device only plays audio;
//! elapsed time is derived here from the clock, and survives pause, resume
//! and seek.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::audio::{AudioDevice, DeviceError};
use crate::library::Track;

use super::clock::Clock;
use super::error::{DeviceCommand, PlayerError, Result};
use super::events::{PlayerSink, RowState};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Elapsed time as `accumulated` plus however long we have been running
/// since `running_since`. Paused timelines have no `running_since`.
#[derive(Debug, Clone, Copy)]
struct Timeline {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Timeline {
    fn running_from(offset: Duration, now: Instant) -> Self {
        Self {
            accumulated: offset,
            running_since: Some(now),
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .running_since
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since));
        self.accumulated + running
    }

    fn freeze(&mut self, now: Instant) {
        self.accumulated = self.elapsed(now);
        self.running_since = None;
    }

    fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }
}

/// The track currently loaded into the device. Existing at all means the
/// session is not stopped.
#[derive(Debug)]
struct ActiveTrack {
    track: Track,
    duration: Duration,
    paused: bool,
    timeline: Timeline,
    /// Set once the end of this track has been acted on.
    completion_claimed: bool,
}

/// Point-in-time view of the active track's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub state: PlaybackState,
    pub index: usize,
    /// Unclamped; may run past `duration` until the monitor advances.
    pub elapsed: Duration,
    pub duration: Duration,
    /// `elapsed / duration` clamped to `[0, 1]`; zero when the duration is unknown.
    pub fraction: f64,
}

pub struct PlaybackSession {
    device: Box<dyn AudioDevice>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn PlayerSink>,
    active: Option<ActiveTrack>,
    volume: f32,
}

/// Log `err`, hand it to the sink and give it back for returning.
fn report(sink: &dyn PlayerSink, err: PlayerError) -> PlayerError {
    warn!(error = %err, "playback error");
    sink.on_error(&err);
    err
}

fn command_failed(command: DeviceCommand, source: DeviceError) -> PlayerError {
    PlayerError::DeviceCommand { command, source }
}

impl PlaybackSession {
    pub fn new(
        device: Box<dyn AudioDevice>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn PlayerSink>,
    ) -> Self {
        Self {
            device,
            clock,
            sink,
            active: None,
            volume: 1.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        match &self.active {
            None => PlaybackState::Stopped,
            Some(a) if a.paused => PlaybackState::Paused,
            Some(_) => PlaybackState::Playing,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.track.index)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn progress(&self) -> Option<Progress> {
        let active = self.active.as_ref()?;
        let elapsed = active.timeline.elapsed(self.clock.now());
        let fraction = if active.duration.is_zero() {
            0.0
        } else {
            (elapsed.as_secs_f64() / active.duration.as_secs_f64()).clamp(0.0, 1.0)
        };

        Some(Progress {
            state: self.state(),
            index: active.track.index,
            elapsed,
            duration: active.duration,
            fraction,
        })
    }

    /// Make `track` the one playing track, stopping whatever was active.
    ///
    /// Returns the duration in use, which is the track's own when known and
    /// the device's answer otherwise.
    pub fn activate(&mut self, track: &Track) -> Result<Duration> {
        let had_previous = self.release();

        let loaded = match self.device.load(&track.path) {
            Ok(d) => d,
            Err(source) => {
                return Err(self.fail_activation(track, had_previous, PlayerError::Load {
                    path: track.path.clone(),
                    source,
                }));
            }
        };

        if let Err(source) = self.device.play() {
            if let Err(e) = self.device.stop() {
                warn!(error = %e, "releasing unplayable track failed");
            }
            return Err(self.fail_activation(
                track,
                had_previous,
                command_failed(DeviceCommand::Play, source),
            ));
        }

        let duration = track
            .duration
            .filter(|d| !d.is_zero())
            .unwrap_or(loaded);
        self.active = Some(ActiveTrack {
            track: track.clone(),
            duration,
            paused: false,
            timeline: Timeline::running_from(Duration::ZERO, self.clock.now()),
            completion_claimed: false,
        });

        debug!(index = track.index, ?duration, "playing {}", track.display);
        self.sink.on_track_changed(&track.display, true, duration);
        self.sink.on_state_changed(track.index, RowState::Playing);
        Ok(duration)
    }

    fn fail_activation(&self, track: &Track, had_previous: bool, err: PlayerError) -> PlayerError {
        if had_previous {
            self.sink.on_track_cleared();
        }
        self.sink.on_state_changed(track.index, RowState::Failed);
        report(self.sink.as_ref(), err)
    }

    /// Stop-first half of `activate`. The next `load` replaces the stream
    /// anyway, so a failing `stop` is only logged.
    fn release(&mut self) -> bool {
        let Some(previous) = self.active.take() else {
            return false;
        };
        if let Err(e) = self.device.stop() {
            warn!(error = %e, index = previous.track.index, "stopping previous track failed");
        }
        self.sink.on_state_changed(previous.track.index, RowState::Idle);
        true
    }

    /// Pause a playing track or resume a paused one. Does nothing when stopped.
    pub fn toggle_pause(&mut self) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let index = active.track.index;

        let (command, result, next_row) = if active.paused {
            (DeviceCommand::Resume, self.device.resume(), RowState::Playing)
        } else {
            (DeviceCommand::Pause, self.device.pause(), RowState::Paused)
        };

        if let Err(source) = result {
            // Keep the icon on what the device is actually doing.
            let actual = if active.paused {
                RowState::Paused
            } else {
                RowState::Playing
            };
            self.sink.on_state_changed(index, actual);
            return Err(report(self.sink.as_ref(), command_failed(command, source)));
        }

        let now = self.clock.now();
        if active.paused {
            active.timeline.resume(now);
        } else {
            active.timeline.freeze(now);
        }
        active.paused = !active.paused;

        debug!(index, paused = active.paused, "toggled");
        self.sink.on_state_changed(index, next_row);
        Ok(())
    }

    /// Stop playback. Stopping a stopped session is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        let Some(index) = self.active_index() else {
            return Ok(());
        };

        if let Err(source) = self.device.stop() {
            return Err(report(
                self.sink.as_ref(),
                command_failed(DeviceCommand::Stop, source),
            ));
        }

        self.active = None;
        debug!(index, "stopped");
        self.sink.on_state_changed(index, RowState::Idle);
        self.sink.on_track_cleared();
        Ok(())
    }

    /// Jump to `fraction` of the track. Only a playing track can be seeked;
    /// otherwise the call is ignored so it never starts playback.
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            return Ok(());
        }
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if active.paused {
            debug!("seek ignored while paused");
            return Ok(());
        }
        if active.duration.is_zero() {
            debug!("seek ignored, track length unknown");
            return Ok(());
        }

        let target = active.duration.mul_f64(fraction.clamp(0.0, 1.0));
        if let Err(source) = self.device.set_position(target) {
            return Err(report(
                self.sink.as_ref(),
                command_failed(DeviceCommand::Seek, source),
            ));
        }

        active.timeline = Timeline::running_from(target, self.clock.now());
        active.completion_claimed = false;
        debug!(?target, "seeked");
        Ok(())
    }

    /// Set the output volume, clamped to `[0, 1]`, whatever the state.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !volume.is_finite() {
            return Ok(());
        }
        let volume = volume.clamp(0.0, 1.0);

        if let Err(source) = self.device.set_volume(volume) {
            return Err(report(
                self.sink.as_ref(),
                command_failed(DeviceCommand::Volume, source),
            ));
        }
        self.volume = volume;
        Ok(())
    }

    /// Whether the device has run out of audio. Used for tracks whose
    /// duration is unknown; a failing query counts as "not yet".
    pub fn device_drained(&mut self) -> bool {
        match self.device.is_finished() {
            Ok(done) => done,
            Err(e) => {
                debug!(error = %e, "is_finished query failed");
                false
            }
        }
    }

    /// Claim the end of the active track for handling. Only the first call
    /// per activation returns `true`.
    pub fn claim_completion(&mut self) -> bool {
        match self.active.as_mut() {
            Some(a) if !a.completion_claimed => {
                a.completion_claimed = true;
                true
            }
            _ => false,
        }
    }

    /// Report `err` through the same channel as the session's own failures.
    pub fn report(&self, err: PlayerError) -> PlayerError {
        report(self.sink.as_ref(), err)
    }

    pub fn sink(&self) -> &dyn PlayerSink {
        self.sink.as_ref()
    }
}
