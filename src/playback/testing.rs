//! Test doubles for the playback core.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::audio::{AudioDevice, DeviceError};
use crate::library::Track;

use super::clock::Clock;
use super::events::{ChannelSink, UiEvent};
use super::player::Player;
use super::playlist::{LoopMode, Playlist};

pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Load(PathBuf),
    Play,
    Pause,
    Resume,
    Stop,
    SetVolume(f32),
    SetPosition(Duration),
}

#[derive(Default)]
pub struct FakeDeviceState {
    pub calls: Vec<DeviceCall>,
    pub loaded: Option<PathBuf>,
    pub playing: bool,
    pub drained: bool,
    pub durations: HashMap<PathBuf, Duration>,
    pub unloadable: HashSet<PathBuf>,
    /// Commands (by name) that fail until removed.
    pub failing: HashSet<&'static str>,
}

/// In-memory device that records every call. Clones share state, so a test
/// keeps one clone while the player owns another.
#[derive(Clone, Default)]
pub struct FakeDevice {
    state: Arc<Mutex<FakeDeviceState>>,
}

impl FakeDevice {
    pub fn state(&self) -> MutexGuard<'_, FakeDeviceState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    fn command(&self, name: &'static str, call: DeviceCall) -> Result<(), DeviceError> {
        let mut s = self.state();
        if s.failing.contains(name) {
            return Err(DeviceError::Timeout { command: name });
        }
        s.calls.push(call);
        Ok(())
    }
}

impl AudioDevice for FakeDevice {
    fn load(&mut self, path: &Path) -> Result<Duration, DeviceError> {
        let mut s = self.state();
        s.calls.push(DeviceCall::Load(path.to_path_buf()));
        s.loaded = None;
        s.playing = false;
        if s.unloadable.contains(path) {
            return Err(DeviceError::Decode {
                path: path.to_path_buf(),
                reason: "unsupported format".into(),
            });
        }
        s.loaded = Some(path.to_path_buf());
        Ok(s.durations.get(path).copied().unwrap_or(Duration::ZERO))
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.command("play", DeviceCall::Play)?;
        self.state().playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        self.command("pause", DeviceCall::Pause)?;
        self.state().playing = false;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), DeviceError> {
        self.command("resume", DeviceCall::Resume)?;
        self.state().playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.command("stop", DeviceCall::Stop)?;
        let mut s = self.state();
        s.loaded = None;
        s.playing = false;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), DeviceError> {
        self.command("set_volume", DeviceCall::SetVolume(volume))
    }

    fn set_position(&mut self, offset: Duration) -> Result<(), DeviceError> {
        self.command("set_position", DeviceCall::SetPosition(offset))
    }

    fn is_finished(&mut self) -> Result<bool, DeviceError> {
        Ok(self.state().drained)
    }
}

pub fn track(index: usize, name: &str, secs: Option<u64>) -> Track {
    Track {
        index,
        path: PathBuf::from(format!("/music/{name}.mp3")),
        title: name.to_string(),
        artist: None,
        album: None,
        duration: secs.map(Duration::from_secs),
        display: name.to_string(),
    }
}

/// A player over fake collaborators, plus handles to observe them.
pub struct Fixture {
    pub player: Player,
    pub device: FakeDevice,
    pub clock: Arc<ManualClock>,
    pub events: Receiver<UiEvent>,
}

impl Fixture {
    /// `tracks` are `(name, duration in seconds)` pairs.
    pub fn new(tracks: &[(&str, u64)]) -> Self {
        let tracks = tracks
            .iter()
            .enumerate()
            .map(|(i, (name, secs))| track(i, name, Some(*secs)))
            .collect();
        Self::with_tracks(tracks, LoopMode::LoopAll)
    }

    pub fn with_tracks(tracks: Vec<Track>, loop_mode: LoopMode) -> Self {
        let device = FakeDevice::default();
        let clock = Arc::new(ManualClock::new());
        let (tx, events) = mpsc::channel();
        let player = Player::new(
            Playlist::new(tracks),
            Box::new(device.clone()),
            Arc::new(ChannelSink::new(tx)),
            clock.clone(),
            loop_mode,
        );
        Self {
            player,
            device,
            clock,
            events,
        }
    }

    pub fn secs(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }

    /// Everything the sink received since the last call.
    pub fn drain(&self) -> Vec<UiEvent> {
        self.events.try_iter().collect()
    }

    pub fn elapsed(&self) -> Duration {
        self.player.status().elapsed
    }
}
