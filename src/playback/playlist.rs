use std::time::Duration;

use crate::config::LoopModeSetting;
use crate::library::Track;

/// What happens when a track plays to the end.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Stop after the last track.
    NoLoop,
    /// Wrap around to the first track.
    #[default]
    LoopAll,
    /// Repeat the current track.
    LoopOne,
}

impl LoopMode {
    /// Cycle `NoLoop -> LoopAll -> LoopOne -> NoLoop`.
    pub fn cycle(self) -> Self {
        match self {
            Self::NoLoop => Self::LoopAll,
            Self::LoopAll => Self::LoopOne,
            Self::LoopOne => Self::NoLoop,
        }
    }
}

impl From<LoopModeSetting> for LoopMode {
    fn from(setting: LoopModeSetting) -> Self {
        match setting {
            LoopModeSetting::NoLoop => Self::NoLoop,
            LoopModeSetting::LoopAll => Self::LoopAll,
            LoopModeSetting::LoopOne => Self::LoopOne,
        }
    }
}

/// The fixed, ordered track list and its cursor.
///
/// The cursor only ever holds a valid index. Moving it does not play
/// anything; the player activates whatever the cursor lands on.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            current: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Point the cursor at `index` if it exists.
    pub fn select(&mut self, index: usize) -> Option<&Track> {
        let track = self.tracks.get(index)?;
        self.current = Some(index);
        Some(track)
    }

    /// Move forward, wrapping from the last track to the first. With no
    /// cursor yet, lands on the first track.
    pub fn next(&mut self) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(i) if i + 1 < self.tracks.len() => i + 1,
            _ => 0,
        };
        self.current = Some(next);
        Some(next)
    }

    /// Move back one track. Does not wrap: at the first track (or with no
    /// cursor) nothing changes and `None` is returned.
    pub fn previous(&mut self) -> Option<usize> {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                self.current
            }
            _ => None,
        }
    }

    /// Where playback continues after the current track finished, per `mode`.
    /// `None` means playback should stop.
    pub fn after_completion(&mut self, mode: LoopMode) -> Option<usize> {
        match mode {
            LoopMode::LoopAll => self.next(),
            LoopMode::LoopOne => self.current,
            LoopMode::NoLoop => match self.current {
                Some(i) if i + 1 >= self.tracks.len() => None,
                _ => self.next(),
            },
        }
    }

    /// Record a duration learned from the device for a track the scanner
    /// could not measure.
    pub fn remember_duration(&mut self, index: usize, duration: Duration) {
        if let Some(track) = self.tracks.get_mut(index) {
            if track.duration.is_none() && !duration.is_zero() {
                track.duration = Some(duration);
            }
        }
    }
}
