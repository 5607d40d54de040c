//! Error types for playback management.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::audio::DeviceError;

/// Device commands issued by the session after a track is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Play,
    Pause,
    Resume,
    Stop,
    Seek,
    Volume,
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Seek => "seek",
            Self::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// Playback errors. All of them are recoverable: the session is left in a
/// consistent state and the user may simply try again.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The file could not be opened or decoded; the session stays stopped.
    #[error("cannot play {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: DeviceError,
    },

    /// The device rejected a command; the transition was not applied.
    #[error("{command} failed: {source}")]
    DeviceCommand {
        command: DeviceCommand,
        #[source]
        source: DeviceError,
    },

    #[error("no playable tracks found")]
    EmptyPlaylist,

    #[error("track index {0} is out of range")]
    TrackOutOfRange(usize),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
