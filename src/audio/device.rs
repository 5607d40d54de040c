use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Failures reported by an audio backend.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no audio output device: {0}")]
    NoOutput(String),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("no track loaded")]
    NotLoaded,

    #[error("seek failed: {0}")]
    Seek(String),

    #[error("audio thread did not answer `{command}` in time")]
    Timeout { command: &'static str },

    #[error("audio thread is gone")]
    Disconnected,
}

/// The single output stream the player owns.
///
/// Loading a file replaces whatever was loaded before; a freshly loaded file
/// is paused until [`AudioDevice::play`] is called.
pub trait AudioDevice: Send {
    /// Load `path`, returning its duration (zero when it cannot be determined).
    fn load(&mut self, path: &Path) -> Result<Duration, DeviceError>;
    fn play(&mut self) -> Result<(), DeviceError>;
    fn pause(&mut self) -> Result<(), DeviceError>;
    fn resume(&mut self) -> Result<(), DeviceError>;
    /// Release the loaded file. Stopping an idle device is not an error.
    fn stop(&mut self) -> Result<(), DeviceError>;
    fn set_volume(&mut self, volume: f32) -> Result<(), DeviceError>;
    fn set_position(&mut self, offset: Duration) -> Result<(), DeviceError>;

    /// Whether the loaded file has played out. Backends that cannot tell
    /// report `false`.
    fn is_finished(&mut self) -> Result<bool, DeviceError> {
        Ok(false)
    }
}
