//! Messages exchanged with the audio thread.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

use super::device::DeviceError;

/// One-shot reply channel carried by each request.
pub(super) type Reply<T> = Sender<Result<T, DeviceError>>;

#[derive(Debug)]
pub(super) enum DeviceCmd {
    Load { path: PathBuf, reply: Reply<Duration> },
    Play(Reply<()>),
    Pause(Reply<()>),
    Resume(Reply<()>),
    Stop(Reply<()>),
    SetVolume(f32, Reply<()>),
    SetPosition(Duration, Reply<()>),
    IsFinished(Reply<bool>),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
