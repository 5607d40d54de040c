use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use super::device::{AudioDevice, DeviceError};
use super::thread::spawn_audio_thread;
use super::types::{DeviceCmd, Reply};

/// Handle to the rodio audio thread.
///
/// Every call is a request/reply round trip bounded by `timeout`, so a stuck
/// backend surfaces as [`DeviceError::Timeout`] instead of freezing the UI.
/// Dropping the handle fades out and joins the thread.
pub struct RodioDevice {
    tx: Sender<DeviceCmd>,
    timeout: Duration,
    quit_fade_out: Duration,
    join: Option<JoinHandle<()>>,
}

impl RodioDevice {
    /// Open the default output device.
    pub fn open(timeout: Duration, quit_fade_out: Duration) -> Result<Self, DeviceError> {
        let (tx, rx) = mpsc::channel::<DeviceCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let join = spawn_audio_thread(rx, ready_tx);

        match ready_rx.recv_timeout(timeout) {
            Ok(Ok(())) => Ok(Self::from_parts(tx, timeout, quit_fade_out, Some(join))),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(RecvTimeoutError::Timeout) => Err(DeviceError::Timeout { command: "open" }),
            Err(RecvTimeoutError::Disconnected) => Err(DeviceError::Disconnected),
        }
    }

    pub(super) fn from_parts(
        tx: Sender<DeviceCmd>,
        timeout: Duration,
        quit_fade_out: Duration,
        join: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            tx,
            timeout,
            quit_fade_out,
            join,
        }
    }

    fn request<T>(
        &self,
        command: &'static str,
        make: impl FnOnce(Reply<T>) -> DeviceCmd,
    ) -> Result<T, DeviceError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| DeviceError::Disconnected)?;

        match reply_rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(DeviceError::Timeout { command }),
            Err(RecvTimeoutError::Disconnected) => Err(DeviceError::Disconnected),
        }
    }
}

impl AudioDevice for RodioDevice {
    fn load(&mut self, path: &Path) -> Result<Duration, DeviceError> {
        let path = path.to_path_buf();
        self.request("load", |reply| DeviceCmd::Load { path, reply })
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.request("play", DeviceCmd::Play)
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        self.request("pause", DeviceCmd::Pause)
    }

    fn resume(&mut self) -> Result<(), DeviceError> {
        self.request("resume", DeviceCmd::Resume)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.request("stop", DeviceCmd::Stop)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), DeviceError> {
        self.request("set_volume", |reply| DeviceCmd::SetVolume(volume, reply))
    }

    fn set_position(&mut self, offset: Duration) -> Result<(), DeviceError> {
        self.request("set_position", |reply| DeviceCmd::SetPosition(offset, reply))
    }

    fn is_finished(&mut self) -> Result<bool, DeviceError> {
        self.request("is_finished", DeviceCmd::IsFinished)
    }
}

impl Drop for RodioDevice {
    fn drop(&mut self) {
        let _ = self.tx.send(DeviceCmd::Quit {
            fade_out_ms: self.quit_fade_out.as_millis() as u64,
        });

        if let Some(h) = self.join.take() {
            if h.join().is_err() {
                warn!("audio thread panicked");
            }
        }
    }
}
