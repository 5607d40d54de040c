use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::device::DeviceError;
use super::sink::{create_sink_at, probe_duration};
use super::types::DeviceCmd;

/// Everything the audio thread owns. `OutputStream` is not `Send`, so it is
/// created on, and never leaves, this thread.
struct AudioThread {
    stream: OutputStream,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
    volume: f32,
}

impl AudioThread {
    fn sink(&self) -> Result<&Sink, DeviceError> {
        self.sink.as_ref().ok_or(DeviceError::NotLoaded)
    }

    fn load(&mut self, path: PathBuf) -> Result<Duration, DeviceError> {
        // Only one stream at a time: the previous file is released even if
        // the new one turns out to be unreadable.
        self.release();

        let (sink, total) = create_sink_at(&self.stream, &path, Duration::ZERO)?;
        sink.set_volume(self.volume);
        let duration = total
            .or_else(|| probe_duration(&path))
            .unwrap_or(Duration::ZERO);

        debug!(path = %path.display(), ?duration, "loaded");
        self.sink = Some(sink);
        self.loaded = Some(path);
        Ok(duration)
    }

    fn release(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.loaded = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }

    fn set_position(&mut self, pos: Duration) -> Result<(), DeviceError> {
        let sink = self.sink()?;
        let Err(seek_err) = sink.try_seek(pos) else {
            return Ok(());
        };

        // Not every decoder can seek; rebuild the sink and skip into the file.
        debug!(error = %seek_err, "try_seek unsupported, rebuilding sink");
        let was_paused = sink.is_paused();
        let path = self.loaded.clone().ok_or(DeviceError::NotLoaded)?;
        let (new_sink, _) = create_sink_at(&self.stream, &path, pos)
            .map_err(|e| DeviceError::Seek(e.to_string()))?;
        new_sink.set_volume(self.volume);
        if !was_paused {
            new_sink.play();
        }
        if let Some(old) = self.sink.replace(new_sink) {
            old.stop();
        }
        Ok(())
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if fade_out_ms == 0 || sink.is_paused() {
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            sink.set_volume(self.volume * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<DeviceCmd>,
    ready: Sender<Result<(), DeviceError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(DeviceError::NoOutput(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut audio = AudioThread {
            stream,
            sink: None,
            loaded: None,
            volume: 1.0,
        };

        // Replies may fail to send if the caller gave up waiting; that is
        // already reported on its side as a timeout.
        while let Ok(cmd) = rx.recv() {
            match cmd {
                DeviceCmd::Load { path, reply } => {
                    let _ = reply.send(audio.load(path));
                }
                DeviceCmd::Play(reply) | DeviceCmd::Resume(reply) => {
                    let _ = reply.send(audio.sink().map(Sink::play));
                }
                DeviceCmd::Pause(reply) => {
                    let _ = reply.send(audio.sink().map(Sink::pause));
                }
                DeviceCmd::Stop(reply) => {
                    audio.release();
                    let _ = reply.send(Ok(()));
                }
                DeviceCmd::SetVolume(volume, reply) => {
                    audio.set_volume(volume);
                    let _ = reply.send(Ok(()));
                }
                DeviceCmd::SetPosition(pos, reply) => {
                    let _ = reply.send(audio.set_position(pos));
                }
                DeviceCmd::IsFinished(reply) => {
                    let finished = audio.sink.as_ref().is_some_and(Sink::empty);
                    let _ = reply.send(Ok(finished));
                }
                DeviceCmd::Quit { fade_out_ms } => {
                    audio.fade_out(fade_out_ms);
                    audio.release();
                    debug!("audio thread quitting");
                    return;
                }
            }
        }

        warn!("audio command channel closed without quit");
        audio.release();
    })
}
