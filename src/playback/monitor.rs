use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use super::player::Player;

/// Background ticker that calls [`Player::tick`] every `interval`.
///
/// The loop waits on a cancellation channel rather than sleeping, so
/// [`cancel`](Self::cancel) (or dropping the monitor) stops it promptly and
/// joins the thread. After that the monitor no longer holds the player.
pub struct ProgressMonitor {
    cancel: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ProgressMonitor {
    pub fn spawn(player: Player, interval: Duration) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let join = thread::spawn(move || {
            loop {
                match cancel_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        player.tick();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("progress monitor stopped");
        });

        Self {
            cancel: Some(cancel_tx),
            join: Some(join),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.cancel();
    }
}
