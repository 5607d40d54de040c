//! The playback core: one [`Player`] owning the single playback session and
//! the playlist, a [`ProgressMonitor`] driving progress and auto-advance, and
//! the [`PlayerSink`] seam through which the UI hears about both.

mod clock;
mod error;
mod events;
mod monitor;
mod player;
mod playlist;
mod session;

pub use clock::SystemClock;
pub use error::{PlayerError, Result};
pub use events::{ChannelSink, PlayerSink, RowState, UiEvent};
pub use monitor::ProgressMonitor;
pub use player::Player;
pub use playlist::{LoopMode, Playlist};
pub use session::PlaybackState;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;
