//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the library, the
//! selection and the last playback state reported by the player.

mod model;

pub use model::*;
