//! Audio output.
//!
//! [`AudioDevice`] is the capability the playback core drives; [`RodioDevice`]
//! implements it on top of a dedicated rodio thread.

mod backend;
mod device;
mod sink;
mod thread;
mod types;

pub use backend::RodioDevice;
pub use device::{AudioDevice, DeviceError};
