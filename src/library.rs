//! Track discovery: walks the music directory once at startup and turns
//! every recognised audio file into a [`Track`].

mod display;
mod model;
mod scan;

pub use model::Track;
pub use scan::scan;
