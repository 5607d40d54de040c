use std::path::PathBuf;
use std::time::Duration;

/// One playable file as produced by the scanner.
///
/// `index` is the track's stable position in the playlist; `duration` is
/// `None` when the tags could not be read and gets learned on first load.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub index: usize,
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
}
