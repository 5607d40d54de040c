use std::path::Path;

use crate::config::TrackDisplayField;

/// Build a display string for a track according to the provided `fields` and separator.
///
/// Empty or missing fields are skipped. Falls back to the file stem, then
/// `title`, when nothing was produced.
pub fn display_from_fields(
    path: &Path,
    title: &str,
    artist: Option<&str>,
    album: Option<&str>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let non_empty = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let stem = path.file_stem().and_then(|s| s.to_str());

    let parts: Vec<String> = fields
        .iter()
        .filter_map(|f| match f {
            TrackDisplayField::Title => non_empty(Some(title)),
            TrackDisplayField::Artist => non_empty(artist),
            TrackDisplayField::Album => non_empty(album),
            TrackDisplayField::Filename => non_empty(stem),
            TrackDisplayField::Path => Some(path.display().to_string()),
        })
        .collect();

    if !parts.is_empty() {
        parts.join(sep)
    } else if let Some(stem) = non_empty(stem) {
        stem
    } else {
        title.to_string()
    }
}
