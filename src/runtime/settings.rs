use crate::config::Settings;

/// Load settings, falling back to defaults on any problem.
///
/// Logging is not up yet when this runs (its location is itself a setting),
/// so the problem comes back as a message for the caller to log.
pub fn load_settings() -> (Settings, Option<String>) {
    match Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        Err(e) => (
            Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}
