use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioDevice;
use crate::library::scan;
use crate::logging;
use crate::playback::{
    ChannelSink, Player, PlayerError, PlayerSink, Playlist, ProgressMonitor, SystemClock, UiEvent,
};

mod event_loop;
mod settings;

/// The directory to play: the first argument if given, else the working
/// directory. Paths are kept as-is, so non-UTF-8 names survive.
fn library_dir(arg: Option<OsString>) -> io::Result<PathBuf> {
    match arg {
        Some(arg) => Ok(PathBuf::from(arg)),
        None => env::current_dir(),
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    match logging::init(&settings.logging) {
        Ok(Some(path)) => info!(path = %path.display(), "logging started"),
        Ok(None) => {}
        Err(e) => eprintln!("monotrack: logging disabled: {e}"),
    }
    if let Some(msg) = &config_warning {
        warn!("{msg}");
    }

    let dir = library_dir(env::args_os().nth(1))?;

    let tracks = scan(&dir, &settings.library);

    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>();
    let sink: Arc<dyn PlayerSink> = Arc::new(ChannelSink::new(ui_tx));

    let device = RodioDevice::open(
        Duration::from_millis(settings.audio.command_timeout_ms),
        Duration::from_millis(settings.audio.quit_fade_out_ms),
    )?;
    let player = Player::new(
        Playlist::new(tracks.clone()),
        Box::new(device),
        sink.clone(),
        Arc::new(SystemClock),
        settings.playback.loop_mode.into(),
    );
    if let Err(e) = player.set_volume(settings.audio.volume) {
        warn!(error = %e, "could not apply initial volume");
    }

    if tracks.is_empty() {
        warn!(dir = %dir.display(), "no playable files found");
        sink.on_error(&PlayerError::EmptyPlaylist);
    }

    let mut app = App::new(tracks);
    app.set_current_dir(dir.display().to_string());
    let status = player.status();
    app.loop_mode = status.loop_mode;
    app.volume = status.volume;

    let mut monitor = ProgressMonitor::spawn(
        player.clone(),
        Duration::from_millis(settings.playback.poll_interval_ms),
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &settings, &mut app, &player, &ui_rx, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The monitor holds a player handle; the device (and its fade-out) goes
    // with the last one.
    monitor.cancel();
    let last = player.status();
    info!(
        state = ?last.state,
        index = ?last.index,
        elapsed = ?last.elapsed,
        duration = ?last.duration,
        "shutting down"
    );
    drop(player);

    run_result
}
