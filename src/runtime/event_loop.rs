use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::App;
use crate::config;
use crate::playback::{PlaybackState, Player, UiEvent};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: folds player notifications into `app`, draws,
/// and turns key presses into player calls. Returns `Ok(())` on quit.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    ui_rx: &mpsc::Receiver<UiEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for ev in ui_rx.try_iter() {
            app.apply(ev);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Failures were already pushed to the UI through the sink.
fn log_failure(action: &str, result: crate::playback::Result<()>) {
    if let Err(e) = result {
        debug!(action, error = %e, "key action failed");
    }
}

/// Handle one key press. Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    state: &mut EventLoopState,
) -> bool {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            if app.has_tracks() {
                app.follow_playback_on();
                let status = player.status();
                let playing_selected = status.index == Some(app.selected)
                    && status.state == PlaybackState::Playing;
                if !playing_selected {
                    log_failure("play selected", player.activate(app.selected));
                }
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            let stopped = player.status().state == PlaybackState::Stopped;
            if stopped && app.has_tracks() {
                log_failure("play selected", player.activate(app.selected));
            } else {
                log_failure("toggle", player.toggle());
            }
        }
        KeyCode::Char('s') => log_failure("stop", player.stop()),
        KeyCode::Char('l') => {
            app.follow_playback_on();
            log_failure("next", player.next());
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            log_failure("previous", player.previous());
        }
        KeyCode::Char('L') => {
            let secs = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            log_failure("scrub", player.scrub(secs));
        }
        KeyCode::Char('H') => {
            let secs = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            log_failure("scrub", player.scrub(-secs));
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = f64::from(c as u8 - b'0');
            log_failure("seek", player.seek(tenth / 10.0));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            log_failure("volume", player.adjust_volume(settings.audio.volume_step));
            app.volume = player.status().volume;
        }
        KeyCode::Char('-') => {
            log_failure("volume", player.adjust_volume(-settings.audio.volume_step));
            app.volume = player.status().volume;
        }
        KeyCode::Char('r') => {
            app.loop_mode = player.cycle_loop_mode();
        }
        _ => {}
    }

    false
}
