//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::playback::{LoopMode, PlaybackState, RowState};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[enter] play selected".to_string(),
        "[space/p] play/pause".to_string(),
        "[s] stop".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[0-9] seek 0-90%".to_string(),
        "[+/-] volume".to_string(),
        "[r] loop mode".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(elapsed: Duration, total: Duration, ui: &UiSettings) -> Option<String> {
    let known_total = (!total.is_zero()).then_some(total);
    let elapsed = known_total.map_or(elapsed, |t| elapsed.min(t));

    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .filter_map(|f| match f {
            TimeField::Elapsed => Some(format_mmss(elapsed)),
            TimeField::Total => known_total.map(format_mmss),
            TimeField::Remaining => {
                known_total.map(|t| format!("-{}", format_mmss(t.saturating_sub(elapsed))))
            }
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn row_icon(state: RowState) -> &'static str {
    match state {
        RowState::Idle => "  ",
        RowState::Playing => "▶ ",
        RowState::Paused => "⏸ ",
        RowState::Failed => "✗ ",
    }
}

fn status_text(app: &App, ui_settings: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    let state = match app.playback {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    };
    parts.push(state.to_string());

    if let Some(np) = &app.now_playing {
        let elapsed = app.progress.map_or(Duration::ZERO, |(_, e)| e);
        match now_playing_time_text(elapsed, np.duration, ui_settings) {
            Some(time) => parts.push(format!("Song: {} [{}]", np.name, time)),
            None => parts.push(format!("Song: {}", np.name)),
        }
    }

    parts.push(format!("Volume: {:.0}%", app.volume * 100.0));

    let loop_text = match app.loop_mode {
        LoopMode::NoLoop => "Loop: off",
        LoopMode::LoopAll => "Loop: all",
        LoopMode::LoopOne => "Loop: one",
    };
    parts.push(loop_text.to_string());

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    if let Some(err) = &app.last_error {
        parts.push(format!("Error: {}", err));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" monotrack ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding::left(1))
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        // Only build ListItems for the visible window.
        let total = app.tracks.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel = app.selected.min(total.saturating_sub(1));
        let (start, end) = if total <= list_height || list_height == 0 {
            (0, total)
        } else {
            let half = list_height / 2;
            let mut start = sel.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height)
        };

        let visible_items: Vec<ListItem> = app.tracks[start..end]
            .iter()
            .map(|t| {
                let state = app.rows.get(t.index).copied().unwrap_or_default();
                ListItem::new(format!("{}{}", row_icon(state), t.display))
            })
            .collect();

        let title = if total == 0 {
            " tracks (no playable files found) "
        } else {
            " tracks "
        };
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(sel - start));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Progress
    let (ratio, label) = match (app.progress, &app.now_playing) {
        (Some((fraction, elapsed)), Some(np)) => (
            fraction.clamp(0.0, 1.0),
            now_playing_time_text(elapsed, np.duration, ui_settings).unwrap_or_default(),
        ),
        _ => (0.0, String::new()),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::left(1)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}
