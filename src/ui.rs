//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};

const CONTROLS: [(&str, &str); 10] = [
    ("j/k", "up/down"),
    ("h/l", "prev/next song"),
    ("H/L", "scrub"),
    ("enter", "play selected song"),
    ("space/p", "play/pause"),
    ("s", "stop"),
    ("gg/G", "top/bottom"),
    ("zz", "jump to playing"),
    ("K", "metadata"),
    ("q", "quit"),
];

fn left_padding() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    CONTROLS
        .iter()
        .map(|(key, what)| {
            if *key == "H/L" {
                format!("[H/L] scrub -/+{scrub_seconds}s")
            } else {
                format!("[{key}] {what}")
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format milliseconds as `MM:SS`.
fn format_mmss(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" {}", app.status.label()));

    if let Some(track) = &app.now_playing {
        match &track.artist {
            Some(artist) => parts.push(format!("Song: {} - {}", track.title, artist)),
            None => parts.push(format!("Song: {}", track.title)),
        }
    }

    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {dir}"));
    }

    if let Some(err) = &app.last_error {
        parts.push(format!("Error: {err}"));
    }

    parts.join(" • ")
}

fn metadata_text(app: &App) -> String {
    let Some(track) = &app.now_playing else {
        return "Nothing playing".to_string();
    };
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nArtwork: {}",
        track.title,
        track.artist.as_deref().unwrap_or("-"),
        track.album.as_deref().unwrap_or("-"),
        format_mmss(track.duration_ms),
        track
            .artwork
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string()),
    )
}

/// Render the entire UI into the provided `frame`.
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
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" roadie ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app))
        .block(Block::bordered().padding(left_padding()).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Track list, windowed around the selection so only visible rows are built.
    {
        let total = app.items.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let (start, end) = if total <= list_height || list_height == 0 {
            (0, total)
        } else {
            let half = list_height / 2;
            let mut start = app.selected.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height)
        };

        let playing = app.playing_index();
        let visible: Vec<ListItem> = app.items[start..end]
            .iter()
            .enumerate()
            .map(|(offset, item)| {
                let text = match &item.subtitle {
                    Some(artist) => format!("{} — {}", item.title, artist),
                    None => item.title.clone(),
                };
                if playing == Some(start + offset) {
                    ListItem::new(text).bold()
                } else {
                    ListItem::new(text)
                }
            })
            .collect();

        let list = List::new(visible)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(app.selected - start));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 9, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let meta = Paragraph::new(metadata_text(app))
            .block(
                Block::default()
                    .padding(left_padding())
                    .borders(Borders::ALL)
                    .title(" now playing (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta, popup_area);
    }

    let seek = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" position "))
        .ratio(app.progress())
        .label(format!(
            "{} / {}",
            format_mmss(app.position_ms),
            format_mmss(app.duration_ms)
        ));
    frame.render_widget(seek, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_padding()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
