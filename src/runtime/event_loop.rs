use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::{App, PositionPoller};
use crate::config;
use crate::service::SessionRemote;
use crate::session::{SessionCmd, SessionEvent};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    pending_zz: bool,
    /// Samples the session position for the seek bar while playing.
    pub poller: PositionPoller,
}

impl EventLoopState {
    pub fn new(ui: &config::UiSettings) -> Self {
        Self {
            pending_gg: false,
            pending_zz: false,
            poller: PositionPoller::new(Duration::from_millis(ui.position_poll_ms)),
        }
    }
}

/// Main terminal event loop: folds session broadcasts into `app`, draws, and
/// turns keys into session commands. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    remote: &SessionRemote,
    events: &Receiver<SessionEvent>,
    quit_rx: &Receiver<()>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(event) = events.try_recv() {
            app.apply_event(&event);
            if let SessionEvent::State(update) = &event {
                state.poller.on_status(update.status, Instant::now());
                debug!(status = ?update.status, polling = state.poller.is_running(), "session state");
            }
        }

        if state.poller.due(Instant::now()) {
            if let Some(position_ms) = remote.snapshot().position_ms {
                app.set_position(position_ms);
            }
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        // MPRIS Quit.
        if quit_rx.try_recv().is_ok() {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, remote, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn send(app: &mut App, remote: &SessionRemote, cmd: SessionCmd) {
    debug!(?cmd, "key command");
    if let Err(e) = remote.send(cmd) {
        warn!(error = %e, "session command dropped");
        app.last_error = Some(e.to_string());
    }
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    remote: &SessionRemote,
    state: &mut EventLoopState,
) -> bool {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    if key.code != KeyCode::Char('z') {
        state.pending_zz = false;
    }

    let scrub = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
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
        KeyCode::Char('z') => {
            if state.pending_zz {
                state.pending_zz = false;
                if let Some(idx) = app.playing_index() {
                    app.follow_playback_on();
                    app.set_selected(idx);
                }
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            if let Some(cmd) = app.enter_command() {
                app.follow_playback_on();
                send(app, remote, cmd);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            if let Some(cmd) = app.play_pause_command() {
                app.follow_playback_on();
                send(app, remote, cmd);
            }
        }
        KeyCode::Char('l') => {
            app.follow_playback_on();
            send(app, remote, SessionCmd::SkipToNext);
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            send(app, remote, SessionCmd::SkipToPrevious);
        }
        KeyCode::Char('L') => {
            if let Some(cmd) = app.scrub_command(scrub) {
                send(app, remote, cmd);
            }
        }
        KeyCode::Char('H') => {
            if let Some(cmd) = app.scrub_command(-scrub) {
                send(app, remote, cmd);
            }
        }
        KeyCode::Char('s') => send(app, remote, SessionCmd::Stop),
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }

    false
}
