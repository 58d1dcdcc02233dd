use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::browse::MediaBrowser;
use crate::config::Settings;
use crate::focus::FocusManager;
use crate::library::{Catalog, DirectoryLibrary};
use crate::player::RodioPlayer;
use crate::service::{SessionRemote, SessionService};
use crate::{logging, mpris};

mod args;
mod event_loop;
mod settings;

use args::Args;

pub fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse(env::args().skip(1));
    let (settings, problem) = settings::load_settings();
    logging::init(&settings.logging, args.headless)?;
    if let Some(problem) = problem {
        warn!("{problem}");
    }

    let dir = args
        .dir
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"));
    info!(dir = %dir.display(), headless = args.headless, "starting roadie");

    let catalog = Arc::new(
        Catalog::new(DirectoryLibrary::new(&dir, settings.library.clone()))
            .with_retry_after(Duration::from_secs(settings.library.empty_retry_secs)),
    );
    let browser = MediaBrowser::new(catalog.clone());
    if browser.catalog().is_empty() {
        warn!(dir = %dir.display(), "no playable tracks found");
    }
    let focus = FocusManager::new();
    let service = SessionService::spawn(
        catalog,
        RodioPlayer::open_default,
        &focus,
        &settings.session,
    );
    let remote = service.remote();

    let (quit_tx, quit_rx) = mpsc::channel::<()>();
    // The bridge owns the only sender, so a dead bridge disconnects `quit_rx`.
    if settings.mpris.enabled {
        if let Err(e) = mpris::spawn_mpris(remote.clone(), browser.clone(), quit_tx) {
            warn!(error = %e, "MPRIS bridge not started");
        }
    } else {
        drop(quit_tx);
    }

    let result = if args.headless {
        run_headless(&browser, &quit_rx);
        Ok(())
    } else {
        run_tui(&settings, &dir, &browser, &remote, &quit_rx)
    };

    service.shutdown();
    if let Some(client) = focus.holder() {
        warn!(client, "audio focus still held after shutdown");
    }
    info!("bye");
    result
}

fn run_headless(browser: &MediaBrowser, quit_rx: &Receiver<()>) {
    let tracks = browser.load_children(browser.get_root()).len();
    info!(tracks, "running headless; waiting for MPRIS Quit");
    if !wait_for_quit(quit_rx) {
        warn!("no MPRIS bridge is running, so nothing can control this session; exiting");
    }
}

/// Blocks until MPRIS asks to quit. Returns `false` once no bridge can send it.
fn wait_for_quit(quit_rx: &Receiver<()>) -> bool {
    quit_rx.recv().is_ok()
}

fn run_tui(
    settings: &Settings,
    dir: &Path,
    browser: &MediaBrowser,
    remote: &SessionRemote,
    quit_rx: &Receiver<()>,
) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(browser.load_children(browser.get_root()));
    app.set_current_dir(dir.display().to_string());
    let events = remote.subscribe()?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&settings.ui);
        event_loop::run(
            &mut terminal,
            settings,
            &mut app,
            remote,
            &events,
            quit_rx,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
