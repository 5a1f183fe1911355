use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::{App, NowPlayingDisplay};
use crate::engine::RodioEngine;
use crate::playback::{LibrarySource, PlaybackCoordinator};
use crate::session::SessionStore;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    let log_file = logging::init(&settings);
    if let Some(msg) = settings_problem {
        warn!("{msg}");
    }
    info!(log = ?log_file, "minplay starting");

    // An explicit directory argument overrides the configured music root.
    let root = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.music_root());

    let display = Arc::new(NowPlayingDisplay::default());
    let coordinator = PlaybackCoordinator::new(
        Arc::new(RodioEngine::new()),
        display.clone(),
        SessionStore::new(settings.session_path()),
        LibrarySource {
            root: root.clone(),
            settings: settings.library.clone(),
        },
        settings.watchers.clone(),
    );

    let mut app = App::new(coordinator.catalog().names(), display);
    app.set_current_dir(root.display().to_string());

    coordinator.start();
    if let Some(name) = coordinator.snapshot().playlist {
        app.select_name(&name);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &coordinator);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    coordinator.shutdown();
    info!("minplay stopped");
    run_result
}
