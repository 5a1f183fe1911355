use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::App;
use crate::config;
use crate::playback::PlaybackCoordinator;
use crate::ui;

/// Main terminal event loop: draws the UI and forwards input to the
/// coordinator. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    coordinator: &PlaybackCoordinator,
) -> Result<(), Box<dyn std::error::Error>> {
    // Redraw at least as often as the elapsed-time watcher reports.
    let redraw = Duration::from_millis(settings.watchers.elapsed_poll_ms.clamp(50, 250));

    loop {
        let snapshot = coordinator.snapshot();
        let session = coordinator.session_state();
        terminal.draw(|f| ui::draw(f, app, &snapshot, &session))?;

        if !event::poll(redraw)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, coordinator) {
                    break;
                }
            }
            Event::Resize(width, height) => {
                coordinator.update_session(|s| {
                    s.width = i32::from(width);
                    s.height = i32::from(height);
                });
            }
            _ => {}
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the app should quit.
fn handle_key_event(key: KeyEvent, app: &mut App, coordinator: &PlaybackCoordinator) -> bool {
    if app.options_open {
        let item = app.current_option();
        match key.code {
            KeyCode::Char('o') | KeyCode::Esc => app.toggle_options(),
            KeyCode::Char('j') | KeyCode::Down => app.next(),
            KeyCode::Char('k') | KeyCode::Up => app.prev(),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => {
                coordinator.update_session(|s| item.apply(s, 1));
            }
            KeyCode::Char('h') | KeyCode::Left => {
                coordinator.update_session(|s| item.apply(s, -1));
            }
            KeyCode::Char('q') => return true,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if let Some(name) = app.selected_playlist() {
                coordinator.select_playlist(name);
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => coordinator.toggle_play_pause(),
        KeyCode::Char('l') | KeyCode::Right => {
            coordinator.next();
        }
        KeyCode::Char('h') | KeyCode::Left => {
            coordinator.prev();
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let level = coordinator.volume_up();
            debug!(level, "volume up");
        }
        KeyCode::Char('-') => {
            let level = coordinator.volume_down();
            debug!(level, "volume down");
        }
        KeyCode::Char('s') => {
            coordinator.toggle_shuffle();
        }
        KeyCode::Char('r') => {
            coordinator.refresh_catalog();
            app.set_playlists(coordinator.catalog().names());
        }
        KeyCode::Char('o') => app.toggle_options(),
        _ => {}
    }
    false
}
