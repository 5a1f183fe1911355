//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! one-line transport bar, the playlist list, the options popup and the
//! controls footer.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, OPTION_ITEMS};
use crate::playback::{SessionSnapshot, TransportStatus};
use crate::session::SessionState;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "open playlist");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    map.insert("+/-", "volume");
    map.insert("s", "shuffle");
    map.insert("r", "rescan");
    map.insert("o", "options");
    map.insert("q", "quit");
    map
});

/// Render the controls help text.
fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = ["j/k", "enter", "space/p", "h/l", "+/-", "s", "r", "o", "q"];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Parse a `#RRGGBB` session color, falling back to `fallback` when malformed.
pub(crate) fn session_color(hex: &str, fallback: Color) -> Color {
    let Some(digits) = hex.strip_prefix('#') else {
        return fallback;
    };
    if digits.len() != 6 {
        return fallback;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => fallback,
    }
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

/// Build the transport bar: prev, play/pause, next, title, time, volume and shuffle.
fn transport_line<'a>(
    app: &App,
    session: &SessionState,
    button: Style,
    text: Style,
) -> Line<'a> {
    let now = app.display.current();
    let play_glyph = if now.status == TransportStatus::Playing {
        " ⏸ "
    } else {
        " ▶ "
    };
    let shuffle = if session.shuffle { "on" } else { "off" };

    Line::from(vec![
        Span::styled(" ⏮ ", button),
        Span::raw(" "),
        Span::styled(play_glyph, button),
        Span::raw(" "),
        Span::styled(" ⏭ ", button),
        Span::styled(format!("  {}", now.title), text.add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", now.elapsed), text),
        Span::styled(format!("  vol {}%", session.volume), text),
        Span::styled(format!("  shuffle {}", shuffle), text),
    ])
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, snapshot: &SessionSnapshot, session: &SessionState) {
    let bg = session_color(&session.bg_color, Color::Reset);
    let fg = session_color(&session.font_color, Color::Reset);
    let btn = session_color(&session.btn_color, Color::DarkGray);
    let base = Style::default().bg(bg).fg(fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let mut bar_block = Block::default().style(base);
    if session.show_titlebar {
        bar_block = bar_block.borders(Borders::ALL).title(" minplay ");
    } else {
        bar_block = bar_block.padding(Padding::vertical(1));
    }
    let bar = Paragraph::new(transport_line(app, session, Style::default().bg(btn).fg(fg), base))
        .block(bar_block);
    frame.render_widget(bar, chunks[0]);

    // Playlist list
    {
        let active = snapshot.playlist.as_deref();
        let items: Vec<ListItem> = app
            .playlists
            .iter()
            .map(|name| {
                if Some(name.as_str()) == active {
                    ListItem::new(format!("♪ {} ({} songs)", name, snapshot.len))
                } else {
                    ListItem::new(format!("  {}", name))
                }
            })
            .collect();

        let title = match &app.current_dir {
            Some(dir) => format!(" playlists · {} ", dir),
            None => " playlists ".to_string(),
        };
        let empty = items.is_empty();
        let list = List::new(items)
            .style(base)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if !empty {
            state.select(Some(app.selected));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    // Options popup over the playlist list
    if app.options_open {
        let popup_area = centered_rect_sized(44, OPTION_ITEMS.len() as u16 + 2, chunks[1]);
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = OPTION_ITEMS
            .iter()
            .map(|item| ListItem::new(item.label(session)))
            .collect();
        let list = List::new(items)
            .style(base)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" options (o closes) "),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(app.option_cursor));
        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    let footer = Paragraph::new(controls_text())
        .style(base)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[2]);
}
