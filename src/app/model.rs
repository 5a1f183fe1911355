//! Application model types: `App`, the options panel and the now-playing display.
//!
//! The `App` struct holds what the terminal shell renders: the playlist names,
//! the cursor, the options panel state and a handle to the now-playing line the
//! coordinator keeps current.

use std::sync::{Arc, Mutex};

use crate::playback::{DisplaySink, TransportStatus};
use crate::session::{OPACITY_MAX, OPACITY_MIN, SessionState, clamp_opacity};

const OPACITY_STEP: i32 = 5;

/// What the now-playing line shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub elapsed: String,
    pub status: TransportStatus,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self {
            title: "No song playing".to_string(),
            elapsed: "00:00".to_string(),
            status: TransportStatus::Idle,
        }
    }
}

/// [`DisplaySink`] that stores the latest display state for the next redraw.
#[derive(Debug, Default)]
pub struct NowPlayingDisplay {
    state: Mutex<NowPlaying>,
}

impl NowPlayingDisplay {
    pub fn current(&self) -> NowPlaying {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl DisplaySink for NowPlayingDisplay {
    fn on_display_update(&self, title: &str, elapsed: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.title = title.to_string();
            s.elapsed = elapsed.to_string();
        }
    }

    fn on_transport_state_changed(&self, status: TransportStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
            if status == TransportStatus::Idle {
                *s = NowPlaying::default();
            }
        }
    }
}

/// Entries of the options panel, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptionItem {
    Shuffle,
    Pinned,
    Titlebar,
    Resizable,
    Opacity,
    Reset,
}

pub const OPTION_ITEMS: [OptionItem; 6] = [
    OptionItem::Shuffle,
    OptionItem::Pinned,
    OptionItem::Titlebar,
    OptionItem::Resizable,
    OptionItem::Opacity,
    OptionItem::Reset,
];

impl OptionItem {
    pub fn label(self, state: &SessionState) -> String {
        let flag = |on: bool| if on { "on" } else { "off" };
        match self {
            OptionItem::Shuffle => format!("Shuffle: {}", flag(state.shuffle)),
            OptionItem::Pinned => format!("Pinned on top: {}", flag(state.pinned)),
            OptionItem::Titlebar => format!("Show titlebar: {}", flag(state.show_titlebar)),
            OptionItem::Resizable => format!("Resizable: {}", flag(state.resizable)),
            OptionItem::Opacity => format!(
                "Opacity: {}% ({}-{})",
                state.opacity, OPACITY_MIN, OPACITY_MAX
            ),
            OptionItem::Reset => "Reset to defaults".to_string(),
        }
    }

    /// Apply the item to `state`. `delta` is the arrow direction for
    /// stepped values; toggles ignore it.
    pub fn apply(self, state: &mut SessionState, delta: i32) {
        match self {
            OptionItem::Shuffle => state.shuffle = !state.shuffle,
            OptionItem::Pinned => state.pinned = !state.pinned,
            OptionItem::Titlebar => state.show_titlebar = !state.show_titlebar,
            OptionItem::Resizable => state.resizable = !state.resizable,
            OptionItem::Opacity => {
                let step = if delta < 0 { -OPACITY_STEP } else { OPACITY_STEP };
                state.opacity = clamp_opacity(state.opacity + step);
            }
            OptionItem::Reset => state.reset_options(),
        }
    }
}

/// The main application model.
pub struct App {
    pub playlists: Vec<String>,
    pub selected: usize,
    pub options_open: bool,
    pub option_cursor: usize,
    pub display: Arc<NowPlayingDisplay>,
    pub current_dir: Option<String>,
}

impl App {
    /// Create a new `App` listing `playlists`.
    pub fn new(playlists: Vec<String>, display: Arc<NowPlayingDisplay>) -> Self {
        Self {
            playlists,
            selected: 0,
            options_open: false,
            option_cursor: 0,
            display,
            current_dir: None,
        }
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn has_playlists(&self) -> bool {
        !self.playlists.is_empty()
    }

    /// Replace the playlist list, keeping the cursor on the same name if it survived.
    pub fn set_playlists(&mut self, playlists: Vec<String>) {
        let keep = self.selected_playlist().map(str::to_string);
        self.playlists = playlists;
        self.selected = 0;
        if let Some(name) = keep {
            self.select_name(&name);
        }
    }

    pub fn select_name(&mut self, name: &str) {
        if let Some(i) = self.playlists.iter().position(|p| p == name) {
            self.selected = i;
        }
    }

    pub fn selected_playlist(&self) -> Option<&str> {
        self.playlists.get(self.selected).map(String::as_str)
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if self.options_open {
            self.option_cursor = (self.option_cursor + 1) % OPTION_ITEMS.len();
        } else if self.has_playlists() {
            self.selected = (self.selected + 1) % self.playlists.len();
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.options_open {
            self.option_cursor = (self.option_cursor + OPTION_ITEMS.len() - 1) % OPTION_ITEMS.len();
        } else if self.has_playlists() {
            self.selected = (self.selected + self.playlists.len() - 1) % self.playlists.len();
        }
    }

    pub fn toggle_options(&mut self) {
        self.options_open = !self.options_open;
        self.option_cursor = 0;
    }

    pub fn current_option(&self) -> OptionItem {
        OPTION_ITEMS[self.option_cursor % OPTION_ITEMS.len()]
    }
}
