use serde::{Deserialize, Serialize};

pub const VOLUME_MAX: i32 = 100;
pub const OPACITY_MIN: i32 = 30;
pub const OPACITY_MAX: i32 = 100;

/// Persisted per-user session record.
///
/// Missing keys fall back to the defaults below; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub volume: i32,
    pub shuffle: bool,
    pub pinned: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub bg_color: String,
    pub btn_color: String,
    pub font_color: String,
    /// Active playlist name; empty when none was ever selected.
    pub playlist: String,
    pub song_index: usize,
    pub show_titlebar: bool,
    pub opacity: i32,
    pub resizable: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            volume: 80,
            shuffle: true,
            pinned: true,
            x: 100,
            y: 100,
            width: 600,
            height: 40,
            bg_color: "#000000".to_string(),
            btn_color: "#333333".to_string(),
            font_color: "#FFFFFF".to_string(),
            playlist: String::new(),
            song_index: 0,
            show_titlebar: true,
            opacity: 100,
            resizable: true,
        }
    }
}

impl SessionState {
    /// Clamp ranged fields into their valid bounds.
    pub fn normalized(mut self) -> Self {
        self.volume = clamp_volume(self.volume);
        self.opacity = clamp_opacity(self.opacity);
        self
    }

    /// Restore appearance and behavior options, keeping geometry and playback position.
    pub fn reset_options(&mut self) {
        let d = SessionState::default();
        self.shuffle = d.shuffle;
        self.pinned = d.pinned;
        self.bg_color = d.bg_color;
        self.btn_color = d.btn_color;
        self.font_color = d.font_color;
        self.show_titlebar = d.show_titlebar;
        self.opacity = d.opacity;
        self.resizable = d.resizable;
    }
}

pub fn clamp_volume(level: i32) -> i32 {
    level.clamp(0, VOLUME_MAX)
}

pub fn clamp_opacity(level: i32) -> i32 {
    level.clamp(OPACITY_MIN, OPACITY_MAX)
}
