use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/minplay/config.toml` or `~/.config/minplay/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MINPLAY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
///
/// These are static settings. Per-session state (volume, shuffle, active
/// playlist, colors, ...) lives in the session record, see `crate::session`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub watchers: WatcherSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Music root holding one folder per playlist. Defaults to `~/Music`.
    pub root: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: None,
            extensions: vec![
                "mp3".into(),
                "wav".into(),
                "flac".into(),
                "aac".into(),
                "m4a".into(),
                "ogg".into(),
            ],
            follow_links: true,
            include_hidden: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// How often the end-of-track watcher polls the engine (milliseconds).
    pub end_of_track_poll_ms: u64,
    /// How often the elapsed-time display is refreshed (milliseconds).
    pub elapsed_poll_ms: u64,
    /// Upper bound on how long shutdown waits for each background thread.
    pub shutdown_timeout_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            end_of_track_poll_ms: 500,
            elapsed_poll_ms: 1000,
            shutdown_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Where the session record is stored. Defaults next to `config.toml`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// Log file. The terminal is owned by the UI, so logs never go to stdout.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}
