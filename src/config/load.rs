use std::{env, path::PathBuf};

use super::schema::Settings;

const APP_DIR: &str = "minplay";

impl Settings {
    /// Merge struct defaults, the optional TOML file and `MINPLAY__*` variables,
    /// in rising precedence. A missing file is not an error.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix("MINPLAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.watchers.end_of_track_poll_ms == 0 {
            return Err("watchers.end_of_track_poll_ms must be >= 1".to_string());
        }
        if self.watchers.elapsed_poll_ms == 0 {
            return Err("watchers.elapsed_poll_ms must be >= 1".to_string());
        }
        Ok(())
    }

    /// Music root: configured value, else `~/Music`, else `./Music`.
    pub fn music_root(&self) -> PathBuf {
        if let Some(root) = &self.library.root {
            return root.clone();
        }
        env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Music"))
            .unwrap_or_else(|| PathBuf::from("Music"))
    }

    /// Session record path: configured value, else `session.toml` in the app config dir.
    pub fn session_path(&self) -> PathBuf {
        self.session
            .path
            .clone()
            .or_else(|| config_dir().map(|d| d.join("session.toml")))
            .unwrap_or_else(|| PathBuf::from("session.toml"))
    }

    /// Log file path: configured value, else `minplay.log` in the app config dir.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.logging
            .file
            .clone()
            .or_else(|| config_dir().map(|d| d.join("minplay.log")))
    }
}

/// Resolve the config path from `MINPLAY_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MINPLAY_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/minplay/config.toml`
/// or `~/.config/minplay/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

fn config_dir() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join(APP_DIR))
}
