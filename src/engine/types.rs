//! The media-engine contract used by the playback coordinator.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Engine-reported playback state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing has been loaded (or the last load failed).
    NothingLoaded,
    Playing,
    Paused,
    /// Explicitly stopped; never treated as a natural end.
    Stopped,
    /// The loaded media played through to its end.
    Ended,
}

impl EngineState {
    /// States that mean "the current track is over" to the end-of-track watcher.
    pub fn is_end_of_track(self) -> bool {
        matches!(self, EngineState::Ended | EngineState::NothingLoaded)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("no media loaded")]
    NothingLoaded,
    #[error("audio thread is gone")]
    Disconnected,
}

/// Handle to media accepted by [`PlaybackEngine::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMedia {
    pub path: PathBuf,
    /// Title from the file's tags, when it has one.
    pub title: Option<String>,
}

/// Black-box media engine.
///
/// Control calls are expected to return quickly; they never wait for audio to
/// drain. Implementations must be shareable across the UI and watcher threads.
pub trait PlaybackEngine: Send + Sync {
    /// Replace the current media with `path`, paused at the start.
    fn load(&self, path: &Path) -> Result<LoadedMedia, EngineError>;
    fn play(&self) -> Result<(), EngineError>;
    fn pause(&self) -> Result<(), EngineError>;
    fn stop(&self) -> Result<(), EngineError>;
    fn is_playing(&self) -> Result<bool, EngineError>;
    fn state(&self) -> Result<EngineState, EngineError>;
    /// Elapsed playback time of the current media, in milliseconds.
    fn elapsed_ms(&self) -> Result<u64, EngineError>;
    /// Volume on a 0..=100 scale.
    fn set_volume(&self, level: u8) -> Result<(), EngineError>;
    fn metadata_title(&self) -> Option<String>;
}
