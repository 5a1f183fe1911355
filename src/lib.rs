//! minplay: a folder-based playlist player.
//!
//! Every directory under the music root (and each of its sub-directories) is a
//! playlist. The [`playback::PlaybackCoordinator`] owns the active playlist,
//! drives a [`engine::PlaybackEngine`] and persists the session between runs.

pub mod app;
pub mod config;
pub mod engine;
pub mod library;
pub mod playback;
pub mod runtime;
pub mod session;
pub mod ui;
