//! Playback session types shared between the command path and the watchers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::library::{Playlist, Track};

/// Transport state of the coordinator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TransportStatus {
    /// No playlist, or an empty one.
    #[default]
    Idle,
    /// A track is selected but not (yet) playing.
    Loaded,
    Playing,
    Paused,
}

/// The active playlist and cursor, owned by the coordinator.
///
/// Invariant: when `playlist` is set and non-empty, `index < playlist.len()`;
/// otherwise `status` is `Idle`.
#[derive(Debug, Default)]
pub struct PlaybackSession {
    pub(super) playlist: Option<Arc<Playlist>>,
    pub(super) index: usize,
    pub(super) status: TransportStatus,
    /// Index of the track the engine currently holds, if any.
    pub(super) loaded: Option<usize>,
    pub(super) title: Option<String>,
    /// Bumped on every successful load; ties an end-of-track report to the
    /// track it was observed for.
    pub(super) generation: u64,
}

impl PlaybackSession {
    /// Make `playlist` active with the cursor at `index` (0 if out of range).
    pub(super) fn activate(&mut self, playlist: Arc<Playlist>, index: usize) {
        self.index = if index < playlist.len() { index } else { 0 };
        self.status = if playlist.is_empty() {
            TransportStatus::Idle
        } else {
            TransportStatus::Loaded
        };
        self.playlist = Some(playlist);
        self.loaded = None;
        self.title = None;
    }

    pub(super) fn clear(&mut self) {
        *self = PlaybackSession {
            generation: self.generation,
            ..PlaybackSession::default()
        };
    }

    /// Record a successful load of the track at `index`.
    pub(super) fn mark_loaded(&mut self, index: usize, title: String) {
        self.loaded = Some(index);
        self.title = Some(title);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Load generation of the current track, or `None` without an active playlist.
    pub(super) fn active_generation(&self) -> Option<u64> {
        self.is_active().then_some(self.generation)
    }

    pub(super) fn len(&self) -> usize {
        self.playlist.as_ref().map_or(0, |p| p.len())
    }

    /// True when a non-empty playlist is selected.
    pub(super) fn is_active(&self) -> bool {
        self.len() > 0
    }

    pub(super) fn track(&self, index: usize) -> Option<Track> {
        self.playlist.as_ref()?.get(index).cloned()
    }

    pub(super) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            playlist: self.playlist.as_ref().map(|p| p.name.clone()),
            index: self.index,
            len: self.len(),
            status: self.status,
            title: self.title.clone(),
        }
    }
}

/// Read-only view of the playback session for rendering and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub playlist: Option<String>,
    pub index: usize,
    pub len: usize,
    pub status: TransportStatus,
    pub title: Option<String>,
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
