use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    /// File name without directory; engine metadata may override it for display.
    pub title: String,
}

impl Track {
    pub fn from_path(path: &Path) -> Self {
        let title = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Self {
            path: path.to_path_buf(),
            title,
        }
    }
}

/// A named, ordered, non-empty list of tracks from one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}

/// Playlists in scan order. Rebuilt wholesale on refresh, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    playlists: Vec<Arc<Playlist>>,
}

impl Catalog {
    pub(super) fn push(&mut self, playlist: Playlist) {
        self.playlists.push(Arc::new(playlist));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Playlist>> {
        self.playlists.iter().find(|p| p.name == name).cloned()
    }

    /// The playlist whose name sorts first (byte order), used when no saved
    /// or current playlist applies. Nested names compete with top-level ones.
    pub fn first_by_name(&self) -> Option<Arc<Playlist>> {
        self.playlists.iter().min_by(|a, b| a.name.cmp(&b.name)).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.playlists.iter().map(|p| p.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Playlist>> {
        self.playlists.iter()
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }
}
