use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::LibrarySettings;

use super::model::{Catalog, Playlist, Track};

/// Configured extensions, trimmed, dot-stripped and lowercased.
pub(super) fn audio_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// `exts` must come from [`audio_extensions`].
pub(super) fn is_audio_file(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Immediate children of `dir` (depth 1 only), filtered by hidden-ness.
fn children(dir: &Path, settings: &LibrarySettings) -> impl Iterator<Item = DirEntry> {
    let include_hidden = settings.include_hidden;
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(settings.follow_links)
        .sort_by(|a, b| {
            case_insensitive(
                &a.file_name().to_string_lossy(),
                &b.file_name().to_string_lossy(),
            )
        })
        .into_iter()
        .filter_entry(move |e| include_hidden || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
}

fn sub_dirs(dir: &Path, settings: &LibrarySettings) -> Vec<(String, PathBuf)> {
    children(dir, settings)
        .filter(|e| e.file_type().is_dir())
        .map(|e| {
            (
                e.file_name().to_string_lossy().into_owned(),
                e.path().to_path_buf(),
            )
        })
        .collect()
}

/// Audio files directly inside `dir`, sorted case-insensitively by full path.
fn audio_tracks(dir: &Path, settings: &LibrarySettings, exts: &[String]) -> Vec<Track> {
    let mut paths: Vec<PathBuf> = children(dir, settings)
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path(), exts))
        .map(|e| e.into_path())
        .collect();

    paths.sort_by(|a, b| case_insensitive(&a.to_string_lossy(), &b.to_string_lossy()));
    paths.iter().map(|p| Track::from_path(p)).collect()
}

/// Scan `root` exactly two levels deep into a playlist catalog.
///
/// Every immediate subfolder holding audio files becomes a playlist named after
/// the folder. Then every subfolder of those subfolders holding audio files
/// becomes a playlist named `"<parent>/<child>"`. Anything deeper is ignored.
/// A missing or unreadable root yields an empty catalog.
pub fn scan(root: &Path, settings: &LibrarySettings) -> Catalog {
    let mut catalog = Catalog::default();

    if !root.is_dir() {
        warn!(root = %root.display(), "music root is not a readable directory");
        return catalog;
    }

    let exts = audio_extensions(settings);
    let top = sub_dirs(root, settings);

    for (name, path) in &top {
        let tracks = audio_tracks(path, settings, &exts);
        if !tracks.is_empty() {
            catalog.push(Playlist {
                name: name.clone(),
                tracks,
            });
        }
    }

    for (parent, path) in &top {
        for (child, sub_path) in sub_dirs(path, settings) {
            let tracks = audio_tracks(&sub_path, settings, &exts);
            if !tracks.is_empty() {
                catalog.push(Playlist {
                    name: format!("{parent}/{child}"),
                    tracks,
                });
            }
        }
    }

    debug!(root = %root.display(), playlists = catalog.len(), "library scanned");
    catalog
}
