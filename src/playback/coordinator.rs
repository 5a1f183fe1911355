use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{LibrarySettings, WatcherSettings};
use crate::engine::{EngineError, PlaybackEngine};
use crate::library::{self, Catalog, Track};
use crate::session::{SessionState, SessionStore, clamp_volume};

use super::display::{DisplaySink, format_time};
use super::state::{PlaybackSession, SessionSnapshot, TransportStatus, lock};
use super::stop::StopSignal;
use super::watchers::{run_elapsed_watcher, run_end_of_track_watcher};

const VOLUME_STEP: i32 = 10;

/// Work queued onto the coordinator by its own background workers.
#[derive(Debug)]
enum CoordinatorCmd {
    /// The track loaded as `generation` ended; move on as if `next` was pressed.
    Advance { generation: u64 },
}

/// Where the catalog comes from; rescanned on refresh.
#[derive(Debug, Clone)]
pub struct LibrarySource {
    pub root: PathBuf,
    pub settings: LibrarySettings,
}

impl LibrarySource {
    pub fn scan(&self) -> Catalog {
        library::scan(&self.root, &self.settings)
    }
}

/// State shared by the command path and the worker threads.
struct Shared {
    engine: Arc<dyn PlaybackEngine>,
    display: Arc<dyn DisplaySink>,
    source: LibrarySource,
    catalog: Mutex<Arc<Catalog>>,
    /// Lock order: `playback` before `persisted`.
    playback: Mutex<PlaybackSession>,
    persisted: Mutex<SessionState>,
    store: SessionStore,
}

/// Owns the playback session and drives the engine.
///
/// Transport calls run on the caller's thread under the session lock. The
/// end-of-track watcher never calls them directly; it enqueues an advance that
/// a dispatcher thread executes.
pub struct PlaybackCoordinator {
    shared: Arc<Shared>,
    watchers: WatcherSettings,
    stop: StopSignal,
    cmd_tx: Mutex<Option<Sender<CoordinatorCmd>>>,
    workers: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
    terminated: AtomicBool,
}

impl PlaybackCoordinator {
    /// Load the session record and scan the library. Nothing plays until [`start`](Self::start).
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        display: Arc<dyn DisplaySink>,
        store: SessionStore,
        source: LibrarySource,
        watchers: WatcherSettings,
    ) -> Self {
        let persisted = store.load();
        let catalog = source.scan();
        info!(
            root = %source.root.display(),
            playlists = catalog.len(),
            "playlist catalog ready"
        );

        Self {
            shared: Arc::new(Shared {
                engine,
                display,
                source,
                catalog: Mutex::new(Arc::new(catalog)),
                playback: Mutex::new(PlaybackSession::default()),
                persisted: Mutex::new(persisted),
                store,
            }),
            watchers,
            stop: StopSignal::new(),
            cmd_tx: Mutex::new(None),
            workers: Mutex::new(Vec::new()),
            terminated: AtomicBool::new(false),
        }
    }

    /// Restore the saved playlist and track, start playing it, then start the
    /// background workers. Calling it twice is a no-op.
    pub fn start(&self) {
        if !lock(&self.workers).is_empty() || self.terminated.load(Ordering::SeqCst) {
            return;
        }

        self.shared.restore();

        let (tx, rx) = mpsc::channel::<CoordinatorCmd>();
        let mut workers = lock(&self.workers);
        workers.push(("dispatcher", self.spawn_dispatcher(rx)));
        workers.push(("end-of-track watcher", self.spawn_end_of_track_watcher(tx.clone())));
        workers.push(("elapsed-time watcher", self.spawn_elapsed_watcher()));
        *lock(&self.cmd_tx) = Some(tx);
    }

    fn spawn_dispatcher(&self, rx: Receiver<CoordinatorCmd>) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let stop = self.stop.clone();
        thread::spawn(move || {
            for cmd in rx {
                if stop.is_stopped() {
                    break;
                }
                match cmd {
                    CoordinatorCmd::Advance { generation } => shared.advance(generation),
                }
            }
            debug!("dispatcher stopped");
        })
    }

    fn spawn_end_of_track_watcher(&self, tx: Sender<CoordinatorCmd>) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let stop = self.stop.clone();
        let tick = Duration::from_millis(self.watchers.end_of_track_poll_ms);
        thread::spawn(move || {
            run_end_of_track_watcher(
                shared.engine.as_ref(),
                || lock(&shared.playback).active_generation(),
                |generation| {
                    if tx.send(CoordinatorCmd::Advance { generation }).is_err() {
                        debug!("dispatcher gone, dropping advance");
                    }
                },
                &stop,
                tick,
            );
        })
    }

    fn spawn_elapsed_watcher(&self) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let stop = self.stop.clone();
        let tick = Duration::from_millis(self.watchers.elapsed_poll_ms);
        thread::spawn(move || {
            run_elapsed_watcher(
                shared.engine.as_ref(),
                || shared.now_playing_title(),
                shared.display.as_ref(),
                &stop,
                tick,
            );
        })
    }

    /// Make `name` the active playlist and play its first track. Unknown names are ignored.
    pub fn select_playlist(&self, name: &str) {
        self.shared.select_playlist(name);
    }

    /// Play the track at `index` of the active playlist.
    ///
    /// Out-of-range indices are ignored. Returns the display title on success.
    pub fn play_at(&self, index: usize) -> Option<String> {
        let mut pb = lock(&self.shared.playback);
        self.shared.play_at_locked(&mut pb, index)
    }

    pub fn toggle_play_pause(&self) {
        let mut pb = lock(&self.shared.playback);
        if pb.status == TransportStatus::Playing {
            self.shared.pause_locked(&mut pb);
        } else {
            self.shared.play_locked(&mut pb);
        }
    }

    pub fn play(&self) {
        let mut pb = lock(&self.shared.playback);
        self.shared.play_locked(&mut pb);
    }

    pub fn pause(&self) {
        let mut pb = lock(&self.shared.playback);
        if pb.status == TransportStatus::Playing {
            self.shared.pause_locked(&mut pb);
        }
    }

    /// Skip forward (random pick when shuffling). Returns the new index.
    pub fn next(&self) -> Option<usize> {
        self.shared.step(true)
    }

    /// Skip backward (random pick when shuffling). Returns the new index.
    pub fn prev(&self) -> Option<usize> {
        self.shared.step(false)
    }

    /// Set the volume, clamped to 0..=100. Returns the stored level.
    pub fn set_volume(&self, level: i32) -> i32 {
        self.shared.set_volume(level)
    }

    pub fn volume_up(&self) -> i32 {
        let current = lock(&self.shared.persisted).volume;
        self.shared.set_volume(current.saturating_add(VOLUME_STEP))
    }

    pub fn volume_down(&self) -> i32 {
        let current = lock(&self.shared.persisted).volume;
        self.shared.set_volume(current.saturating_sub(VOLUME_STEP))
    }

    pub fn set_shuffle(&self, on: bool) {
        self.shared.persist(|s| s.shuffle = on);
    }

    pub fn toggle_shuffle(&self) -> bool {
        let on = !lock(&self.shared.persisted).shuffle;
        self.set_shuffle(on);
        on
    }

    /// Rescan the library and restart playback in the surviving playlist.
    pub fn refresh_catalog(&self) {
        self.shared.refresh_catalog();
    }

    /// Apply a change to the non-transport parts of the session and persist it.
    pub fn update_session(&self, f: impl FnOnce(&mut SessionState)) {
        self.shared.persist(|s| {
            f(s);
            *s = std::mem::take(s).normalized();
        });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.shared.playback).snapshot()
    }

    pub fn session_state(&self) -> SessionState {
        lock(&self.shared.persisted).clone()
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        lock(&self.shared.catalog).clone()
    }

    #[cfg(test)]
    pub(super) fn load_generation(&self) -> u64 {
        lock(&self.shared.playback).generation
    }

    /// Run an advance as the dispatcher would.
    #[cfg(test)]
    pub(super) fn advance_from(&self, generation: u64) {
        self.shared.advance(generation);
    }

    /// Stop the workers, then the engine, then flush the session.
    ///
    /// Workers are signalled first and joined with a bounded wait so none of
    /// them can issue a command against a stopped engine. Idempotent.
    pub fn shutdown(&self) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return;
        }

        self.stop.stop();
        lock(&self.cmd_tx).take();

        let deadline = Instant::now() + Duration::from_millis(self.watchers.shutdown_timeout_ms);
        let workers: Vec<_> = lock(&self.workers).drain(..).collect();
        for (name, handle) in workers {
            join_bounded(name, handle, deadline);
        }

        if let Err(e) = self.shared.engine.stop() {
            warn!(error = %e, "engine stop failed during shutdown");
        }

        let state = lock(&self.shared.persisted).clone();
        self.shared.store.save(&state);
        info!("playback coordinator shut down");
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn join_bounded(name: &str, handle: JoinHandle<()>, deadline: Instant) {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!(worker = name, "worker did not stop in time, detaching");
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    if handle.join().is_err() {
        warn!(worker = name, "worker panicked");
    }
}

impl Shared {
    fn persist(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = lock(&self.persisted);
        f(&mut state);
        self.store.save(&state);
    }

    fn set_status(&self, pb: &mut PlaybackSession, status: TransportStatus) {
        if pb.status != status {
            pb.status = status;
            self.display.on_transport_state_changed(status);
        }
    }

    fn now_playing_title(&self) -> Option<String> {
        let pb = lock(&self.playback);
        if !pb.is_active() {
            return None;
        }
        pb.title
            .clone()
            .or_else(|| pb.track(pb.index).map(|t| t.title))
    }

    fn restore(&self) {
        let (saved_name, saved_index) = {
            let s = lock(&self.persisted);
            (s.playlist.clone(), s.song_index)
        };
        let catalog = lock(&self.catalog).clone();
        let Some(playlist) = catalog
            .get(&saved_name)
            .or_else(|| catalog.first_by_name())
        else {
            info!("no playlists found");
            return;
        };

        let mut pb = lock(&self.playback);
        let name = playlist.name.clone();
        pb.activate(playlist, saved_index);
        let index = pb.index;
        if name != saved_name {
            self.persist(|s| s.playlist = name);
        }
        self.display.on_transport_state_changed(pb.status);
        self.play_at_locked(&mut pb, index);
    }

    fn select_playlist(&self, name: &str) {
        let Some(playlist) = lock(&self.catalog).get(name) else {
            debug!(playlist = name, "ignoring unknown playlist");
            return;
        };

        let mut pb = lock(&self.playback);
        pb.activate(playlist, 0);
        self.persist(|s| {
            s.playlist = name.to_string();
            s.song_index = 0;
        });
        self.display.on_transport_state_changed(pb.status);
        if pb.is_active() {
            self.play_at_locked(&mut pb, 0);
        }
    }

    fn refresh_catalog(&self) {
        let catalog = Arc::new(self.source.scan());
        *lock(&self.catalog) = catalog.clone();

        let mut pb = lock(&self.playback);
        let current = pb.playlist.as_ref().map(|p| p.name.clone());
        let target = current
            .and_then(|name| catalog.get(&name))
            .or_else(|| catalog.first_by_name());

        match target {
            Some(playlist) => {
                let name = playlist.name.clone();
                pb.activate(playlist, 0);
                self.persist(|s| {
                    s.playlist = name;
                    s.song_index = 0;
                });
                self.display.on_transport_state_changed(pb.status);
                self.play_at_locked(&mut pb, 0);
            }
            None => {
                pb.clear();
                if let Err(e) = self.engine.stop() {
                    warn!(error = %e, "engine stop failed");
                }
                self.display.on_transport_state_changed(TransportStatus::Idle);
            }
        }
        info!(playlists = catalog.len(), "playlist catalog refreshed");
    }

    fn play_at_locked(&self, pb: &mut PlaybackSession, index: usize) -> Option<String> {
        let Some(track) = pb.track(index) else {
            debug!(index, len = pb.len(), "ignoring out-of-range track index");
            return None;
        };

        pb.index = index;
        self.persist(|s| s.song_index = index);

        match self.start_track(&track) {
            Ok(title) => {
                pb.mark_loaded(index, title.clone());
                self.display.on_display_update(&title, &format_time(0));
                self.set_status(pb, TransportStatus::Playing);
                Some(title)
            }
            Err(e) => {
                warn!(path = %track.path.display(), error = %e, "could not play track");
                None
            }
        }
    }

    /// Load `track`, start it and apply the session volume.
    fn start_track(&self, track: &Track) -> Result<String, EngineError> {
        let media = self.engine.load(&track.path)?;
        self.engine.play()?;
        let volume = lock(&self.persisted).volume;
        self.engine.set_volume(clamp_volume(volume) as u8)?;
        Ok(media
            .title
            .or_else(|| self.engine.metadata_title())
            .unwrap_or_else(|| track.title.clone()))
    }

    fn play_locked(&self, pb: &mut PlaybackSession) {
        if !pb.is_active() {
            return;
        }
        // A finished track is restarted rather than resumed.
        if pb.loaded != Some(pb.index) || self.engine_at_end() {
            let index = pb.index;
            self.play_at_locked(pb, index);
            return;
        }

        let volume = clamp_volume(lock(&self.persisted).volume) as u8;
        let result = self
            .engine
            .play()
            .and_then(|()| self.engine.set_volume(volume));
        match result {
            Ok(()) => self.set_status(pb, TransportStatus::Playing),
            Err(e) => warn!(error = %e, "play failed"),
        }
    }

    fn pause_locked(&self, pb: &mut PlaybackSession) {
        match self.engine.pause() {
            Ok(()) => self.set_status(pb, TransportStatus::Paused),
            Err(e) => warn!(error = %e, "pause failed"),
        }
    }

    fn engine_at_end(&self) -> bool {
        self.engine.state().is_ok_and(|s| s.is_end_of_track())
    }

    /// Auto-advance past the track loaded as `generation`.
    ///
    /// Dropped when another track was loaded since the end was observed, or
    /// when the engine is no longer at an end state. If nothing new could be
    /// loaded the status falls back to `Loaded`, so play retries the new index.
    fn advance(&self, generation: u64) {
        let mut pb = lock(&self.playback);
        if pb.active_generation() != Some(generation) {
            debug!(generation, current = pb.generation, "dropping stale advance");
            return;
        }
        match self.engine.state() {
            Ok(state) if state.is_end_of_track() => {}
            Ok(state) => {
                debug!(?state, "engine left the end state, dropping advance");
                return;
            }
            Err(e) => {
                warn!(error = %e, "advance: state read failed");
                return;
            }
        }

        self.step_locked(&mut pb, true);
        if pb.generation == generation {
            self.set_status(&mut pb, TransportStatus::Loaded);
        }
    }

    fn step(&self, forward: bool) -> Option<usize> {
        let mut pb = lock(&self.playback);
        self.step_locked(&mut pb, forward)
    }

    fn step_locked(&self, pb: &mut PlaybackSession, forward: bool) -> Option<usize> {
        let len = pb.len();
        if len == 0 {
            return None;
        }

        let shuffle = lock(&self.persisted).shuffle;
        let index = if shuffle {
            rand::rng().random_range(0..len)
        } else if forward {
            (pb.index + 1) % len
        } else {
            (pb.index + len - 1) % len
        };

        self.play_at_locked(pb, index);
        Some(index)
    }

    fn set_volume(&self, level: i32) -> i32 {
        let level = clamp_volume(level);
        let pb = lock(&self.playback);
        self.persist(|s| s.volume = level);
        if pb.loaded.is_some() {
            if let Err(e) = self.engine.set_volume(level as u8) {
                warn!(error = %e, "set_volume failed");
            }
        }
        level
    }
}
