use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::{TempDir, tempdir};

use super::display::{DisplaySink, format_time};
use super::state::TransportStatus;
use super::stop::StopSignal;
use super::watchers::{EndOfTrackDetector, report_elapsed, run_end_of_track_watcher};
use super::{LibrarySource, PlaybackCoordinator};
use crate::config::{LibrarySettings, WatcherSettings};
use crate::engine::{EngineError, EngineState, LoadedMedia, PlaybackEngine};
use crate::session::{SessionState, SessionStore};

#[derive(Default)]
struct MockState {
    loaded: Option<PathBuf>,
    playing: bool,
    ended: bool,
    /// Scripted states consumed one per `is_playing` poll; the last one sticks.
    script: VecDeque<EngineState>,
    scripted: Option<EngineState>,
    elapsed_ms: u64,
    fail_reads: bool,
    failing: Vec<String>,
    loads: Vec<PathBuf>,
    volume: Option<u8>,
    stops: usize,
    /// Every load produces a track that has already finished.
    end_on_load: bool,
}

impl MockState {
    fn current(&self) -> EngineState {
        if let Some(s) = self.scripted {
            return s;
        }
        match (&self.loaded, self.ended, self.playing) {
            (None, _, _) => EngineState::NothingLoaded,
            (Some(_), true, _) => EngineState::Ended,
            (Some(_), false, true) => EngineState::Playing,
            (Some(_), false, false) => EngineState::Paused,
        }
    }
}

#[derive(Default)]
struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    fn scripted(states: &[EngineState]) -> Self {
        let engine = MockEngine::default();
        engine.state.lock().unwrap().script = states.iter().copied().collect();
        engine
    }

    fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    fn load_count(&self) -> usize {
        self.with(|s| s.loads.len())
    }
}

impl PlaybackEngine for MockEngine {
    fn load(&self, path: &Path) -> Result<LoadedMedia, EngineError> {
        self.with(|s| {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            if s.failing.contains(&name) {
                return Err(EngineError::Open {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::InvalidData, "broken"),
                });
            }
            s.loads.push(path.to_path_buf());
            s.loaded = Some(path.to_path_buf());
            s.playing = false;
            s.ended = s.end_on_load;
            s.scripted = None;
            Ok(LoadedMedia {
                path: path.to_path_buf(),
                title: None,
            })
        })
    }

    fn play(&self) -> Result<(), EngineError> {
        self.with(|s| match s.loaded {
            Some(_) => {
                s.playing = true;
                Ok(())
            }
            None => Err(EngineError::NothingLoaded),
        })
    }

    fn pause(&self) -> Result<(), EngineError> {
        self.with(|s| s.playing = false);
        Ok(())
    }

    fn stop(&self) -> Result<(), EngineError> {
        self.with(|s| {
            s.stops += 1;
            s.playing = false;
        });
        Ok(())
    }

    fn is_playing(&self) -> Result<bool, EngineError> {
        self.with(|s| {
            if s.fail_reads {
                return Err(EngineError::Disconnected);
            }
            if let Some(next) = s.script.pop_front() {
                s.scripted = Some(next);
            }
            Ok(s.current() == EngineState::Playing)
        })
    }

    fn state(&self) -> Result<EngineState, EngineError> {
        self.with(|s| Ok(s.current()))
    }

    fn elapsed_ms(&self) -> Result<u64, EngineError> {
        self.with(|s| {
            if s.fail_reads {
                Err(EngineError::Disconnected)
            } else {
                Ok(s.elapsed_ms)
            }
        })
    }

    fn set_volume(&self, level: u8) -> Result<(), EngineError> {
        self.with(|s| s.volume = Some(level));
        Ok(())
    }

    fn metadata_title(&self) -> Option<String> {
        None
    }
}

#[derive(Default)]
struct RecordingDisplay {
    updates: Mutex<Vec<(String, String)>>,
    statuses: Mutex<Vec<TransportStatus>>,
}

impl DisplaySink for RecordingDisplay {
    fn on_display_update(&self, title: &str, elapsed: &str) {
        self.updates
            .lock()
            .unwrap()
            .push((title.to_string(), elapsed.to_string()));
    }

    fn on_transport_state_changed(&self, status: TransportStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

// Field order matters: the coordinator flushes on drop, before the temp dir goes away.
struct Fixture {
    coordinator: PlaybackCoordinator,
    engine: Arc<MockEngine>,
    display: Arc<RecordingDisplay>,
    session_path: PathBuf,
    music: PathBuf,
    _dir: TempDir,
}

fn write_playlist(music: &Path, name: &str, tracks: usize) {
    let dir = music.join(name);
    fs::create_dir_all(&dir).unwrap();
    for i in 0..tracks {
        fs::write(dir.join(format!("track{i}.mp3")), b"fake").unwrap();
    }
}

fn fixture_with(session: SessionState, watchers: WatcherSettings) -> Fixture {
    let dir = tempdir().unwrap();
    let music = dir.path().join("Music");
    write_playlist(&music, "alpha", 5);
    write_playlist(&music, "beta", 1);

    let session_path = dir.path().join("session.toml");
    let store = SessionStore::new(&session_path);
    store.try_save(&session).unwrap();

    let engine = Arc::new(MockEngine::default());
    let display = Arc::new(RecordingDisplay::default());
    let coordinator = PlaybackCoordinator::new(
        engine.clone(),
        display.clone(),
        store,
        LibrarySource {
            root: music.clone(),
            settings: LibrarySettings::default(),
        },
        watchers,
    );

    Fixture {
        coordinator,
        engine,
        display,
        session_path,
        music,
        _dir: dir,
    }
}

/// Slow watchers so they stay out of the way of transport tests.
fn quiet_watchers() -> WatcherSettings {
    WatcherSettings {
        end_of_track_poll_ms: 60_000,
        elapsed_poll_ms: 60_000,
        shutdown_timeout_ms: 1000,
    }
}

fn fixture() -> Fixture {
    let session = SessionState {
        shuffle: false,
        playlist: "alpha".into(),
        ..SessionState::default()
    };
    fixture_with(session, quiet_watchers())
}

fn saved(f: &Fixture) -> SessionState {
    SessionStore::new(&f.session_path).load()
}

fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn format_time_pads_seconds_and_leaves_minutes_unbounded() {
    assert_eq!(format_time(125_000), "02:05");
    assert_eq!(format_time(59_000), "00:59");
    assert_eq!(format_time(3_661_000), "61:01");
    assert_eq!(format_time(0), "00:00");
    assert_eq!(format_time(999), "00:00");
}

#[test]
fn detector_fires_once_for_playing_playing_ended() {
    let engine = MockEngine::scripted(&[
        EngineState::Playing,
        EngineState::Playing,
        EngineState::Ended,
    ]);
    let mut detector = EndOfTrackDetector::default();

    // The engine keeps reporting Ended after the script runs out.
    let fired = (0..6).filter_map(|_| detector.poll(&engine, Some(1))).count();
    assert_eq!(fired, 1);
}

#[test]
fn detector_never_fires_on_user_pause() {
    let engine = MockEngine::scripted(&[
        EngineState::Playing,
        EngineState::Paused,
        EngineState::Paused,
    ]);
    let mut detector = EndOfTrackDetector::default();

    let fired = (0..3).filter_map(|_| detector.poll(&engine, Some(1))).count();
    assert_eq!(fired, 0);
}

#[test]
fn detector_rearms_between_tracks_and_ignores_stop() {
    let engine = MockEngine::scripted(&[
        EngineState::Ended,
        EngineState::Ended,
        EngineState::Playing,
        EngineState::Stopped,
        EngineState::NothingLoaded,
    ]);
    let mut detector = EndOfTrackDetector::default();

    let fired: Vec<bool> = (0..5)
        .map(|_| detector.poll(&engine, Some(1)).is_some())
        .collect();
    assert_eq!(fired, vec![true, false, false, false, true]);
}

#[test]
fn detector_requires_an_active_playlist() {
    let engine = MockEngine::scripted(&[EngineState::Ended]);
    let mut detector = EndOfTrackDetector::default();
    assert_eq!(detector.poll(&engine, None), None);
    assert_eq!(detector.poll(&engine, Some(3)), Some(3));
}

#[test]
fn detector_survives_read_errors() {
    let engine = MockEngine::scripted(&[EngineState::Ended]);
    engine.with(|s| s.fail_reads = true);
    let mut detector = EndOfTrackDetector::default();
    assert_eq!(detector.poll(&engine, Some(1)), None);

    engine.with(|s| s.fail_reads = false);
    assert_eq!(detector.poll(&engine, Some(1)), Some(1));
}

#[test]
fn detector_fires_again_when_a_new_track_ends_between_polls() {
    // The engine never leaves Ended; only the load generation moves.
    let engine = MockEngine::scripted(&[EngineState::Ended]);
    let mut detector = EndOfTrackDetector::default();

    assert_eq!(detector.poll(&engine, Some(1)), Some(1));
    assert_eq!(detector.poll(&engine, Some(1)), None);
    assert_eq!(detector.poll(&engine, Some(2)), Some(2));
    assert_eq!(detector.poll(&engine, Some(2)), None);
    assert_eq!(detector.poll(&engine, Some(3)), Some(3));
}

#[test]
fn end_of_track_watcher_loop_advances_once_and_stops() {
    let engine = MockEngine::scripted(&[
        EngineState::Playing,
        EngineState::Playing,
        EngineState::Ended,
    ]);
    let advances = Mutex::new(0usize);
    let stop = StopSignal::new();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            run_end_of_track_watcher(
                &engine,
                || Some(7),
                |generation| {
                    assert_eq!(generation, 7);
                    *advances.lock().unwrap() += 1;
                },
                &stop,
                Duration::from_millis(2),
            );
        });
        assert!(wait_until(Duration::from_secs(2), || {
            *advances.lock().unwrap() == 1
        }));
        std::thread::sleep(Duration::from_millis(30));
        stop.stop();
    });

    assert_eq!(*advances.lock().unwrap(), 1);
}

#[test]
fn stop_signal_wakes_waiters_early() {
    let stop = StopSignal::new();
    assert!(!stop.wait(Duration::from_millis(1)));

    let waiter = stop.clone();
    let started = Instant::now();
    let handle = std::thread::spawn(move || waiter.wait(Duration::from_secs(30)));
    std::thread::sleep(Duration::from_millis(20));
    stop.stop();

    assert!(handle.join().unwrap());
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(stop.is_stopped());
}

#[test]
fn report_elapsed_formats_and_tolerates_failures() {
    let engine = MockEngine::default();
    let display = RecordingDisplay::default();
    engine.with(|s| s.elapsed_ms = 125_000);

    report_elapsed(&engine, Some("Song".into()), &display);
    report_elapsed(&engine, None, &display);
    engine.with(|s| s.fail_reads = true);
    report_elapsed(&engine, Some("Song".into()), &display);

    let updates = display.updates.lock().unwrap();
    assert_eq!(*updates, vec![("Song".to_string(), "02:05".to_string())]);
}

#[test]
fn start_restores_saved_playlist_and_plays_it() {
    let session = SessionState {
        playlist: "alpha".into(),
        song_index: 3,
        volume: 55,
        ..SessionState::default()
    };
    let f = fixture_with(session, quiet_watchers());
    f.coordinator.start();

    let snap = f.coordinator.snapshot();
    assert_eq!(snap.playlist.as_deref(), Some("alpha"));
    assert_eq!(snap.index, 3);
    assert_eq!(snap.len, 5);
    assert_eq!(snap.status, TransportStatus::Playing);
    assert_eq!(snap.title.as_deref(), Some("track3.mp3"));
    assert_eq!(f.engine.with(|s| s.volume), Some(55));
    assert!(f.display.statuses.lock().unwrap().contains(&TransportStatus::Playing));
}

#[test]
fn start_falls_back_to_first_playlist_and_index_zero() {
    let session = SessionState {
        playlist: "gone".into(),
        song_index: 40,
        ..SessionState::default()
    };
    let f = fixture_with(session, quiet_watchers());
    f.coordinator.start();

    let snap = f.coordinator.snapshot();
    assert_eq!(snap.playlist.as_deref(), Some("alpha"));
    assert_eq!(snap.index, 0);
    assert_eq!(saved(&f).playlist, "alpha");
}

#[test]
fn next_then_prev_returns_to_start_without_shuffle() {
    let f = fixture();
    f.coordinator.start();
    f.coordinator.play_at(2);

    assert_eq!(f.coordinator.next(), Some(3));
    assert_eq!(f.coordinator.prev(), Some(2));
    assert_eq!(f.coordinator.snapshot().index, 2);
}

#[test]
fn next_and_prev_wrap_around() {
    let f = fixture();
    f.coordinator.start();

    assert_eq!(f.coordinator.prev(), Some(4));
    assert_eq!(f.coordinator.next(), Some(0));
    assert_eq!(saved(&f).song_index, 0);
}

#[test]
fn shuffle_next_stays_in_range() {
    let session = SessionState {
        shuffle: true,
        playlist: "alpha".into(),
        ..SessionState::default()
    };
    let f = fixture_with(session, quiet_watchers());
    f.coordinator.start();

    for _ in 0..200 {
        let i = f.coordinator.next().unwrap();
        assert!(i < 5);
        let i = f.coordinator.prev().unwrap();
        assert!(i < 5);
    }

    f.coordinator.select_playlist("beta");
    for _ in 0..20 {
        assert_eq!(f.coordinator.next(), Some(0));
    }
}

#[test]
fn transport_is_a_noop_without_playlists() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(MockEngine::default());
    let coordinator = PlaybackCoordinator::new(
        engine.clone(),
        Arc::new(RecordingDisplay::default()),
        SessionStore::new(dir.path().join("session.toml")),
        LibrarySource {
            root: dir.path().join("missing"),
            settings: LibrarySettings::default(),
        },
        quiet_watchers(),
    );
    coordinator.start();

    assert_eq!(coordinator.next(), None);
    assert_eq!(coordinator.prev(), None);
    assert_eq!(coordinator.play_at(0), None);
    coordinator.toggle_play_pause();
    assert_eq!(coordinator.snapshot().status, TransportStatus::Idle);
    assert_eq!(engine.load_count(), 0);
}

#[test]
fn play_at_out_of_range_is_ignored() {
    let f = fixture();
    f.coordinator.start();
    f.coordinator.play_at(1);
    let loads = f.engine.load_count();

    assert_eq!(f.coordinator.play_at(5), None);
    assert_eq!(f.coordinator.play_at(usize::MAX), None);
    assert_eq!(f.coordinator.snapshot().index, 1);
    assert_eq!(f.engine.load_count(), loads);
    assert_eq!(saved(&f).song_index, 1);
}

#[test]
fn play_at_returns_title_and_persists_index() {
    let f = fixture();
    f.coordinator.start();

    assert_eq!(f.coordinator.play_at(4).as_deref(), Some("track4.mp3"));
    assert_eq!(saved(&f).song_index, 4);
    let last = f.display.updates.lock().unwrap().last().cloned();
    assert_eq!(last, Some(("track4.mp3".to_string(), "00:00".to_string())));
}

#[test]
fn toggle_pauses_and_resumes_without_reloading() {
    let f = fixture();
    f.coordinator.start();
    let loads = f.engine.load_count();

    f.coordinator.toggle_play_pause();
    assert_eq!(f.coordinator.snapshot().status, TransportStatus::Paused);
    assert_eq!(f.engine.with(|s| s.current()), EngineState::Paused);

    f.coordinator.toggle_play_pause();
    assert_eq!(f.coordinator.snapshot().status, TransportStatus::Playing);
    assert_eq!(f.engine.load_count(), loads);
}

#[test]
fn engine_failure_leaves_status_and_allows_skip() {
    let f = fixture();
    f.coordinator.start();
    f.engine.with(|s| s.failing.push("track1.mp3".into()));

    assert_eq!(f.coordinator.play_at(1), None);
    let snap = f.coordinator.snapshot();
    assert_eq!(snap.status, TransportStatus::Playing);
    assert_eq!(snap.title.as_deref(), Some("track0.mp3"));

    assert_eq!(f.coordinator.next(), Some(2));
    assert_eq!(f.coordinator.snapshot().title.as_deref(), Some("track2.mp3"));
}

#[test]
fn select_playlist_switches_and_ignores_unknown_names() {
    let f = fixture();
    f.coordinator.start();
    f.coordinator.play_at(3);

    f.coordinator.select_playlist("nope");
    assert_eq!(f.coordinator.snapshot().playlist.as_deref(), Some("alpha"));
    assert_eq!(f.coordinator.snapshot().index, 3);

    f.coordinator.select_playlist("beta");
    let snap = f.coordinator.snapshot();
    assert_eq!(snap.playlist.as_deref(), Some("beta"));
    assert_eq!(snap.index, 0);
    assert_eq!(snap.status, TransportStatus::Playing);
    let s = saved(&f);
    assert_eq!(s.playlist, "beta");
    assert_eq!(s.song_index, 0);
}

#[test]
fn set_volume_clamps_and_persists() {
    let f = fixture();
    f.coordinator.start();

    assert_eq!(f.coordinator.set_volume(150), 100);
    assert_eq!(saved(&f).volume, 100);
    assert_eq!(f.engine.with(|s| s.volume), Some(100));

    assert_eq!(f.coordinator.set_volume(-5), 0);
    assert_eq!(saved(&f).volume, 0);

    assert_eq!(f.coordinator.volume_up(), 10);
    f.coordinator.set_volume(95);
    assert_eq!(f.coordinator.volume_up(), 100);
    assert_eq!(f.coordinator.volume_down(), 90);
}

#[test]
fn shuffle_toggle_and_session_updates_persist() {
    let f = fixture();
    assert!(f.coordinator.toggle_shuffle());
    assert!(saved(&f).shuffle);

    f.coordinator.update_session(|s| {
        s.width = 800;
        s.opacity = 10;
    });
    let s = saved(&f);
    assert_eq!(s.width, 800);
    assert_eq!(s.opacity, 30);
    assert_eq!(f.coordinator.session_state().width, 800);
}

#[test]
fn refresh_keeps_surviving_playlist_or_falls_back() {
    let f = fixture();
    f.coordinator.start();
    f.coordinator.select_playlist("beta");

    write_playlist(&f.music, "gamma", 2);
    f.coordinator.refresh_catalog();
    assert_eq!(f.coordinator.catalog().len(), 3);
    assert_eq!(f.coordinator.snapshot().playlist.as_deref(), Some("beta"));

    fs::remove_dir_all(f.music.join("beta")).unwrap();
    f.coordinator.refresh_catalog();
    let snap = f.coordinator.snapshot();
    assert_eq!(snap.playlist.as_deref(), Some("alpha"));
    assert_eq!(snap.index, 0);

    fs::remove_dir_all(&f.music).unwrap();
    f.coordinator.refresh_catalog();
    assert_eq!(f.coordinator.snapshot().status, TransportStatus::Idle);
    assert!(f.coordinator.catalog().is_empty());
}

#[test]
fn watchers_auto_advance_once_and_shutdown_stops_everything() {
    let session = SessionState {
        shuffle: false,
        playlist: "alpha".into(),
        ..SessionState::default()
    };
    let watchers = WatcherSettings {
        end_of_track_poll_ms: 5,
        elapsed_poll_ms: 5,
        shutdown_timeout_ms: 1000,
    };
    let f = fixture_with(session, watchers);
    f.coordinator.start();
    assert_eq!(f.engine.load_count(), 1);

    f.engine.with(|s| s.elapsed_ms = 61_000);
    assert!(wait_until(Duration::from_secs(2), || {
        f.display
            .updates
            .lock()
            .unwrap()
            .iter()
            .any(|(_, t)| t == "01:01")
    }));

    // A user pause must not advance.
    f.coordinator.toggle_play_pause();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(f.engine.load_count(), 1);

    f.coordinator.toggle_play_pause();
    f.engine.with(|s| s.ended = true);
    assert!(wait_until(Duration::from_secs(2), || f.coordinator.snapshot().index == 1));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(f.engine.load_count(), 2);

    f.coordinator.shutdown();
    assert_eq!(f.engine.with(|s| s.stops), 1);
    f.engine.with(|s| s.ended = true);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(f.engine.load_count(), 2);

    // Idempotent; Drop runs it again too.
    f.coordinator.shutdown();
    assert_eq!(f.engine.with(|s| s.stops), 1);
    assert_eq!(saved(&f).song_index, 1);
}

#[test]
fn tracks_that_end_immediately_keep_advancing() {
    let session = SessionState {
        shuffle: false,
        playlist: "alpha".into(),
        ..SessionState::default()
    };
    let watchers = WatcherSettings {
        end_of_track_poll_ms: 5,
        elapsed_poll_ms: 60_000,
        shutdown_timeout_ms: 1000,
    };
    let f = fixture_with(session, watchers);
    f.engine.with(|s| s.end_on_load = true);
    f.coordinator.start();

    assert!(wait_until(Duration::from_secs(2), || f.engine.load_count() > 6));
    f.coordinator.shutdown();

    // Wrapped around the five tracks of "alpha" at least once.
    let loads = f.engine.with(|s| s.loads.clone());
    let names: Vec<_> = loads
        .iter()
        .take(6)
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["track0.mp3", "track1.mp3", "track2.mp3", "track3.mp3", "track4.mp3", "track0.mp3"]
    );
}

#[test]
fn stale_advance_does_not_skip_a_user_choice() {
    let f = fixture();
    f.coordinator.start();
    let finished = f.coordinator.load_generation();
    f.engine.with(|s| s.ended = true);

    // The user skips before the queued advance runs.
    assert_eq!(f.coordinator.next(), Some(1));
    f.engine.with(|s| s.ended = true);
    f.coordinator.advance_from(finished);

    assert_eq!(f.coordinator.snapshot().index, 1);
    assert_eq!(f.engine.load_count(), 2);

    // The current track's own end still advances.
    f.coordinator.advance_from(f.coordinator.load_generation());
    assert_eq!(f.coordinator.snapshot().index, 2);
    assert_eq!(f.engine.load_count(), 3);
}

#[test]
fn advance_is_dropped_once_the_engine_is_no_longer_at_end() {
    let f = fixture();
    f.coordinator.start();
    let current = f.coordinator.load_generation();

    // Still playing: nothing to advance past.
    f.coordinator.advance_from(current);
    assert_eq!(f.coordinator.snapshot().index, 0);
    assert_eq!(f.engine.load_count(), 1);
}

#[test]
fn failed_advance_parks_in_loaded_and_play_retries() {
    let f = fixture();
    f.coordinator.start();
    f.engine.with(|s| {
        s.failing.push("track1.mp3".into());
        s.ended = true;
    });

    f.coordinator.advance_from(f.coordinator.load_generation());
    let snap = f.coordinator.snapshot();
    assert_eq!(snap.index, 1);
    assert_eq!(snap.status, TransportStatus::Loaded);
    assert_eq!(f.engine.load_count(), 1);
    assert_eq!(
        f.display.statuses.lock().unwrap().last(),
        Some(&TransportStatus::Loaded)
    );

    f.engine.with(|s| s.failing.clear());
    f.coordinator.toggle_play_pause();
    let snap = f.coordinator.snapshot();
    assert_eq!(snap.status, TransportStatus::Playing);
    assert_eq!(snap.title.as_deref(), Some("track1.mp3"));
    assert_eq!(f.engine.load_count(), 2);
}

#[test]
fn play_after_a_natural_end_restarts_the_track() {
    let f = fixture();
    f.coordinator.start();
    f.coordinator.pause();
    f.engine.with(|s| s.ended = true);

    f.coordinator.play();
    assert_eq!(f.engine.load_count(), 2);
    assert_eq!(f.coordinator.snapshot().index, 0);
    assert_eq!(f.coordinator.snapshot().status, TransportStatus::Playing);
}
