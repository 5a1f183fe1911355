//! Background pollers: end-of-track detection and the elapsed-time display.
//!
//! Both poll on a fixed interval and never exit because of a failed engine
//! call; read errors are logged and the next tick tries again.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::engine::PlaybackEngine;

use super::display::{DisplaySink, format_time};
use super::stop::StopSignal;

/// Decides when a track has ended on its own.
///
/// The boolean "is playing" flag cannot tell a user pause from a natural end,
/// so a non-playing engine is only treated as finished when its reported state
/// is `Ended` or `NothingLoaded`. One end episode fires exactly once per load
/// generation. Seeing any other state re-arms the detector, and so does a new
/// generation, which covers tracks that end between two polls.
#[derive(Debug, Default)]
pub struct EndOfTrackDetector {
    fired_for: Option<u64>,
}

impl EndOfTrackDetector {
    /// Poll the engine once. `generation` is the load generation of the active
    /// track, `None` when no playlist is active. Returns the generation to
    /// advance from when the track has finished.
    pub fn poll(&mut self, engine: &dyn PlaybackEngine, generation: Option<u64>) -> Option<u64> {
        match engine.is_playing() {
            Ok(true) => {
                self.fired_for = None;
                return None;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "end-of-track watcher: is_playing failed");
                return None;
            }
        }

        let generation = generation?;

        let state = match engine.state() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "end-of-track watcher: state read failed");
                return None;
            }
        };

        if !state.is_end_of_track() {
            self.fired_for = None;
            return None;
        }

        if self.fired_for == Some(generation) {
            return None;
        }
        self.fired_for = Some(generation);
        debug!(?state, generation, "track finished, advancing");
        Some(generation)
    }
}

/// Poll every `tick` until stopped, calling `advance` once per finished track.
///
/// `advance` must only enqueue work: the loop keeps its cadence regardless of
/// how long loading the next track takes.
pub fn run_end_of_track_watcher(
    engine: &dyn PlaybackEngine,
    generation: impl Fn() -> Option<u64>,
    advance: impl Fn(u64),
    stop: &StopSignal,
    tick: Duration,
) {
    let mut detector = EndOfTrackDetector::default();
    while !stop.wait(tick) {
        if let Some(finished) = detector.poll(engine, generation()) {
            advance(finished);
        }
    }
    trace!("end-of-track watcher stopped");
}

/// Report the current title and elapsed time once. `title` is `None` when no
/// playlist is active, in which case nothing is reported.
pub fn report_elapsed(engine: &dyn PlaybackEngine, title: Option<String>, display: &dyn DisplaySink) {
    let Some(title) = title else {
        return;
    };
    match engine.elapsed_ms() {
        Ok(ms) => display.on_display_update(&title, &format_time(ms)),
        Err(e) => warn!(error = %e, "elapsed-time watcher: read failed"),
    }
}

/// Refresh the elapsed-time display every `tick` until stopped.
pub fn run_elapsed_watcher(
    engine: &dyn PlaybackEngine,
    now_playing: impl Fn() -> Option<String>,
    display: &dyn DisplaySink,
    stop: &StopSignal,
    tick: Duration,
) {
    while !stop.wait(tick) {
        report_elapsed(engine, now_playing(), display);
    }
    trace!("elapsed-time watcher stopped");
}
