//! `rodio`-backed [`PlaybackEngine`].
//!
//! The output stream lives on a dedicated audio thread; the public handle only
//! sends commands over a channel and reads a status snapshot the thread keeps
//! up to date. Control calls wait for the thread's reply, which never includes
//! waiting for audio to drain.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use super::metadata::read_title;
use super::types::{EngineError, EngineState, LoadedMedia, PlaybackEngine};

/// How often the audio thread refreshes the status snapshot when idle.
const STATUS_TICK: Duration = Duration::from_millis(100);

type Reply<T> = Sender<Result<T, EngineError>>;

enum EngineCmd {
    Load {
        media: LoadedMedia,
        reply: Reply<()>,
    },
    Play(Reply<()>),
    Pause(Reply<()>),
    Stop(Reply<()>),
    SetVolume(u8, Reply<()>),
    Quit,
}

#[derive(Debug, Clone)]
struct EngineStatus {
    state: EngineState,
    elapsed: Duration,
    title: Option<String>,
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self {
            state: EngineState::NothingLoaded,
            elapsed: Duration::ZERO,
            title: None,
        }
    }
}

type StatusHandle = Arc<Mutex<EngineStatus>>;

pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    status: StatusHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioEngine {
    /// Spawn the audio thread. A missing output device is not fatal here:
    /// every later command reports [`EngineError::NoOutputDevice`].
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let status: StatusHandle = Arc::new(Mutex::new(EngineStatus::default()));
        let join = spawn_audio_thread(rx, status.clone());

        Self {
            tx,
            status,
            join: Mutex::new(Some(join)),
        }
    }

    fn request(&self, make: impl FnOnce(Reply<()>) -> EngineCmd) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| EngineError::Disconnected)?;
        reply_rx.recv().map_err(|_| EngineError::Disconnected)?
    }

    fn status(&self) -> Result<EngineStatus, EngineError> {
        self.status
            .lock()
            .map(|s| s.clone())
            .map_err(|_| EngineError::Disconnected)
    }
}

impl Default for RodioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        let _ = self.tx.send(EngineCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&self, path: &Path) -> Result<LoadedMedia, EngineError> {
        let media = LoadedMedia {
            path: path.to_path_buf(),
            title: read_title(path),
        };
        let loaded = media.clone();
        self.request(|reply| EngineCmd::Load { media, reply })?;
        Ok(loaded)
    }

    fn play(&self) -> Result<(), EngineError> {
        self.request(EngineCmd::Play)
    }

    fn pause(&self) -> Result<(), EngineError> {
        self.request(EngineCmd::Pause)
    }

    fn stop(&self) -> Result<(), EngineError> {
        self.request(EngineCmd::Stop)
    }

    fn is_playing(&self) -> Result<bool, EngineError> {
        Ok(self.status()?.state == EngineState::Playing)
    }

    fn state(&self) -> Result<EngineState, EngineError> {
        Ok(self.status()?.state)
    }

    fn elapsed_ms(&self) -> Result<u64, EngineError> {
        Ok(self.status()?.elapsed.as_millis() as u64)
    }

    fn set_volume(&self, level: u8) -> Result<(), EngineError> {
        self.request(|reply| EngineCmd::SetVolume(level, reply))
    }

    fn metadata_title(&self) -> Option<String> {
        self.status().ok().and_then(|s| s.title)
    }
}

/// Open and decode `path` into a paused sink.
fn create_sink(mixer: &Mixer, path: &Path, volume: f32) -> Result<Sink, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let sink = Sink::connect_new(mixer);
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(sink)
}

fn volume_scale(level: u8) -> f32 {
    f32::from(level.min(100)) / 100.0
}

fn spawn_audio_thread(rx: Receiver<EngineCmd>, status: StatusHandle) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "could not open audio output");
                reject_all(rx, e.to_string());
                return;
            }
        };
        // rodio logs to stderr when the stream is dropped, which would land on the TUI.
        stream.log_on_drop(false);

        let mut sink: Option<Sink> = None;
        let mut title: Option<String> = None;
        let mut volume = 1.0_f32;
        let mut stopped = false;

        loop {
            let cmd = match rx.recv_timeout(STATUS_TICK) {
                Ok(cmd) => cmd,
                Err(RecvTimeoutError::Timeout) => {
                    publish(&status, sink.as_ref(), title.as_ref(), stopped);
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let (reply, result) = match cmd {
                EngineCmd::Load { media, reply } => {
                    // Build the new sink first so a bad file leaves the current one alone.
                    let result = create_sink(stream.mixer(), &media.path, volume).map(|s| {
                        if let Some(old) = sink.replace(s) {
                            old.stop();
                        }
                        debug!(path = %media.path.display(), "media loaded");
                        title = media.title;
                        stopped = false;
                    });
                    (reply, result)
                }
                EngineCmd::Play(reply) => (reply, with_sink(sink.as_ref(), Sink::play)),
                EngineCmd::Pause(reply) => (reply, with_sink(sink.as_ref(), Sink::pause)),
                EngineCmd::Stop(reply) => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    title = None;
                    stopped = true;
                    (reply, Ok(()))
                }
                EngineCmd::SetVolume(level, reply) => {
                    volume = volume_scale(level);
                    if let Some(s) = sink.as_ref() {
                        s.set_volume(volume);
                    }
                    (reply, Ok(()))
                }
                EngineCmd::Quit => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    publish(&status, None, None, true);
                    break;
                }
            };

            // Publish before replying so callers never read a pre-command state.
            publish(&status, sink.as_ref(), title.as_ref(), stopped);
            let _ = reply.send(result);
        }
    })
}

fn with_sink(sink: Option<&Sink>, f: impl FnOnce(&Sink)) -> Result<(), EngineError> {
    let s = sink.ok_or(EngineError::NothingLoaded)?;
    f(s);
    Ok(())
}

fn publish(status: &StatusHandle, sink: Option<&Sink>, title: Option<&String>, stopped: bool) {
    let (state, elapsed) = match sink {
        None if stopped => (EngineState::Stopped, Duration::ZERO),
        None => (EngineState::NothingLoaded, Duration::ZERO),
        Some(s) if s.empty() => (EngineState::Ended, s.get_pos()),
        Some(s) if s.is_paused() => (EngineState::Paused, s.get_pos()),
        Some(s) => (EngineState::Playing, s.get_pos()),
    };

    if let Ok(mut info) = status.lock() {
        info.state = state;
        info.elapsed = elapsed;
        info.title = title.cloned();
    }
}

/// Without an output device, answer every command with an error until told to quit.
fn reject_all(rx: Receiver<EngineCmd>, reason: String) {
    for cmd in rx {
        let reply = match cmd {
            EngineCmd::Load { reply, .. }
            | EngineCmd::Play(reply)
            | EngineCmd::Pause(reply)
            | EngineCmd::Stop(reply)
            | EngineCmd::SetVolume(_, reply) => reply,
            EngineCmd::Quit => break,
        };
        warn!(reason = %reason, "engine command rejected");
        let _ = reply.send(Err(EngineError::NoOutputDevice(reason.clone())));
    }
}
