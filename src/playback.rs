//! Playback coordination: the transport state machine, the end-of-track and
//! elapsed-time watchers, and the callbacks used to keep the UI current.
//!
//! The coordinator is the only owner of the playback session. The UI calls its
//! transport methods; the watchers observe the engine from background threads
//! and feed back through a command channel and the [`DisplaySink`].

mod coordinator;
mod display;
mod state;
mod stop;
mod watchers;

pub use coordinator::{LibrarySource, PlaybackCoordinator};
pub use display::{DisplaySink, format_time};
pub use state::{SessionSnapshot, TransportStatus};

#[cfg(test)]
mod tests;
