//! Persisted session record: volume, shuffle, geometry, colors and the
//! active playlist/track, written back on every change.

mod state;
mod store;

pub use state::*;
pub use store::{SessionError, SessionStore};
