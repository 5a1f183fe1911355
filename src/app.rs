//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the playlist list, the
//! cursor, the options panel and the now-playing display state.

mod model;

pub use model::*;
