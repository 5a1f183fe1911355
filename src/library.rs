//! Playlist discovery: turns a music root into a catalog of folder playlists.

mod model;
mod scan;

pub use model::{Catalog, Playlist, Track};
pub use scan::scan;
