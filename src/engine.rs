//! Media engine: the contract the coordinator drives, plus the `rodio`
//! implementation used by the binary.

mod metadata;
mod rodio_engine;
mod types;

pub use rodio_engine::RodioEngine;
pub use types::*;
