//! Tile-drafting game engine and terminal front end
//!
//! This crate re-exports the engine crate for convenience and adds the text
//! renderer shared by the binaries.

pub use tiledraft_engine::*;

pub mod display;
