//! Tracks and the helpers that build them.
//!
//! `model` holds the `Track` value queued by the player, `display` composes
//! now-playing names and `scan` turns command-line paths into tracks.

mod display;
mod model;
mod scan;

pub use display::now_playing_name;
pub use model::Track;
pub use scan::scan;

#[cfg(test)]
mod tests;
