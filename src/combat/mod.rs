//! Rules of the combat game: moves and their stats, the charge economy and
//! round resolution.

pub mod core;
pub mod state;
