//! Wolf Narrator - rules engine for a werewolf party game narrator
//!
//! Tracks the roster, secret roles and the night/day cycle, and tells the
//! narrator which roles wake, what an elimination sets off, and who has won.

pub mod core;
pub mod game;
pub mod loader;
pub mod simulation;
pub mod undo;
pub mod error;

pub use error::{NarratorError, Result};
