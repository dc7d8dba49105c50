//! Core game types: roles, players, and typed identifiers

pub mod player;
pub mod role;
pub mod types;

pub use player::Player;
pub use role::{slot_count, total_slots, Role};
pub use types::{ManipulatorGroup, PlayerName, PlayerNumber, Team};
