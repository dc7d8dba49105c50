//! Setup file loader
//!
//! Parser for the narrator's game setup format (.wwg)

pub mod setup_file;

pub use setup_file::{seat_by_name, SetupFile, SetupMetadata};
