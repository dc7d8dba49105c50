//! Game state, night sequencing, consequences and victory

pub mod actions;
pub mod autoplay;
pub mod consequence;
pub mod controller;
pub mod logger;
pub mod narrator;
pub mod night;
pub mod phase;
pub mod snapshot;
pub mod state;
pub mod victory;

pub use actions::DawnReport;
pub use autoplay::{deal_roles, AutoPlayResult, AutoPlayer, GameEndReason};
pub use consequence::{resolve, Consequence, ConsequenceType};
pub use controller::{Decision, NarratorController, RandomController, ZeroController};
pub use logger::{GameLogger, OutputMode, VerbosityLevel};
pub use narrator::Narrator;
pub use night::{active_role_queue, current_step};
pub use phase::{DayState, GamePhase, NightActions, NightState, NightStep, WerewolfVariant};
pub use snapshot::{GameSnapshot, SnapshotError};
pub use state::{EventCategory, GameEvent, GameSetup, GameState};
pub use victory::{evaluate, TeamCounts, WinResult, Winner};
