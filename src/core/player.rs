//! Player representation

use crate::core::{ManipulatorGroup, PlayerName, PlayerNumber, Role, Team};
use serde::{Deserialize, Serialize};

/// Represents a seat at the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Seat number (1..=player_count)
    pub number: PlayerNumber,

    /// Still in the game?
    pub is_alive: bool,

    /// Role chosen at setup or by self-selection, before any reveal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_role: Option<Role>,

    /// Role shown to the table; set if and only if it has been revealed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_role: Option<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PlayerName>,

    /// Narrator's free-text notes
    #[serde(default)]
    pub notes: String,

    /// Allegiance picked by a Wolf-Hound holder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wolf_hound_team: Option<Team>,

    /// Every player gets a group, not just the manipulator
    pub prejudiced_manipulator_group: ManipulatorGroup,
}

impl Player {
    pub fn new(number: PlayerNumber) -> Self {
        Player {
            number,
            is_alive: true,
            assigned_role: None,
            actual_role: None,
            name: None,
            notes: String::new(),
            wolf_hound_team: None,
            prejudiced_manipulator_group: ManipulatorGroup::for_seat(number),
        }
    }

    /// Best known role: the revealed card, else the setup assignment
    pub fn role(&self) -> Option<Role> {
        self.actual_role.or(self.assigned_role)
    }

    /// Bound to `role` by reveal or by assignment
    pub fn holds(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    /// Dead with a revealed card
    pub fn is_revealed_dead(&self) -> bool {
        !self.is_alive && self.actual_role.is_some()
    }

    /// Name for narration, falling back to the seat number
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} (#{})", name, self.number),
            None => format!("Player {}", self.number),
        }
    }
}
