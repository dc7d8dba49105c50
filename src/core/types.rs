//! Strongly-typed wrappers for game concepts
//!
//! This module provides newtypes to prevent type confusion and make the code
//! more self-documenting. Seat numbers, names and factions are distinct types
//! that cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat number of a player at the table (1..=player_count)
///
/// Cross-player links (lovers, role model, sheriff) are stored by number,
/// never by reference, so they survive serialization unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerNumber(u32);

impl PlayerNumber {
    pub const fn new(n: u32) -> Self {
        PlayerNumber(n)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// The seat to the left, wrapping from the last seat back to 1
    pub fn next_seat(&self, player_count: u32) -> PlayerNumber {
        if self.0 >= player_count {
            PlayerNumber(1)
        } else {
            PlayerNumber(self.0 + 1)
        }
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PlayerNumber {
    fn from(n: u32) -> Self {
        PlayerNumber(n)
    }
}

/// Player display name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: impl Into<String>) -> Self {
        PlayerName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        PlayerName(s)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        PlayerName(s.to_string())
    }
}

/// Faction a role's holder fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Team {
    Village,
    Werewolf,
    Solo,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Village => write!(f, "village"),
            Team::Werewolf => write!(f, "werewolf"),
            Team::Solo => write!(f, "solo"),
        }
    }
}

impl std::str::FromStr for Team {
    type Err = crate::NarratorError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "village" | "villager" | "v" => Ok(Team::Village),
            "werewolf" | "werewolves" | "wolf" | "w" => Ok(Team::Werewolf),
            "solo" | "s" => Ok(Team::Solo),
            _ => Err(crate::NarratorError::ParseError(format!("Invalid team: {s}"))),
        }
    }
}

/// Narrator-assigned half of the table, used by the prejudiced manipulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManipulatorGroup {
    A,
    B,
}

impl ManipulatorGroup {
    /// Default split: odd seats in A, even seats in B
    pub fn for_seat(number: PlayerNumber) -> Self {
        if number.as_u32() % 2 == 1 {
            ManipulatorGroup::A
        } else {
            ManipulatorGroup::B
        }
    }

    pub fn other(&self) -> Self {
        match self {
            ManipulatorGroup::A => ManipulatorGroup::B,
            ManipulatorGroup::B => ManipulatorGroup::A,
        }
    }
}

impl fmt::Display for ManipulatorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManipulatorGroup::A => write!(f, "A"),
            ManipulatorGroup::B => write!(f, "B"),
        }
    }
}

impl std::str::FromStr for ManipulatorGroup {
    type Err = crate::NarratorError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(ManipulatorGroup::A),
            "B" | "b" => Ok(ManipulatorGroup::B),
            _ => Err(crate::NarratorError::ParseError(format!("Invalid group: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_seat_wraps() {
        assert_eq!(PlayerNumber::new(3).next_seat(8), PlayerNumber::new(4));
        assert_eq!(PlayerNumber::new(8).next_seat(8), PlayerNumber::new(1));
    }

    #[test]
    fn test_player_name() {
        let name = PlayerName::new("Alice");
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_team_parse() {
        assert_eq!("Werewolves".parse::<Team>().unwrap(), Team::Werewolf);
        assert_eq!("village".parse::<Team>().unwrap(), Team::Village);
        assert!("wizards".parse::<Team>().is_err());
    }

    #[test]
    fn test_group_for_seat() {
        assert_eq!(ManipulatorGroup::for_seat(PlayerNumber::new(1)), ManipulatorGroup::A);
        assert_eq!(ManipulatorGroup::for_seat(PlayerNumber::new(2)), ManipulatorGroup::B);
        assert_eq!(ManipulatorGroup::A.other(), ManipulatorGroup::B);
    }
}
