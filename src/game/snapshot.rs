//! Saving and restoring a game
//!
//! A snapshot is the `GameState` as pretty JSON. Loading is strict, but
//! `load_or_fresh` recovers from a missing, malformed or inconsistent file
//! by handing back a freshly configured game.

use crate::game::state::{GameSetup, GameState};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Bumped when the layout changes incompatibly
    pub format_version: u32,
    pub game_state: GameState,
}

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

impl GameSnapshot {
    pub fn new(game_state: GameState) -> Self {
        GameSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            game_state,
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        std::fs::write(path.as_ref(), json).map_err(|e| SnapshotError::Io(e.to_string()))?;
        Ok(())
    }

    /// Read a snapshot and check it still describes a consistent game
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let json =
            std::fs::read_to_string(path.as_ref()).map_err(|e| SnapshotError::Io(e.to_string()))?;
        let snapshot: GameSnapshot = serde_json::from_str(&json)
            .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;
        snapshot.check()?;
        Ok(snapshot)
    }

    /// The persisted game, or a fresh one from `setup` if nothing usable
    /// is stored at `path`
    pub fn load_or_fresh<P: AsRef<Path>>(path: P, setup: &GameSetup) -> GameState {
        match Self::load_from_file(path) {
            Ok(snapshot) => snapshot.game_state,
            Err(_) => GameState::from_setup(setup.clone()),
        }
    }

    fn check(&self) -> Result<(), SnapshotError> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::Invalid(format!(
                "unsupported snapshot version {}",
                self.format_version
            )));
        }
        let state = &self.game_state;
        state
            .setup
            .validate()
            .map_err(|e| SnapshotError::Invalid(e.to_string()))?;
        let seats_match = state.players.len() == state.setup.player_count as usize
            && state
                .players
                .iter()
                .enumerate()
                .all(|(i, p)| p.number.as_u32() == i as u32 + 1);
        if !seats_match {
            return Err(SnapshotError::Invalid(
                "players are not numbered 1..=player_count".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur during snapshot operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

impl From<SnapshotError> for crate::NarratorError {
    fn from(err: SnapshotError) -> Self {
        crate::NarratorError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerNumber, Role};

    fn setup() -> GameSetup {
        GameSetup::new(
            4,
            vec![Role::Seer, Role::Villager, Role::Hunter, Role::SimpleWerewolf],
        )
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wolf-narrator-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_save_and_load() {
        let state = GameState::from_setup(setup())
            .start_game()
            .unwrap()
            .toggle_alive(PlayerNumber::new(2))
            .unwrap();
        let path = temp_path("roundtrip");
        GameSnapshot::new(state.clone()).save_to_file(&path).unwrap();

        let loaded = GameSnapshot::load_from_file(&path).unwrap();
        assert_eq!(loaded.game_state, state);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_gives_fresh_game() {
        let state = GameSnapshot::load_or_fresh(temp_path("missing"), &setup());
        assert_eq!(state.player_count(), 4);
        assert!(state.players.iter().all(|p| p.is_alive));
    }

    #[test]
    fn test_malformed_file_gives_fresh_game() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            GameSnapshot::load_from_file(&path),
            Err(SnapshotError::Deserialization(_))
        ));
        let state = GameSnapshot::load_or_fresh(&path, &setup());
        assert_eq!(state.setup, setup());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_inconsistent_snapshot_rejected() {
        let mut state = GameState::from_setup(setup());
        state.players.pop();
        let path = temp_path("inconsistent");
        GameSnapshot::new(state).save_to_file(&path).unwrap();
        assert!(matches!(
            GameSnapshot::load_from_file(&path),
            Err(SnapshotError::Invalid(_))
        ));
        assert_eq!(GameSnapshot::load_or_fresh(&path, &setup()).players.len(), 4);
        std::fs::remove_file(&path).ok();
    }
}
