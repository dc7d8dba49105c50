//! Main game state structure

use crate::core::{total_slots, ManipulatorGroup, Player, PlayerName, PlayerNumber, Role, Team};
use crate::game::phase::{DayState, GamePhase, NightState};
use crate::game::victory::WinResult;
use crate::{NarratorError, Result};
use serde::{Deserialize, Serialize};

/// Roster size and role list chosen before the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSetup {
    pub player_count: u32,

    /// Repeated entries are duplicate single-seat roles; a sibling-group
    /// role appears once and expands to its slot count
    pub selected_roles: Vec<Role>,

    /// The two cards left face down for the thief
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unused_roles: Option<[Role; 2]>,
}

impl GameSetup {
    pub fn new(player_count: u32, selected_roles: Vec<Role>) -> Self {
        GameSetup {
            player_count,
            selected_roles,
            unused_roles: None,
        }
    }

    pub fn with_unused_roles(mut self, unused: [Role; 2]) -> Self {
        self.unused_roles = Some(unused);
        self
    }

    pub fn total_slots(&self) -> u32 {
        total_slots(&self.selected_roles)
    }

    /// Seats held by this role across the whole setup
    pub fn copies(&self, role: Role) -> u32 {
        self.selected_roles
            .iter()
            .filter(|r| **r == role)
            .map(|r| r.slot_count())
            .sum()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.selected_roles.contains(&role)
    }

    /// Check the invariants a game needs before it may start
    pub fn validate(&self) -> Result<()> {
        if self.player_count == 0 {
            return Err(NarratorError::InvalidSetup(
                "a game needs at least one player".to_string(),
            ));
        }
        let slots = self.total_slots();
        if slots != self.player_count {
            return Err(NarratorError::InvalidSetup(format!(
                "roles fill {} seats but {} players are configured",
                slots, self.player_count
            )));
        }
        if !self
            .selected_roles
            .iter()
            .any(|role| role.team() == Team::Werewolf)
        {
            return Err(NarratorError::InvalidSetup(
                "at least one werewolf role is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Category of a narration log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
    Setup,
    Night,
    Dawn,
    Day,
    Death,
    Revival,
    Reveal,
    RoleAction,
    Consequence,
    Victory,
}

/// Append-only log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub night: u32,
    pub category: EventCategory,
    pub description: String,
    /// Sequence number within the game (deterministic ordering)
    pub timestamp: u64,
}

/// Complete game state
///
/// One snapshot of one game in progress. Mutators never edit a snapshot in
/// place: they clone it, apply the change, and hand back the new value, so
/// older snapshots stay valid history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub setup: GameSetup,

    pub phase: GamePhase,

    /// Ordered by number; `players[i].number == i + 1`
    pub players: Vec<Player>,

    pub night: NightState,

    pub day: DayState,

    #[serde(default)]
    pub game_events: Vec<GameEvent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cupid_lovers: Option<[PlayerNumber; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wild_child_role_model: Option<PlayerNumber>,

    /// The wild child's role model died and the child joined the wolves
    #[serde(default)]
    pub wild_child_transformed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursed_wolf_father_infected_player: Option<PlayerNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheriff: Option<PlayerNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thief_chosen_role: Option<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prejudiced_manipulator_target_group: Option<ManipulatorGroup>,

    /// Set once a winner has been declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<WinResult>,

    #[serde(default)]
    next_event_seq: u64,
}

impl GameState {
    /// Create a fresh game from the setup screen's choices
    ///
    /// The setup is not validated here: the roster may still be edited.
    /// `start_game` refuses to run until the slot invariant holds.
    pub fn configure(
        player_count: u32,
        selected_roles: Vec<Role>,
        unused_roles: Option<[Role; 2]>,
    ) -> Self {
        let setup = GameSetup {
            player_count,
            selected_roles,
            unused_roles,
        };
        GameState::from_setup(setup)
    }

    pub fn from_setup(setup: GameSetup) -> Self {
        let players = (1..=setup.player_count)
            .map(|n| Player::new(PlayerNumber::new(n)))
            .collect();

        let mut state = GameState {
            setup,
            phase: GamePhase::Setup,
            players,
            night: NightState::default(),
            day: DayState::default(),
            game_events: Vec::new(),
            cupid_lovers: None,
            wild_child_role_model: None,
            wild_child_transformed: false,
            cursed_wolf_father_infected_player: None,
            sheriff: None,
            thief_chosen_role: None,
            prejudiced_manipulator_target_group: None,
            winner: None,
            next_event_seq: 0,
        };
        state.log_event(
            EventCategory::Setup,
            format!(
                "Game configured for {} players with {} roles",
                state.setup.player_count,
                state.setup.selected_roles.len()
            ),
        );
        state
    }

    /// Same setup and names, everything else back to the beginning
    pub fn restarted(&self) -> Self {
        let mut fresh = GameState::from_setup(self.setup.clone());
        for (fresh_player, old) in fresh.players.iter_mut().zip(&self.players) {
            fresh_player.name = old.name.clone();
        }
        fresh
    }

    /// Append a narration entry stamped with the current night
    pub fn log_event(&mut self, category: EventCategory, description: impl Into<String>) {
        self.game_events.push(GameEvent {
            night: self.night.current_night_number,
            category,
            description: description.into(),
            timestamp: self.next_event_seq,
        });
        self.next_event_seq += 1;
    }

    /// Reject mutation of a game whose roles do not fill the table
    pub fn ensure_playable(&self) -> Result<()> {
        self.setup.validate()
    }

    pub fn player_count(&self) -> u32 {
        self.setup.player_count
    }

    /// Get a player by seat number
    pub fn get_player(&self, number: PlayerNumber) -> Result<&Player> {
        let idx = self.player_idx(number)?;
        self.players
            .get(idx)
            .ok_or(NarratorError::PlayerNotFound(number.as_u32()))
    }

    /// Get a mutable player by seat number
    pub fn get_player_mut(&mut self, number: PlayerNumber) -> Result<&mut Player> {
        let idx = self.player_idx(number)?;
        self.players
            .get_mut(idx)
            .ok_or(NarratorError::PlayerNotFound(number.as_u32()))
    }

    fn player_idx(&self, number: PlayerNumber) -> Result<usize> {
        let n = number.as_u32();
        if n == 0 || n > self.setup.player_count {
            return Err(NarratorError::PlayerNotFound(n));
        }
        Ok((n - 1) as usize)
    }

    /// Alive check that treats unknown seats as dead
    pub fn is_alive(&self, number: PlayerNumber) -> bool {
        self.get_player(number).map(|p| p.is_alive).unwrap_or(false)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// Players bound to a role by reveal or assignment
    pub fn holders(&self, role: Role) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.holds(role))
    }

    /// Players whose revealed card is this role
    pub fn revealed_holders(&self, role: Role) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .filter(move |p| p.actual_role == Some(role))
    }

    pub fn role_in_play(&self, role: Role) -> bool {
        self.setup.contains(role)
    }

    pub fn is_infected(&self, number: PlayerNumber) -> bool {
        self.cursed_wolf_father_infected_player == Some(number)
    }

    /// Fights with the werewolves whatever their card says
    pub fn is_converted(&self, player: &Player) -> bool {
        self.is_infected(player.number)
            || (self.wild_child_transformed && player.holds(Role::WildChild))
    }

    /// Other half of the lover pair, if this player is a lover
    pub fn lover_of(&self, number: PlayerNumber) -> Option<PlayerNumber> {
        let [a, b] = self.cupid_lovers?;
        if a == number {
            Some(b)
        } else if b == number {
            Some(a)
        } else {
            None
        }
    }

    /// Player name (or seat) for narration
    pub fn label(&self, number: PlayerNumber) -> String {
        self.get_player(number)
            .map(|p| p.label())
            .unwrap_or_else(|_| format!("Player {}", number))
    }

    pub fn player_names(&self) -> Vec<Option<PlayerName>> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Ended
    }
}
