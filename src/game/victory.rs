//! Win condition evaluator
//!
//! Inspects a snapshot and decides whether the game is over and for whom.
//! Pure and idempotent: evaluating an unchanged snapshot twice gives the
//! same answer, so callers may run it after every mutation.

use crate::core::{Player, Role, Team};
use crate::game::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Winning side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Winner {
    Village,
    Werewolves,
    Solo,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Village => write!(f, "village"),
            Winner::Werewolves => write!(f, "werewolves"),
            Winner::Solo => write!(f, "solo"),
        }
    }
}

/// Outcome of a win check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinResult {
    pub has_winner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    /// Which solo role won, when `winner` is `Solo`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solo_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WinResult {
    pub fn no_winner() -> Self {
        WinResult {
            has_winner: false,
            winner: None,
            solo_role: None,
            message: None,
        }
    }

    pub(crate) fn team(winner: Winner, message: &str) -> Self {
        WinResult {
            has_winner: true,
            winner: Some(winner),
            solo_role: None,
            message: Some(message.to_string()),
        }
    }

    fn solo(role: Role, message: String) -> Self {
        WinResult {
            has_winner: true,
            winner: Some(Winner::Solo),
            solo_role: Some(role),
            message: Some(message),
        }
    }
}

/// Seats (or deaths) per team; solo roles are counted in neither
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamCounts {
    pub village: u32,
    pub werewolf: u32,
}

impl TeamCounts {
    fn add(&mut self, team: Team) {
        match team {
            Team::Village => self.village += 1,
            Team::Werewolf => self.werewolf += 1,
            Team::Solo => {}
        }
    }

    /// One village seat now fights for the wolves
    fn convert_one(&mut self) {
        self.village = self.village.saturating_sub(1);
        self.werewolf += 1;
    }
}

/// Team sizes from the setup, adjusted for allegiance choices and conversions
pub fn team_totals(state: &GameState) -> TeamCounts {
    let mut totals = TeamCounts::default();
    for role in &state.setup.selected_roles {
        for _ in 0..role.slot_count() {
            totals.add(role.team());
        }
    }

    let hound_joined_wolves = state.role_in_play(Role::WolfHound)
        && state
            .holders(Role::WolfHound)
            .any(|p| p.wolf_hound_team == Some(Team::Werewolf));
    if hound_joined_wolves {
        totals.convert_one();
    }
    if state.cursed_wolf_father_infected_player.is_some() {
        totals.convert_one();
    }
    if state.wild_child_transformed && state.role_in_play(Role::WildChild) {
        totals.convert_one();
    }
    totals
}

/// Team a revealed dead player is counted against
fn death_team(state: &GameState, player: &Player, role: Role) -> Team {
    if state.is_converted(player) {
        return Team::Werewolf;
    }
    if role == Role::WolfHound {
        return player.wolf_hound_team.unwrap_or(Team::Village);
    }
    role.team()
}

/// Deaths per team, counting only players whose card has been revealed
pub fn dead_tallies(state: &GameState) -> TeamCounts {
    let mut dead = TeamCounts::default();
    for player in state.players.iter().filter(|p| !p.is_alive) {
        if let Some(role) = player.actual_role {
            dead.add(death_team(state, player, role));
        }
    }
    dead
}

/// Decide whether the game is over
pub fn evaluate(state: &GameState) -> WinResult {
    let totals = team_totals(state);
    let dead = dead_tallies(state);

    if let Some(result) = angel_win(state) {
        return result;
    }
    if let Some(result) = manipulator_win(state) {
        return result;
    }
    if let Some(result) = white_werewolf_win(state, totals, dead) {
        return result;
    }

    if dead.werewolf > 0 && dead.werewolf >= totals.werewolf {
        return WinResult::team(
            Winner::Village,
            "The village has eliminated every werewolf!",
        );
    }
    if dead.village > 0 && dead.village >= totals.village {
        return WinResult::team(
            Winner::Werewolves,
            "The werewolves have devoured the village!",
        );
    }
    WinResult::no_winner()
}

/// Holder is alive unless someone has been revealed dead with the card
fn revealed_dead(state: &GameState, role: Role) -> bool {
    state.revealed_holders(role).any(|p| !p.is_alive)
}

fn angel_win(state: &GameState) -> Option<WinResult> {
    if !state.role_in_play(Role::Angel) || state.night.current_night_number > 2 {
        return None;
    }
    let angel = state.holders(Role::Angel).find(|p| !p.is_alive)?;
    Some(WinResult::solo(
        Role::Angel,
        format!("{} was the Angel and wins by being eliminated early!", angel.label()),
    ))
}

fn manipulator_win(state: &GameState) -> Option<WinResult> {
    if !state.role_in_play(Role::PrejudicedManipulator) {
        return None;
    }
    let target = state.prejudiced_manipulator_target_group?;
    let holder_alive = state
        .holders(Role::PrejudicedManipulator)
        .next()
        .map(|p| p.is_alive)
        .unwrap_or(true);
    if !holder_alive {
        return None;
    }

    let mut group = state
        .players
        .iter()
        .filter(|p| p.prejudiced_manipulator_group == target)
        .peekable();
    group.peek()?;
    if group.all(|p| !p.is_alive) {
        Some(WinResult::solo(
            Role::PrejudicedManipulator,
            format!(
                "Group {} has been wiped out: the Prejudiced Manipulator wins!",
                target
            ),
        ))
    } else {
        None
    }
}

fn white_werewolf_win(state: &GameState, totals: TeamCounts, dead: TeamCounts) -> Option<WinResult> {
    if !state.role_in_play(Role::WhiteWerewolf) || revealed_dead(state, Role::WhiteWerewolf) {
        return None;
    }
    let other_wolves_gone = dead.werewolf > 0 && dead.werewolf >= totals.werewolf;
    let village_survives = dead.village < totals.village;
    if other_wolves_gone && village_survives {
        Some(WinResult::solo(
            Role::WhiteWerewolf,
            "The White Werewolf has betrayed the pack and wins alone!".to_string(),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ManipulatorGroup, PlayerNumber};

    fn village_sweep_roles() -> Vec<Role> {
        vec![
            Role::Seer,
            Role::Witch,
            Role::Hunter,
            Role::Villager,
            Role::Villager,
            Role::SimpleWerewolf,
            Role::SimpleWerewolf,
            Role::BigBadWolf,
        ]
    }

    fn kill(state: &mut GameState, number: u32, role: Role) {
        let player = &mut state.players[(number - 1) as usize];
        player.is_alive = false;
        player.actual_role = Some(role);
    }

    #[test]
    fn test_no_deaths_no_winner() {
        let state = GameState::configure(8, village_sweep_roles(), None);
        assert_eq!(evaluate(&state), WinResult::no_winner());
    }

    #[test]
    fn test_empty_setup_no_winner() {
        let state = GameState::configure(0, Vec::new(), None);
        assert!(!evaluate(&state).has_winner);
    }

    #[test]
    fn test_team_totals_expand_siblings() {
        let state = GameState::configure(
            7,
            vec![
                Role::ThreeBrothers,
                Role::TwoSisters,
                Role::SimpleWerewolf,
                Role::Angel,
            ],
            None,
        );
        let totals = team_totals(&state);
        assert_eq!(totals, TeamCounts { village: 5, werewolf: 1 });
    }

    #[test]
    fn test_village_sweep() {
        let mut state = GameState::configure(8, village_sweep_roles(), None);
        kill(&mut state, 6, Role::SimpleWerewolf);
        kill(&mut state, 7, Role::SimpleWerewolf);
        assert!(!evaluate(&state).has_winner);

        kill(&mut state, 8, Role::BigBadWolf);
        let result = evaluate(&state);
        assert!(result.has_winner);
        assert_eq!(result.winner, Some(Winner::Village));
    }

    #[test]
    fn test_werewolves_win() {
        let mut state = GameState::configure(8, village_sweep_roles(), None);
        kill(&mut state, 1, Role::Seer);
        kill(&mut state, 2, Role::Witch);
        kill(&mut state, 3, Role::Hunter);
        kill(&mut state, 4, Role::Villager);
        assert!(!evaluate(&state).has_winner);
        kill(&mut state, 5, Role::Villager);
        assert_eq!(evaluate(&state).winner, Some(Winner::Werewolves));
    }

    #[test]
    fn test_unrevealed_deaths_do_not_count() {
        let mut state = GameState::configure(8, village_sweep_roles(), None);
        for i in 5..8 {
            state.players[i].is_alive = false;
        }
        assert!(!evaluate(&state).has_winner);
    }

    #[test]
    fn test_infection_blocks_village_win() {
        let mut roles = village_sweep_roles();
        roles[7] = Role::CursedWolfFather;
        let mut state = GameState::configure(8, roles, None);
        state.players[0].assigned_role = Some(Role::Villager);
        state.cursed_wolf_father_infected_player = Some(PlayerNumber::new(1));

        kill(&mut state, 6, Role::SimpleWerewolf);
        kill(&mut state, 7, Role::SimpleWerewolf);
        assert!(!evaluate(&state).has_winner);

        kill(&mut state, 8, Role::CursedWolfFather);
        assert!(!evaluate(&state).has_winner);

        // The infected villager's death counts against the wolves
        kill(&mut state, 1, Role::Villager);
        assert_eq!(evaluate(&state).winner, Some(Winner::Village));
    }

    #[test]
    fn test_wolf_hound_allegiance_moves_a_slot() {
        let mut state = GameState::configure(
            4,
            vec![Role::WolfHound, Role::Villager, Role::Seer, Role::SimpleWerewolf],
            None,
        );
        assert_eq!(team_totals(&state), TeamCounts { village: 3, werewolf: 1 });

        state.players[0].assigned_role = Some(Role::WolfHound);
        state.players[0].wolf_hound_team = Some(Team::Werewolf);
        assert_eq!(team_totals(&state), TeamCounts { village: 2, werewolf: 2 });

        kill(&mut state, 4, Role::SimpleWerewolf);
        assert!(!evaluate(&state).has_winner);
        kill(&mut state, 1, Role::WolfHound);
        assert_eq!(evaluate(&state).winner, Some(Winner::Village));
    }

    #[test]
    fn test_white_werewolf_exclusivity() {
        let mut state = GameState::configure(
            6,
            vec![
                Role::WhiteWerewolf,
                Role::SimpleWerewolf,
                Role::SimpleWerewolf,
                Role::Villager,
                Role::Villager,
                Role::Seer,
            ],
            None,
        );
        kill(&mut state, 2, Role::SimpleWerewolf);
        assert!(!evaluate(&state).has_winner);

        kill(&mut state, 3, Role::SimpleWerewolf);
        let result = evaluate(&state);
        assert_eq!(result.winner, Some(Winner::Solo));
        assert_eq!(result.solo_role, Some(Role::WhiteWerewolf));
    }

    #[test]
    fn test_dead_white_werewolf_lets_village_win() {
        let mut state = GameState::configure(
            4,
            vec![Role::WhiteWerewolf, Role::SimpleWerewolf, Role::Villager, Role::Seer],
            None,
        );
        kill(&mut state, 1, Role::WhiteWerewolf);
        kill(&mut state, 2, Role::SimpleWerewolf);
        assert_eq!(evaluate(&state).winner, Some(Winner::Village));
    }

    #[test]
    fn test_angel_early_win() {
        let mut state = GameState::configure(
            4,
            vec![Role::Angel, Role::SimpleWerewolf, Role::Villager, Role::Seer],
            None,
        );
        state.night.current_night_number = 1;
        kill(&mut state, 1, Role::Angel);
        let result = evaluate(&state);
        assert_eq!(result.winner, Some(Winner::Solo));
        assert_eq!(result.solo_role, Some(Role::Angel));

        state.night.current_night_number = 3;
        assert!(!evaluate(&state).has_winner);
    }

    #[test]
    fn test_unrevealed_angel_death_wins() {
        let state = GameState::configure(
            4,
            vec![Role::Angel, Role::SimpleWerewolf, Role::Villager, Role::Seer],
            None,
        )
        .set_assigned_role(PlayerNumber::new(1), Some(Role::Angel))
        .and_then(|s| s.start_game())
        .and_then(|s| s.toggle_alive(PlayerNumber::new(1)))
        .unwrap();
        assert_eq!(state.players[0].actual_role, None);

        let result = evaluate(&state);
        assert!(result.has_winner);
        assert_eq!(result.solo_role, Some(Role::Angel));
    }

    #[test]
    fn test_manipulator_target_group() {
        let mut state = GameState::configure(
            5,
            vec![
                Role::PrejudicedManipulator,
                Role::SimpleWerewolf,
                Role::Villager,
                Role::Villager,
                Role::Seer,
            ],
            None,
        );
        state.players[0].assigned_role = Some(Role::PrejudicedManipulator);
        for player in state.players.iter_mut() {
            player.prejudiced_manipulator_group = ManipulatorGroup::A;
        }
        state.players[1].prejudiced_manipulator_group = ManipulatorGroup::B;
        state.players[2].prejudiced_manipulator_group = ManipulatorGroup::B;
        state.prejudiced_manipulator_target_group = Some(ManipulatorGroup::B);

        state.players[1].is_alive = false;
        assert!(!evaluate(&state).has_winner);
        state.players[2].is_alive = false;
        let result = evaluate(&state);
        assert_eq!(result.solo_role, Some(Role::PrejudicedManipulator));

        state.players[0].is_alive = false;
        assert!(!evaluate(&state).has_winner);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut state = GameState::configure(8, village_sweep_roles(), None);
        kill(&mut state, 6, Role::SimpleWerewolf);
        let first = evaluate(&state);
        let second = evaluate(&state);
        assert_eq!(first, second);
    }
}
