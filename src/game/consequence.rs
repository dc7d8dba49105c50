//! Elimination consequence resolver
//!
//! Given a player who has just been eliminated, describe what the narrator
//! must do next. The resolver never mutates state. The caller applies the
//! described deaths and calls `resolve` again for each newly eliminated
//! player, since one consequence can set off another.

use crate::core::{PlayerNumber, Role};
use crate::game::GameState;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// Kind of cascading effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsequenceType {
    None,
    /// The surviving lover dies of heartbreak
    Lovers,
    /// The wild child's role model died; the child becomes a werewolf
    WildChildTransform,
    /// The knight's rusty sword strikes the next seat
    KnightRustySword,
    /// The hunter shoots a player of the narrator's choosing
    Hunter,
    /// Surviving siblings are told of the death
    Siblings,
}

/// What the narrator must apply after an elimination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequence {
    #[serde(rename = "type")]
    pub kind: ConsequenceType,
    pub affected_players: SmallVec<[PlayerNumber; 4]>,
    pub message: String,
    pub requires_player_selection: bool,
}

impl Consequence {
    pub fn none() -> Self {
        Consequence {
            kind: ConsequenceType::None,
            affected_players: SmallVec::new(),
            message: String::new(),
            requires_player_selection: false,
        }
    }

    fn new(
        kind: ConsequenceType,
        affected_players: SmallVec<[PlayerNumber; 4]>,
        message: String,
    ) -> Self {
        Consequence {
            kind,
            affected_players,
            message,
            requires_player_selection: false,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == ConsequenceType::None
    }

    /// Players this consequence eliminates outright (never siblings, who are only informed)
    pub fn eliminations(&self) -> &[PlayerNumber] {
        match self.kind {
            ConsequenceType::Lovers | ConsequenceType::KnightRustySword => {
                self.affected_players.as_slice()
            }
            _ => &[],
        }
    }
}

/// Resolve the consequence of `eliminated` leaving the game
///
/// Checks run in a fixed priority and the first match wins: lovers, wild
/// child, rusty sword, hunter, siblings. `eliminated_role` defaults to the
/// player's revealed card.
pub fn resolve(
    state: &GameState,
    eliminated: PlayerNumber,
    eliminated_role: Option<Role>,
) -> Consequence {
    let role = eliminated_role.or_else(|| {
        state
            .get_player(eliminated)
            .ok()
            .and_then(|p| p.actual_role)
    });

    if let Some(consequence) = lovers(state, eliminated) {
        return consequence;
    }
    if let Some(consequence) = wild_child(state, eliminated) {
        return consequence;
    }

    match role {
        Some(Role::KnightWithRustySword) => rusty_sword(state, eliminated),
        Some(Role::Hunter) => hunter(state, eliminated),
        Some(role) if role.is_sibling_group() => siblings(state, eliminated, role),
        _ => Consequence::none(),
    }
}

fn lovers(state: &GameState, eliminated: PlayerNumber) -> Option<Consequence> {
    let other = state.lover_of(eliminated)?;
    if other == eliminated || !state.is_alive(other) {
        return None;
    }
    Some(Consequence::new(
        ConsequenceType::Lovers,
        smallvec![other],
        format!(
            "{} dies of heartbreak after losing {}",
            state.label(other),
            state.label(eliminated)
        ),
    ))
}

fn wild_child(state: &GameState, eliminated: PlayerNumber) -> Option<Consequence> {
    if state.wild_child_role_model != Some(eliminated) || state.wild_child_transformed {
        return None;
    }
    let child = state
        .holders(Role::WildChild)
        .find(|p| p.is_alive && p.number != eliminated)?;
    Some(Consequence::new(
        ConsequenceType::WildChildTransform,
        smallvec![child.number],
        format!(
            "{} has lost their role model and becomes a werewolf",
            child.label()
        ),
    ))
}

fn rusty_sword(state: &GameState, eliminated: PlayerNumber) -> Consequence {
    let neighbour = eliminated.next_seat(state.player_count());
    if neighbour == eliminated || !state.is_alive(neighbour) {
        return Consequence::none();
    }
    Consequence::new(
        ConsequenceType::KnightRustySword,
        smallvec![neighbour],
        format!(
            "The rusty sword strikes {}, who dies of tetanus",
            state.label(neighbour)
        ),
    )
}

fn hunter(state: &GameState, eliminated: PlayerNumber) -> Consequence {
    let has_target = state.alive_players().any(|p| p.number != eliminated);
    if !has_target {
        return Consequence::none();
    }
    Consequence {
        kind: ConsequenceType::Hunter,
        affected_players: SmallVec::new(),
        message: format!(
            "{} was the Hunter and takes one last shot: choose a target",
            state.label(eliminated)
        ),
        requires_player_selection: true,
    }
}

fn siblings(state: &GameState, eliminated: PlayerNumber, role: Role) -> Consequence {
    let survivors: SmallVec<[PlayerNumber; 4]> = state
        .holders(role)
        .filter(|p| p.is_alive && p.number != eliminated)
        .map(|p| p.number)
        .collect();
    if survivors.is_empty() {
        return Consequence::none();
    }
    Consequence::new(
        ConsequenceType::Siblings,
        survivors,
        format!(
            "The remaining {} learn that {} has died",
            role.display_name(),
            state.label(eliminated)
        ),
    )
}
