//! Night sequencer: which roles wake tonight, and in what order
//!
//! The queue is computed once per night from the current snapshot and then
//! stored in `NightState`, so decisions taken during the night (an
//! infection, a potion) never reshuffle the roles still waiting to wake.

use crate::core::{Role, Team};
use crate::game::phase::NightStep;
use crate::game::GameState;
use smallvec::SmallVec;

/// Ordered roles that must act during the current night
pub fn active_role_queue(state: &GameState) -> SmallVec<[Role; 16]> {
    let night = state.night.current_night_number.max(1);
    Role::night_sequence(night)
        .into_iter()
        .filter(|role| state.role_in_play(*role))
        .filter(|role| wakes_tonight(state, *role))
        .collect()
}

/// Per-role filtering for a role that is in play and scheduled tonight
fn wakes_tonight(state: &GameState, role: Role) -> bool {
    if role.alternate_nights() && !state.night.white_werewolf_night {
        return false;
    }
    if role == Role::CursedWolfFather && state.night.infection_used {
        return false;
    }
    if !still_held(state, role) {
        return false;
    }
    !held_only_by_convert(state, role)
}

/// A role nobody has been revealed as is assumed live. Once revealed, it
/// drops out when every player shown holding it is dead.
fn still_held(state: &GameState, role: Role) -> bool {
    let mut revealed = 0u32;
    let mut revealed_dead = 0u32;
    for player in state.revealed_holders(role) {
        revealed += 1;
        if !player.is_alive {
            revealed_dead += 1;
        }
    }
    revealed == 0 || revealed_dead < revealed
}

/// A converted player no longer uses their original village power;
/// they hunt with the wolves instead.
fn held_only_by_convert(state: &GameState, role: Role) -> bool {
    if role.team() == Team::Werewolf || state.setup.copies(role) != 1 {
        return false;
    }
    state
        .holders(role)
        .any(|player| state.is_converted(player))
}

/// Sequencer position for the stored queue
pub fn current_step(state: &GameState) -> NightStep {
    state.night.step()
}
