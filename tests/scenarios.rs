//! Rules scenarios played through the public API
//!
//! Each test builds a table with the copy-on-write mutators, the way a
//! narrator front end would, and checks what the engine reports.

use wolf_narrator::core::{total_slots, ManipulatorGroup, PlayerNumber, Role, Team};
use wolf_narrator::game::{
    active_role_queue, evaluate, resolve, ConsequenceType, GamePhase, GameState, Narrator,
    NightStep, WerewolfVariant, Winner,
};
use wolf_narrator::{NarratorError, Result};

fn n(x: u32) -> PlayerNumber {
    PlayerNumber::new(x)
}

/// Configure, deal the roles in seat order and start the first night
fn table(roles: &[Role]) -> Result<GameState> {
    let mut state = GameState::configure(total_slots(roles), roles.to_vec(), None);
    let mut seat = 1;
    for role in roles {
        for _ in 0..role.slot_count() {
            state = state.set_assigned_role(n(seat), Some(*role))?;
            seat += 1;
        }
    }
    state.start_game()
}

fn kill_revealed(state: &GameState, seat: u32, role: Role) -> GameState {
    state
        .toggle_alive(n(seat))
        .and_then(|s| s.set_revealed_role(n(seat), role))
        .unwrap()
}

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

#[test]
fn slot_invariant_gates_the_game() {
    let roles = vec![Role::TwoSisters, Role::ThreeBrothers, Role::SimpleWerewolf];
    assert_eq!(total_slots(&roles), 6);
    assert!(GameState::configure(6, roles.clone(), None).start_game().is_ok());

    let short = GameState::configure(7, roles, None);
    assert!(matches!(short.start_game(), Err(NarratorError::InvalidSetup(_))));
    assert!(short.toggle_alive(n(1)).is_err());
}

#[test]
fn unknown_seat_is_rejected() {
    let state = table(&village_sweep_roles()).unwrap();
    assert!(matches!(
        state.set_revealed_role(n(9), Role::Seer),
        Err(NarratorError::PlayerNotFound(9))
    ));
    // Queries stay total
    assert!(resolve(&state, n(9), None).is_none());
}

#[test]
fn village_sweep() {
    let mut state = table(&village_sweep_roles()).unwrap();
    state = kill_revealed(&state, 6, Role::SimpleWerewolf);
    state = kill_revealed(&state, 7, Role::SimpleWerewolf);
    assert!(!evaluate(&state).has_winner);

    state = kill_revealed(&state, 8, Role::BigBadWolf);
    let result = evaluate(&state);
    assert!(result.has_winner);
    assert_eq!(result.winner, Some(Winner::Village));
    assert_eq!(evaluate(&state), result);
}

#[test]
fn infection_blocks_village_win() {
    let roles = vec![
        Role::Villager,
        Role::Seer,
        Role::Witch,
        Role::Hunter,
        Role::Villager,
        Role::SimpleWerewolf,
        Role::SimpleWerewolf,
        Role::CursedWolfFather,
    ];
    let mut state = table(&roles).unwrap();
    state = state
        .select_werewolf_victim(n(1), WerewolfVariant::Pack)
        .unwrap()
        .use_infection(n(1))
        .unwrap();

    state = kill_revealed(&state, 6, Role::SimpleWerewolf);
    state = kill_revealed(&state, 7, Role::SimpleWerewolf);
    assert!(!evaluate(&state).has_winner);

    state = kill_revealed(&state, 8, Role::CursedWolfFather);
    assert!(!evaluate(&state).has_winner);

    state = kill_revealed(&state, 1, Role::Villager);
    assert_eq!(evaluate(&state).winner, Some(Winner::Village));
}

#[test]
fn lovers_cascade_into_hunter() {
    let roles = vec![
        Role::Cupid,
        Role::Hunter,
        Role::Seer,
        Role::Villager,
        Role::Villager,
        Role::SimpleWerewolf,
        Role::Villager,
        Role::SimpleWerewolf,
    ];
    let state = table(&roles)
        .unwrap()
        .set_cupid_lovers(n(2), n(7))
        .unwrap();
    let state = kill_revealed(&state, 7, Role::Villager);

    let first = resolve(&state, n(7), Some(Role::Villager));
    assert_eq!(first.kind, ConsequenceType::Lovers);
    assert_eq!(first.affected_players.as_slice(), &[n(2)]);

    let state = state
        .apply_consequence(&first, None)
        .and_then(|s| s.set_revealed_role(n(2), Role::Hunter))
        .unwrap();
    assert!(!state.is_alive(n(2)));

    let second = resolve(&state, n(2), Some(Role::Hunter));
    assert_eq!(second.kind, ConsequenceType::Hunter);
    assert!(second.requires_player_selection);
    assert!(second.affected_players.is_empty());
}

#[test]
fn knight_and_wild_child_priority() {
    let roles = vec![
        Role::WildChild,
        Role::KnightWithRustySword,
        Role::Seer,
        Role::Villager,
        Role::Villager,
        Role::Villager,
        Role::SimpleWerewolf,
        Role::KnightWithRustySword,
    ];
    let state = table(&roles).unwrap();

    let wrap = resolve(&state, n(8), Some(Role::KnightWithRustySword));
    assert_eq!(wrap.kind, ConsequenceType::KnightRustySword);
    assert_eq!(wrap.affected_players.as_slice(), &[n(1)]);

    let state = state.set_wild_child_role_model(n(2)).unwrap();
    let model = resolve(&state, n(2), Some(Role::KnightWithRustySword));
    assert_eq!(model.kind, ConsequenceType::WildChildTransform);
    assert_eq!(model.affected_players.as_slice(), &[n(1)]);

    let state = state.apply_consequence(&model, None).unwrap();
    assert!(state.wild_child_transformed);
    assert!(state.is_werewolf_side(n(1)));
}

#[test]
fn siblings_get_informed() {
    let roles = vec![Role::ThreeBrothers, Role::Seer, Role::SimpleWerewolf];
    let state = table(&roles).unwrap();
    let state = kill_revealed(&state, 1, Role::ThreeBrothers);
    let state = kill_revealed(&state, 2, Role::ThreeBrothers);

    let notice = resolve(&state, n(2), Some(Role::ThreeBrothers));
    assert_eq!(notice.kind, ConsequenceType::Siblings);
    assert_eq!(notice.affected_players.as_slice(), &[n(3)]);

    // Informational only: nobody dies
    let after = state.apply_consequence(&notice, None).unwrap();
    assert!(after.is_alive(n(3)));
}

#[test]
fn white_werewolf_exclusivity() {
    let roles = vec![
        Role::WhiteWerewolf,
        Role::SimpleWerewolf,
        Role::SimpleWerewolf,
        Role::Villager,
        Role::Seer,
    ];
    let state = table(&roles).unwrap();
    let state = kill_revealed(&state, 2, Role::SimpleWerewolf);
    assert!(!evaluate(&state).has_winner);

    let state = kill_revealed(&state, 3, Role::SimpleWerewolf);
    let result = evaluate(&state);
    assert_eq!(result.winner, Some(Winner::Solo));
    assert_eq!(result.solo_role, Some(Role::WhiteWerewolf));
}

#[test]
fn wolf_hound_allegiance_moves_a_slot() {
    let roles = vec![Role::WolfHound, Role::Seer, Role::Villager, Role::SimpleWerewolf];
    let state = table(&roles)
        .unwrap()
        .set_wolf_hound_team(Team::Werewolf)
        .unwrap();
    let state = kill_revealed(&state, 4, Role::SimpleWerewolf);
    assert!(!evaluate(&state).has_winner);

    let state = kill_revealed(&state, 1, Role::WolfHound);
    assert_eq!(evaluate(&state).winner, Some(Winner::Village));
}

#[test]
fn prejudiced_manipulator_target_group() {
    let roles = vec![
        Role::PrejudicedManipulator,
        Role::Villager,
        Role::Seer,
        Role::Villager,
        Role::SimpleWerewolf,
    ];
    let state = table(&roles)
        .unwrap()
        .set_prejudiced_manipulator_group(n(4), ManipulatorGroup::A)
        .unwrap()
        .set_prejudiced_manipulator_target(ManipulatorGroup::B)
        .unwrap();
    // Seat 4 moved over, leaving seat 2 alone in group B
    let state = kill_revealed(&state, 4, Role::Villager);
    assert!(!evaluate(&state).has_winner);
    let state = kill_revealed(&state, 2, Role::Villager);
    let result = evaluate(&state);
    assert_eq!(result.solo_role, Some(Role::PrejudicedManipulator));
}

#[test]
fn night_queue_walkthrough() {
    let roles = vec![
        Role::Witch,
        Role::Cupid,
        Role::Seer,
        Role::WhiteWerewolf,
        Role::SimpleWerewolf,
        Role::Villager,
    ];
    let mut state = table(&roles).unwrap();
    assert_eq!(
        state.night.active_roles.as_slice(),
        &[Role::Cupid, Role::Seer, Role::SimpleWerewolf, Role::Witch]
    );
    assert_eq!(state.night.step(), NightStep::AwaitingStart);

    for expected in [Role::Cupid, Role::Seer, Role::SimpleWerewolf, Role::Witch] {
        state = state.advance_night_step().unwrap();
        assert_eq!(state.night.active_role(), Some(expected));
    }
    state = state.advance_night_step().unwrap();
    assert_eq!(state.night.step(), NightStep::NightComplete);

    let (state, _) = state.start_dawn().unwrap();
    let state = state.start_day().unwrap().start_night().unwrap();
    assert_eq!(state.night.current_night_number, 2);
    assert!(state.night.white_werewolf_night);
    let queue = active_role_queue(&state);
    assert!(queue.contains(&Role::WhiteWerewolf));
    assert!(!queue.contains(&Role::Cupid));
    assert_eq!(state.night.active_roles, queue);
}

#[test]
fn stale_snapshots_stay_valid() {
    let start = table(&village_sweep_roles()).unwrap();
    let later = kill_revealed(&start, 3, Role::Hunter);
    assert!(start.is_alive(n(3)));
    assert_eq!(start.players[2].actual_role, None);
    assert!(!later.is_alive(n(3)));
}

#[test]
fn narrator_session_ends_the_game() {
    let state = GameState::configure(3, vec![Role::Seer, Role::Villager, Role::SimpleWerewolf], None);
    let mut narrator = Narrator::new(state);
    narrator.logger_mut().enable_capture();
    narrator.apply("start_game", |s| s.start_game()).unwrap();

    let consequence = narrator.eliminate(n(3), Some(Role::SimpleWerewolf)).unwrap();
    narrator
        .resolve_chain(consequence, |_, _| None, |_, _| None)
        .unwrap();

    assert_eq!(narrator.state().phase, GamePhase::Ended);
    assert_eq!(
        narrator.state().winner.as_ref().and_then(|w| w.winner),
        Some(Winner::Village)
    );
}

#[test]
fn pack_sleeps_once_revealed_wolves_are_dead() {
    let roles = vec![
        Role::SimpleWerewolf,
        Role::SimpleWerewolf,
        Role::Seer,
        Role::Villager,
    ];
    let state = table(&roles).unwrap();
    let state = kill_revealed(&state, 1, Role::SimpleWerewolf);
    let state = state.start_dawn().and_then(|(s, _)| s.start_night()).unwrap();
    assert_eq!(state.night.active_roles.as_slice(), &[Role::Seer]);
}

#[test]
fn angel_killed_before_reveal_wins() {
    let roles = vec![Role::Angel, Role::SimpleWerewolf, Role::Villager, Role::Seer];
    let state = table(&roles).unwrap().toggle_alive(n(1)).unwrap();
    let result = evaluate(&state);
    assert!(result.has_winner);
    assert_eq!(result.winner, Some(Winner::Solo));
    assert_eq!(result.solo_role, Some(Role::Angel));
}
