//! Automated games
//!
//! Deals the cards, then plays night after night through a narrator
//! session, asking a controller for every decision the table would take.

use crate::core::{ManipulatorGroup, PlayerNumber, Role, Team};
use crate::game::controller::{Decision, NarratorController};
use crate::game::narrator::Narrator;
use crate::game::phase::WerewolfVariant;
use crate::game::victory::WinResult;
use crate::game::GameState;
use crate::Result;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Why an automated game stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEndReason {
    Victory,
    /// Reached the round limit without a winner
    RoundLimit,
    /// Nobody left to vote for
    Stalemate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoPlayResult {
    pub winner: Option<WinResult>,
    pub nights_played: u32,
    pub end_reason: GameEndReason,
}

/// Deal the setup's cards to the seats in a shuffled order
///
/// Sibling groups expand to one card per seat.
pub fn deal_roles<R: rand::Rng>(state: &GameState, rng: &mut R) -> Result<GameState> {
    state.ensure_playable()?;
    let mut deck: Vec<Role> = state
        .setup
        .selected_roles
        .iter()
        .flat_map(|role| std::iter::repeat(*role).take(role.slot_count() as usize))
        .collect();
    deck.shuffle(rng);

    let mut next = state.clone();
    for (seat, role) in deck.into_iter().enumerate() {
        next = next.set_assigned_role(PlayerNumber::new(seat as u32 + 1), Some(role))?;
    }
    Ok(next)
}

pub struct AutoPlayer<'a> {
    narrator: &'a mut Narrator,
    controller: &'a mut dyn NarratorController,
    dealer: Xoshiro256PlusPlus,
    max_rounds: u32,
}

impl<'a> AutoPlayer<'a> {
    pub fn new(
        narrator: &'a mut Narrator,
        controller: &'a mut dyn NarratorController,
        seed: u64,
    ) -> Self {
        AutoPlayer {
            narrator,
            controller,
            dealer: Xoshiro256PlusPlus::seed_from_u64(seed),
            max_rounds: 50,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Play until a winner, a stalemate or the round limit
    pub fn run(&mut self) -> Result<AutoPlayResult> {
        if self.narrator.state().phase == crate::game::GamePhase::Setup {
            self.setup()?;
        }

        let end_reason = loop {
            if self.narrator.state().is_over() {
                break GameEndReason::Victory;
            }
            if self.narrator.state().night.current_night_number > self.max_rounds {
                break GameEndReason::RoundLimit;
            }

            self.play_night()?;
            let report = self.narrator.start_dawn()?;
            for victim in report.deaths {
                self.eliminate(victim)?;
                if self.narrator.state().is_over() {
                    break;
                }
            }
            if self.narrator.state().is_over() {
                continue;
            }

            self.narrator.apply("start_day", |s| s.start_day())?;
            if !self.play_day()? {
                break GameEndReason::Stalemate;
            }
            if self.narrator.state().is_over() {
                continue;
            }
            self.narrator.apply("start_night", |s| s.start_night())?;
        };

        let state = self.narrator.state();
        Ok(AutoPlayResult {
            winner: state.winner.clone(),
            nights_played: state.night.current_night_number,
            end_reason,
        })
    }

    fn setup(&mut self) -> Result<()> {
        let dealt = deal_roles(self.narrator.state(), &mut self.dealer)?;
        self.narrator.apply("deal", move |_| Ok(dealt))?;

        if self.narrator.state().role_in_play(Role::PrejudicedManipulator) {
            let group = match self.option(2) {
                0 => ManipulatorGroup::A,
                _ => ManipulatorGroup::B,
            };
            self.narrator
                .apply("manipulator target", |s| s.set_prejudiced_manipulator_target(group))?;
        }
        self.narrator.apply("start_game", |s| s.start_game())
    }

    /// Ask the controller, keeping it honest: an answer outside the
    /// candidates is ignored, and mandatory decisions always get a player
    fn pick(&mut self, decision: Decision, candidates: &[PlayerNumber]) -> Option<PlayerNumber> {
        let choice = self
            .controller
            .choose_player(self.narrator.state(), decision, candidates)
            .filter(|c| candidates.contains(c));
        let choice = match choice {
            None if !decision.is_optional() => candidates.first().copied(),
            other => other,
        };
        if let Some(player) = choice {
            self.narrator
                .logger()
                .controller_choice(&format!("{:?}: chose {}", decision, player));
        }
        choice
    }

    fn option(&mut self, count: usize) -> usize {
        let index = self
            .controller
            .choose_option(self.narrator.state(), Decision::Option, count);
        if index < count {
            index
        } else {
            0
        }
    }

    fn alive_where<F>(&self, keep: F) -> Vec<PlayerNumber>
    where
        F: Fn(&GameState, PlayerNumber) -> bool,
    {
        let state = self.narrator.state();
        state
            .alive_players()
            .map(|p| p.number)
            .filter(|n| keep(state, *n))
            .collect()
    }

    fn holder(&self, role: Role) -> Option<PlayerNumber> {
        self.narrator.state().holders(role).next().map(|p| p.number)
    }

    fn play_night(&mut self) -> Result<()> {
        self.narrator.mark_checkpoint();
        loop {
            self.narrator
                .apply("advance_night_step", |s| s.advance_night_step())?;
            match self.narrator.state().night.active_role() {
                Some(role) => self.act(role)?,
                None => return Ok(()),
            }
        }
    }

    fn act(&mut self, role: Role) -> Result<()> {
        let holder = self.holder(role);
        let not_self = |_: &GameState, n: PlayerNumber| Some(n) != holder;
        match role {
            Role::Thief => {
                let unused = self.narrator.state().setup.unused_roles;
                if let Some(unused) = unused {
                    let card = unused.get(self.option(3)).copied();
                    self.narrator
                        .apply("thief", |s| s.set_thief_chosen_role(card))?;
                }
            }
            Role::Cupid => {
                let everyone = self.alive_where(|_, _| true);
                if let Some(first) = self.pick(Decision::CupidLover, &everyone) {
                    let rest: Vec<_> = everyone.into_iter().filter(|n| *n != first).collect();
                    if let Some(second) = self.pick(Decision::CupidLover, &rest) {
                        self.narrator
                            .apply("cupid", |s| s.set_cupid_lovers(first, second))?;
                    }
                }
            }
            Role::WildChild => {
                let candidates = self.alive_where(not_self);
                if let Some(model) = self.pick(Decision::RoleModel, &candidates) {
                    self.narrator
                        .apply("role model", |s| s.set_wild_child_role_model(model))?;
                }
            }
            Role::WolfHound => {
                let team = match self.option(2) {
                    0 => Team::Village,
                    _ => Team::Werewolf,
                };
                self.narrator
                    .apply("wolf-hound", |s| s.set_wolf_hound_team(team))?;
            }
            Role::Fox => {
                if !self.narrator.state().night.fox_power_lost {
                    let candidates = self.alive_where(|_, _| true);
                    if let Some(center) = self.pick(Decision::FoxSniff, &candidates) {
                        self.narrator.apply("fox", |s| {
                            s.use_fox_sniff(center).map(|(next, _)| next)
                        })?;
                    }
                }
            }
            Role::Seer => {
                let candidates = self.alive_where(not_self);
                if let Some(target) = self.pick(Decision::SeerLook, &candidates) {
                    let seen = self
                        .narrator
                        .state()
                        .get_player(target)?
                        .role()
                        .map(|r| r.display_name())
                        .unwrap_or("an unknown role");
                    self.narrator
                        .logger()
                        .controller_choice(&format!("The Seer sees {}", seen));
                }
            }
            Role::Defender => {
                let last = self.narrator.state().night.defender_last_protected;
                let candidates = self.alive_where(|_, n| Some(n) != last);
                if let Some(target) = self.pick(Decision::Protect, &candidates) {
                    self.narrator
                        .apply("defender", |s| s.protect_player(target))?;
                }
            }
            Role::SimpleWerewolf => {
                let candidates = self.alive_where(|s, n| !s.is_werewolf_side(n));
                self.attack(WerewolfVariant::Pack, &candidates)?;
            }
            Role::BigBadWolf => {
                let state = self.narrator.state();
                let wolf_lost = state
                    .players
                    .iter()
                    .any(|p| !p.is_alive && state.is_werewolf_side(p.number));
                if !wolf_lost {
                    let pack = state.night.tonight.pack_victim;
                    let candidates =
                        self.alive_where(|s, n| !s.is_werewolf_side(n) && Some(n) != pack);
                    self.attack(WerewolfVariant::BigBadWolf, &candidates)?;
                }
            }
            Role::CursedWolfFather => {
                let state = self.narrator.state();
                if let (false, Some(victim)) =
                    (state.night.infection_used, state.night.tonight.pack_victim)
                {
                    if self.pick(Decision::Infect, &[victim]).is_some() {
                        self.narrator
                            .apply("infection", |s| s.use_infection(victim))?;
                    }
                }
            }
            Role::WhiteWerewolf => {
                let candidates = self.alive_where(|s, n| s.is_werewolf_side(n) && Some(n) != holder);
                self.attack(WerewolfVariant::WhiteWerewolf, &candidates)?;
            }
            Role::Witch => self.witch(holder)?,
            _ => {}
        }
        Ok(())
    }

    fn attack(&mut self, variant: WerewolfVariant, candidates: &[PlayerNumber]) -> Result<()> {
        if let Some(victim) = self.pick(Decision::WerewolfVictim(variant), candidates) {
            self.narrator
                .apply("werewolf victim", |s| s.select_werewolf_victim(victim, variant))?;
        }
        Ok(())
    }

    fn witch(&mut self, witch: Option<PlayerNumber>) -> Result<()> {
        let night = &self.narrator.state().night;
        let (heal_left, poison_left) = (!night.healing_potion_used, !night.poison_potion_used);
        let victim = night.tonight.pack_victim;

        if let (true, Some(victim)) = (heal_left, victim) {
            if self.pick(Decision::Heal, &[victim]).is_some() {
                return self
                    .narrator
                    .apply("heal", |s| s.use_healing_potion(victim));
            }
        }
        if poison_left {
            let candidates = self.alive_where(|_, n| Some(n) != witch);
            if let Some(target) = self.pick(Decision::Poison, &candidates) {
                self.narrator.apply("poison", |s| s.use_poison_potion(target))?;
            }
        }
        Ok(())
    }

    /// Returns false when nobody is left to vote for
    fn play_day(&mut self) -> Result<bool> {
        let state = self.narrator.state();
        if state.day.current_day_number == 1 && state.sheriff.is_none() {
            let candidates = self.alive_where(|_, _| true);
            if let Some(sheriff) = self.pick(Decision::Sheriff, &candidates) {
                self.narrator.apply("sheriff", |s| s.set_sheriff(sheriff))?;
            }
        }

        if !self.vote(Decision::DayVote)? {
            return Ok(false);
        }

        let state = self.narrator.state();
        let judge_can_act = !state.is_over()
            && !state.night.stuttering_judge_vote_used
            && self
                .holder(Role::StutteringJudge)
                .map(|n| state.is_alive(n))
                .unwrap_or(false);
        if judge_can_act {
            let candidates = self.alive_where(|_, _| true);
            if self.pick(Decision::SecondVote, &candidates).is_some() {
                self.narrator
                    .apply("second vote", |s| s.use_stuttering_judge_vote())?;
                self.vote(Decision::DayVote)?;
            }
        }
        Ok(true)
    }

    fn vote(&mut self, decision: Decision) -> Result<bool> {
        let candidates = self.alive_where(|_, _| true);
        let Some(voted) = self.pick(decision, &candidates) else {
            return Ok(false);
        };
        let player = self.narrator.state().get_player(voted)?;
        let idiot_spared =
            player.assigned_role == Some(Role::VillageIdiot) && player.actual_role.is_none();
        if idiot_spared {
            self.narrator
                .apply("reveal idiot", |s| s.set_revealed_role(voted, Role::VillageIdiot))?;
            return Ok(true);
        }
        self.eliminate(voted)?;
        Ok(true)
    }

    /// Kill, reveal and play out the whole consequence chain
    fn eliminate(&mut self, victim: PlayerNumber) -> Result<()> {
        let role = self.narrator.state().get_player(victim)?.assigned_role;
        let consequence = self.narrator.eliminate(victim, role)?;

        let controller = &mut *self.controller;
        let hunter_shot = |state: &GameState, consequence: &crate::game::Consequence| {
            let candidates: Vec<PlayerNumber> = state
                .alive_players()
                .map(|p| p.number)
                .filter(|n| !consequence.affected_players.contains(n))
                .collect();
            controller
                .choose_player(state, Decision::HunterShot, &candidates)
                .filter(|c| candidates.contains(c))
                .or_else(|| candidates.first().copied())
        };
        let reveal = |state: &GameState, n: PlayerNumber| {
            state.get_player(n).ok().and_then(|p| p.assigned_role)
        };
        self.narrator.resolve_chain(consequence, hunter_shot, reveal)?;
        Ok(())
    }
}
