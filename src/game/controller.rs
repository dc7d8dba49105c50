//! Decision seam for automated narration
//!
//! The rules engine never picks targets itself. When a role wakes, when the
//! village votes, or when the hunter shoots, the auto-player asks a
//! controller. Controllers only see the snapshot; they never mutate it.

use crate::core::PlayerNumber;
use crate::game::phase::WerewolfVariant;
use crate::game::GameState;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// What a controller is being asked to decide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    CupidLover,
    RoleModel,
    FoxSniff,
    SeerLook,
    Protect,
    WerewolfVictim(WerewolfVariant),
    Infect,
    Heal,
    Poison,
    Sheriff,
    DayVote,
    SecondVote,
    HunterShot,
    /// Thief card, Wolf-Hound side, manipulator target: an index into options
    Option,
}

impl Decision {
    /// The role may decline to act
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            Decision::FoxSniff
                | Decision::Infect
                | Decision::Heal
                | Decision::Poison
                | Decision::SecondVote
                | Decision::WerewolfVictim(WerewolfVariant::WhiteWerewolf)
        )
    }
}

/// Makes the choices the narrator would otherwise ask the table for
pub trait NarratorController {
    /// Shown in verbose narration
    fn name(&self) -> &str;

    /// Pick one of `candidates`. Returning `None` declines an optional
    /// decision; for mandatory decisions the caller falls back to the first
    /// candidate.
    fn choose_player(
        &mut self,
        state: &GameState,
        decision: Decision,
        candidates: &[PlayerNumber],
    ) -> Option<PlayerNumber>;

    /// Pick an index in `0..option_count`
    fn choose_option(&mut self, state: &GameState, decision: Decision, option_count: usize)
        -> usize;
}

/// Uniformly random choices from a seeded ChaCha stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomController {
    rng: ChaCha8Rng,
}

impl RandomController {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        RandomController {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomController {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomController {
    fn default() -> Self {
        Self::new()
    }
}

impl NarratorController for RandomController {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_player(
        &mut self,
        _state: &GameState,
        decision: Decision,
        candidates: &[PlayerNumber],
    ) -> Option<PlayerNumber> {
        if candidates.is_empty() {
            return None;
        }
        if decision.is_optional() && self.rng.gen_bool(0.5) {
            return None;
        }
        let index = self.rng.gen_range(0..candidates.len());
        Some(candidates[index])
    }

    fn choose_option(
        &mut self,
        _state: &GameState,
        _decision: Decision,
        option_count: usize,
    ) -> usize {
        if option_count == 0 {
            0
        } else {
            self.rng.gen_range(0..option_count)
        }
    }
}

/// Always the first legal option, and always acts when it may
///
/// Useful for tests and benchmarks: games are deterministic without a seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroController;

impl ZeroController {
    pub fn new() -> Self {
        ZeroController
    }
}

impl NarratorController for ZeroController {
    fn name(&self) -> &str {
        "zero"
    }

    fn choose_player(
        &mut self,
        _state: &GameState,
        _decision: Decision,
        candidates: &[PlayerNumber],
    ) -> Option<PlayerNumber> {
        candidates.first().copied()
    }

    fn choose_option(&mut self, _state: &GameState, _decision: Decision, _option_count: usize) -> usize {
        0
    }
}
