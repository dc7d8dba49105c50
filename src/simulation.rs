//! Batch simulation: many auto-played games in parallel
//!
//! Each game gets its own seed derived from the master seed and the game
//! index, so a run is reproducible whatever the thread scheduling.

use crate::game::{
    AutoPlayer, GameEndReason, GameSetup, GameState, Narrator, NarratorController,
    RandomController, VerbosityLevel, Winner, ZeroController,
};
use crate::Result;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Controller used for every decision in a simulated game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    Zero,
    Random,
}

/// Per-game seed, spread out so neighbouring indices do not correlate
pub fn game_seed(master_seed: u64, game_idx: usize) -> u64 {
    master_seed.wrapping_add((game_idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Outcome of one simulated game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameOutcome {
    /// "village", "werewolves", a solo role id, or "none"
    pub winner: String,
    pub nights: u32,
    pub end_reason: GameEndReason,
}

/// Aggregated results
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationReport {
    pub games: usize,
    pub wins: FxHashMap<String, usize>,
    pub unfinished: usize,
    pub total_nights: u64,
}

impl SimulationReport {
    fn add(&mut self, outcome: &GameOutcome) {
        self.games += 1;
        self.total_nights += outcome.nights as u64;
        if outcome.end_reason == GameEndReason::Victory {
            *self.wins.entry(outcome.winner.clone()).or_insert(0) += 1;
        } else {
            self.unfinished += 1;
        }
    }

    pub fn wins_for(&self, winner: &str) -> usize {
        self.wins.get(winner).copied().unwrap_or(0)
    }

    pub fn average_nights(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_nights as f64 / self.games as f64
        }
    }

    /// Winners sorted by win count, then name
    pub fn ranking(&self) -> Vec<(&str, usize)> {
        let mut ranking: Vec<(&str, usize)> =
            self.wins.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranking
    }

    pub fn print(&self) {
        println!("=== Simulation Results ===");
        println!("Games played: {}", self.games);
        for (winner, count) in self.ranking() {
            let pct = if self.games == 0 {
                0.0
            } else {
                100.0 * count as f64 / self.games as f64
            };
            println!("  {:<24} {:>6} ({:.1}%)", winner, count, pct);
        }
        if self.unfinished > 0 {
            println!("  {:<24} {:>6}", "unfinished", self.unfinished);
        }
        println!("Average nights: {:.2}", self.average_nights());
    }
}

/// Play one silent game
pub fn play_game(setup: &GameSetup, controller: ControllerType, seed: u64) -> Result<GameOutcome> {
    let mut narrator = Narrator::new(GameState::from_setup(setup.clone()))
        .with_verbosity(VerbosityLevel::Silent)
        .without_history();
    let mut zero = ZeroController::new();
    let mut random = RandomController::with_seed(seed.wrapping_add(0x1234_5678_9ABC_DEF0));
    let controller: &mut dyn NarratorController = match controller {
        ControllerType::Zero => &mut zero,
        ControllerType::Random => &mut random,
    };

    let result = AutoPlayer::new(&mut narrator, controller, seed).run()?;
    let winner = match result.winner.as_ref() {
        Some(win) => match (win.winner, win.solo_role) {
            (Some(Winner::Solo), Some(role)) => role.id().to_string(),
            (Some(winner), _) => winner.to_string(),
            (None, _) => "none".to_string(),
        },
        None => "none".to_string(),
    };
    Ok(GameOutcome {
        winner,
        nights: result.nights_played,
        end_reason: result.end_reason,
    })
}

/// Run `games` games in parallel and aggregate the outcomes
pub fn simulate(
    setup: &GameSetup,
    games: usize,
    seed: u64,
    controller: ControllerType,
) -> Result<SimulationReport> {
    setup.validate()?;
    let outcomes: Vec<GameOutcome> = (0..games)
        .into_par_iter()
        .map(|idx| play_game(setup, controller, game_seed(seed, idx)))
        .collect::<Result<Vec<_>>>()?;

    let mut report = SimulationReport::default();
    for outcome in &outcomes {
        report.add(outcome);
    }
    Ok(report)
}
