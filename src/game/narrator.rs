//! Narrator session
//!
//! Owns the current snapshot, its undo history and the logger. Every change
//! goes through `apply`, which records the previous snapshot, narrates the
//! new log entries and runs the win evaluation.

/// Narration that costs a `format!` per call; compiled out without the
/// `verbose-logging` feature
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.log_normal(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

use crate::core::{PlayerNumber, Role};
use crate::game::actions::DawnReport;
use crate::game::consequence::{resolve, Consequence, ConsequenceType};
use crate::game::logger::{GameLogger, VerbosityLevel};
use crate::game::state::EventCategory;
use crate::game::victory::{evaluate, WinResult};
use crate::game::GameState;
use crate::undo::UndoLog;
use crate::{NarratorError, Result};
use std::collections::VecDeque;

/// Upper bound on consequences applied for one elimination
const MAX_CHAIN: usize = 64;

pub struct Narrator {
    state: GameState,
    history: UndoLog,
    logger: GameLogger,
}

impl Narrator {
    pub fn new(state: GameState) -> Self {
        Narrator {
            state,
            history: UndoLog::new(),
            logger: GameLogger::new(),
        }
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.logger.set_verbosity(verbosity);
        self
    }

    /// Run without an undo history (simulations)
    pub fn without_history(mut self) -> Self {
        self.history = UndoLog::disabled();
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut GameLogger {
        &mut self.logger
    }

    pub fn history(&self) -> &UndoLog {
        &self.history
    }

    pub fn log_normal(&self, message: &str) {
        self.logger.normal(message);
    }

    /// Run a copy-on-write mutator against the current snapshot
    ///
    /// On success the previous snapshot is kept for `undo`, and a positive
    /// win evaluation ends the game.
    pub fn apply<F>(&mut self, action: &str, f: F) -> Result<()>
    where
        F: FnOnce(&GameState) -> Result<GameState>,
    {
        let next = f(&self.state)?;
        self.commit(action, next, true);
        Ok(())
    }

    fn commit(&mut self, action: &str, next: GameState, check_win: bool) {
        let seen = self.state.game_events.len();
        let before = std::mem::replace(&mut self.state, next);
        self.history.record(action, before);
        self.logger.verbose(&format!("> {}", action));
        self.narrate_from(seen);
        if check_win {
            self.check_victory();
        }
    }

    fn narrate_from(&self, from: usize) {
        // A reset starts a fresh event log
        let from = from.min(self.state.game_events.len());
        for event in &self.state.game_events[from..] {
            match event.category {
                EventCategory::Victory => self.logger.minimal(&event.description),
                EventCategory::Night if event.description.ends_with("wakes up") => {
                    self.logger.verbose(&event.description)
                }
                _ => {
                    log_if_verbose!(self, "{}", event.description);
                }
            }
        }
    }

    /// Evaluate the win conditions and end the game on a positive result
    ///
    /// Does nothing before the first night or once a winner is recorded.
    pub fn check_victory(&mut self) -> Option<WinResult> {
        if self.state.winner.is_some() {
            return self.state.winner.clone();
        }
        if self.state.phase == crate::game::GamePhase::Setup {
            return None;
        }
        let result = evaluate(&self.state);
        if !result.has_winner {
            return None;
        }
        let seen = self.state.game_events.len();
        self.state = self.state.ended_with(result.clone());
        self.narrate_from(seen);
        Some(result)
    }

    /// Start the dawn without judging the game yet: the deaths still have
    /// consequences to resolve
    pub fn start_dawn(&mut self) -> Result<DawnReport> {
        let (next, report) = self.state.start_dawn()?;
        self.commit("start_dawn", next, report.deaths.is_empty());
        Ok(report)
    }

    /// Mark a death (if not already dead), reveal the card when known, and
    /// return the consequence the narrator must apply next
    ///
    /// The win evaluation waits until the consequence has been resolved
    /// with `resolve_chain`.
    pub fn eliminate(&mut self, number: PlayerNumber, role: Option<Role>) -> Result<Consequence> {
        self.state.get_player(number)?;
        if self.state.is_alive(number) {
            let next = self.state.toggle_alive(number)?;
            self.commit(&format!("eliminate {}", number), next, false);
        }
        if let Some(role) = role {
            let next = self.state.set_revealed_role(number, role)?;
            self.commit(&format!("reveal {} {}", number, role.id()), next, false);
        }
        let consequence = resolve(&self.state, number, role);
        if consequence.is_none() {
            self.check_victory();
        }
        Ok(consequence)
    }

    /// Apply `first` and every consequence set off by the deaths it causes,
    /// then run the win evaluation
    ///
    /// `choose_target` supplies the hunter's shot. Players killed along the
    /// chain have their cards revealed through `reveal`.
    pub fn resolve_chain<C, R>(
        &mut self,
        first: Consequence,
        mut choose_target: C,
        mut reveal: R,
    ) -> Result<Vec<Consequence>>
    where
        C: FnMut(&GameState, &Consequence) -> Option<PlayerNumber>,
        R: FnMut(&GameState, PlayerNumber) -> Option<Role>,
    {
        let mut applied = Vec::new();
        let mut pending = VecDeque::from([first]);

        while let Some(consequence) = pending.pop_front() {
            if consequence.is_none() {
                continue;
            }
            if applied.len() >= MAX_CHAIN {
                return Err(NarratorError::InvalidAction(
                    "consequence chain does not terminate".to_string(),
                ));
            }

            let target = if consequence.requires_player_selection {
                choose_target(&self.state, &consequence)
            } else {
                None
            };
            let mut killed: Vec<PlayerNumber> = consequence.eliminations().to_vec();
            if consequence.kind == ConsequenceType::Hunter {
                match target {
                    Some(target) => killed.push(target),
                    None => {
                        applied.push(consequence);
                        continue;
                    }
                }
            }

            let next = self.state.apply_consequence(&consequence, target)?;
            self.commit(&format!("consequence {:?}", consequence.kind), next, false);

            for victim in killed {
                let role = reveal(&self.state, victim);
                if let Some(role) = role {
                    let next = self.state.set_revealed_role(victim, role)?;
                    self.commit(&format!("reveal {} {}", victim, role.id()), next, false);
                }
                pending.push_back(resolve(&self.state, victim, role));
            }
            applied.push(consequence);
        }

        self.check_victory();
        Ok(applied)
    }

    /// Restore the snapshot before the last action
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(entry) => {
                self.logger.verbose(&format!("< undo {}", entry.action));
                self.state = entry.before;
                true
            }
            None => false,
        }
    }

    /// Remember the current point (start of a night) for `rewind`
    pub fn mark_checkpoint(&mut self) {
        self.history.mark_checkpoint();
    }

    /// Back to the last checkpoint, discarding everything since
    pub fn rewind(&mut self) -> bool {
        match self.history.rewind_to_checkpoint() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GamePhase, Winner};

    fn n(x: u32) -> PlayerNumber {
        PlayerNumber::new(x)
    }

    fn narrator() -> Narrator {
        let state = GameState::configure(
            5,
            vec![
                Role::Seer,
                Role::Hunter,
                Role::Villager,
                Role::Villager,
                Role::SimpleWerewolf,
            ],
            None,
        );
        let mut narrator = Narrator::new(state);
        narrator.logger_mut().enable_capture();
        narrator.apply("start_game", |s| s.start_game()).unwrap();
        narrator
    }

    #[test]
    fn test_apply_records_history() {
        let mut narrator = narrator();
        narrator.apply("toggle_alive 1", |s| s.toggle_alive(n(1))).unwrap();
        assert!(!narrator.state().is_alive(n(1)));
        assert_eq!(narrator.history().len(), 2);

        assert!(narrator.undo());
        assert!(narrator.state().is_alive(n(1)));
        assert!(narrator.undo());
        assert_eq!(narrator.state().phase, GamePhase::Setup);
        assert!(!narrator.undo());
    }

    #[test]
    fn test_failed_action_changes_nothing() {
        let mut narrator = narrator();
        let before = narrator.state().clone();
        assert!(narrator.apply("bad", |s| s.toggle_alive(n(9))).is_err());
        assert_eq!(narrator.state(), &before);
        assert_eq!(narrator.history().len(), 1);
    }

    #[test]
    fn test_win_ends_game() {
        let mut narrator = narrator();
        let consequence = narrator.eliminate(n(5), Some(Role::SimpleWerewolf)).unwrap();
        assert!(consequence.is_none());
        assert!(narrator.state().is_over());
        let winner = narrator.state().winner.clone().unwrap();
        assert_eq!(winner.winner, Some(Winner::Village));
        assert!(narrator
            .logger()
            .logs()
            .iter()
            .any(|log| log.level == VerbosityLevel::Minimal));
    }

    #[test]
    fn test_hunter_chain_resolves_before_judging() {
        let mut narrator = narrator();
        let consequence = narrator.eliminate(n(2), Some(Role::Hunter)).unwrap();
        assert_eq!(consequence.kind, ConsequenceType::Hunter);
        assert!(!narrator.state().is_over());

        let applied = narrator
            .resolve_chain(consequence, |_, _| Some(n(5)), |_, _| Some(Role::SimpleWerewolf))
            .unwrap();
        assert_eq!(applied.len(), 1);
        assert!(!narrator.state().is_alive(n(5)));
        assert_eq!(
            narrator.state().winner.as_ref().and_then(|w| w.winner),
            Some(Winner::Village)
        );
    }

    #[test]
    fn test_lovers_cascade_into_hunter() {
        let mut narrator = narrator();
        narrator
            .apply("lovers", |s| s.set_cupid_lovers(n(1), n(2)))
            .unwrap();
        let consequence = narrator.eliminate(n(1), Some(Role::Seer)).unwrap();
        assert_eq!(consequence.kind, ConsequenceType::Lovers);

        let applied = narrator
            .resolve_chain(consequence, |_, _| Some(n(3)), |_, number| {
                (number == n(2)).then_some(Role::Hunter)
            })
            .unwrap();
        let kinds: Vec<_> = applied.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ConsequenceType::Lovers, ConsequenceType::Hunter]);
        assert!(!narrator.state().is_alive(n(2)));
        assert!(!narrator.state().is_alive(n(3)));
    }

    #[test]
    fn test_rewind_to_checkpoint() {
        let mut narrator = narrator();
        narrator.mark_checkpoint();
        narrator.apply("a", |s| s.toggle_alive(n(1))).unwrap();
        narrator.apply("b", |s| s.toggle_alive(n(3))).unwrap();
        assert!(narrator.rewind());
        assert!(narrator.state().is_alive(n(1)));
        assert!(narrator.state().is_alive(n(3)));
        assert_eq!(narrator.state().phase, GamePhase::Night);
    }
}
