//! Game phases and the per-night / per-day counters

use crate::core::{PlayerNumber, Role};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Coarse lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Roster and roles are being configured
    #[default]
    Setup,
    Night,
    /// Night victims are being announced
    Dawn,
    Day,
    /// A winner has been declared
    Ended,
}

/// Position of the night sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NightStep {
    /// Night not yet announced (pointer at 0)
    AwaitingStart,
    /// The role at this queue index is awake
    RoleActive(usize),
    /// Every queued role has acted
    NightComplete,
}

/// Which wolf chose a victim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WerewolfVariant {
    /// The whole pack's shared kill
    Pack,
    BigBadWolf,
    WhiteWerewolf,
}

/// Choices made during a single night, cleared when the next night starts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NightActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_victim: Option<PlayerNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_bad_wolf_victim: Option<PlayerNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_werewolf_victim: Option<PlayerNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<PlayerNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healed: Option<PlayerNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poisoned: Option<PlayerNumber>,
    /// A witch potion was already used this night
    #[serde(default)]
    pub potion_used: bool,
}

impl NightActions {
    pub fn victim(&self, variant: WerewolfVariant) -> Option<PlayerNumber> {
        match variant {
            WerewolfVariant::Pack => self.pack_victim,
            WerewolfVariant::BigBadWolf => self.big_bad_wolf_victim,
            WerewolfVariant::WhiteWerewolf => self.white_werewolf_victim,
        }
    }

    pub fn set_victim(&mut self, variant: WerewolfVariant, target: Option<PlayerNumber>) {
        match variant {
            WerewolfVariant::Pack => self.pack_victim = target,
            WerewolfVariant::BigBadWolf => self.big_bad_wolf_victim = target,
            WerewolfVariant::WhiteWerewolf => self.white_werewolf_victim = target,
        }
    }
}

/// Night counters, one-shot flags and the sequencer pointer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NightState {
    /// 0 before the game starts, 1 on the first night
    pub current_night_number: u32,

    /// The White Werewolf wakes alone tonight (every other night)
    pub white_werewolf_night: bool,

    // One-shot flags for limited-use roles
    pub infection_used: bool,
    pub healing_potion_used: bool,
    pub poison_potion_used: bool,
    pub fox_power_lost: bool,
    pub stuttering_judge_vote_used: bool,

    /// The defender may not protect the same player two nights running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defender_last_protected: Option<PlayerNumber>,

    /// Cleared at the start of every night
    #[serde(default)]
    pub tonight: NightActions,

    /// Roles that wake tonight, fixed when the night starts
    pub active_roles: SmallVec<[Role; 16]>,

    /// Index of the role currently awake
    pub current_step: usize,

    /// The night has been announced and the first role woken
    pub announced: bool,
}

impl NightState {
    /// Enter `awaiting-start` with a freshly built queue
    pub fn begin(&mut self, queue: SmallVec<[Role; 16]>) {
        self.active_roles = queue;
        self.current_step = 0;
        self.announced = false;
    }

    /// Start the following night: bump the counter, flip the alternating
    /// flag, and forget everything that only held for the previous night
    pub fn next_night(&mut self) {
        self.current_night_number += 1;
        self.white_werewolf_night = !self.white_werewolf_night;
        if let Some(protected) = self.tonight.protected {
            self.defender_last_protected = Some(protected);
        } else {
            self.defender_last_protected = None;
        }
        self.tonight = NightActions::default();
        self.active_roles.clear();
        self.current_step = 0;
        self.announced = false;
    }

    /// Current sequencer state
    pub fn step(&self) -> NightStep {
        if self.active_roles.is_empty() {
            return NightStep::NightComplete;
        }
        if !self.announced {
            NightStep::AwaitingStart
        } else if self.current_step >= self.active_roles.len() {
            NightStep::NightComplete
        } else {
            NightStep::RoleActive(self.current_step)
        }
    }

    /// Move forward one step; a no-op once the night is complete
    pub fn advance(&mut self) -> NightStep {
        match self.step() {
            NightStep::AwaitingStart => {
                self.announced = true;
                self.current_step = 0;
            }
            NightStep::RoleActive(i) => {
                self.current_step = i + 1;
            }
            NightStep::NightComplete => {}
        }
        self.step()
    }

    /// Role awake right now, if any
    pub fn active_role(&self) -> Option<Role> {
        match self.step() {
            NightStep::RoleActive(i) => self.active_roles.get(i).copied(),
            _ => None,
        }
    }
}

/// Day counters; vote and timer flags are only read by the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayState {
    /// 0 until the first day starts
    pub current_day_number: u32,
    #[serde(default)]
    pub vote_in_progress: bool,
    #[serde(default)]
    pub timer_running: bool,
}
