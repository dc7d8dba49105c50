//! Narrator actions: lifecycle transitions, player edits and role powers
//!
//! Every action takes the current snapshot by reference and returns a new
//! one. The receiver is never modified, so a caller holding an older
//! snapshot keeps a valid historical value.

use crate::core::{ManipulatorGroup, PlayerName, PlayerNumber, Role, Team};
use crate::game::consequence::{Consequence, ConsequenceType};
use crate::game::night::active_role_queue;
use crate::game::phase::{GamePhase, NightStep, WerewolfVariant};
use crate::game::state::EventCategory;
use crate::game::victory::WinResult;
use crate::game::GameState;
use crate::{NarratorError, Result};
use serde::{Deserialize, Serialize};

/// Deaths revealed at dawn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DawnReport {
    /// In seat order
    pub deaths: Vec<PlayerNumber>,
}

impl GameState {
    /// Clone, apply, hand back the new snapshot
    fn mutated<F>(&self, f: F) -> Result<GameState>
    where
        F: FnOnce(&mut GameState) -> Result<()>,
    {
        let mut next = self.clone();
        f(&mut next)?;
        Ok(next)
    }

    /// Playable setup plus a seat that exists
    fn checked_player(&self, number: PlayerNumber) -> Result<()> {
        self.ensure_playable()?;
        self.get_player(number).map(|_| ())
    }

    fn require_phase(&self, allowed: &[GamePhase], action: &str) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(NarratorError::InvalidAction(format!(
                "cannot {} during {:?}",
                action, self.phase
            )))
        }
    }

    fn require_alive(&self, number: PlayerNumber, action: &str) -> Result<()> {
        if self.get_player(number)?.is_alive {
            Ok(())
        } else {
            Err(NarratorError::InvalidAction(format!(
                "cannot {}: {} is dead",
                action,
                self.label(number)
            )))
        }
    }

    /// Mark a player dead and log it; already-dead players are left alone
    fn kill(&mut self, number: PlayerNumber, cause: &str) -> Result<bool> {
        let player = self.get_player_mut(number)?;
        if !player.is_alive {
            return Ok(false);
        }
        player.is_alive = false;
        let label = player.label();
        self.log_event(EventCategory::Death, format!("{} dies ({})", label, cause));
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Validate the setup and fall into the first night
    pub fn start_game(&self) -> Result<GameState> {
        self.ensure_playable()?;
        self.require_phase(&[GamePhase::Setup], "start the game")?;
        self.mutated(|s| {
            s.phase = GamePhase::Night;
            s.night.current_night_number = 1;
            s.night.white_werewolf_night = false;
            let queue = active_role_queue(s);
            s.night.begin(queue);
            s.log_event(EventCategory::Night, "The game begins. Night 1 falls on the village");
            Ok(())
        })
    }

    /// Begin the next night with a freshly computed queue
    pub fn start_night(&self) -> Result<GameState> {
        self.ensure_playable()?;
        self.require_phase(&[GamePhase::Dawn, GamePhase::Day], "start a night")?;
        self.mutated(|s| {
            s.night.next_night();
            s.phase = GamePhase::Night;
            s.day.vote_in_progress = false;
            s.day.timer_running = false;
            let queue = active_role_queue(s);
            s.night.begin(queue);
            let night = s.night.current_night_number;
            s.log_event(EventCategory::Night, format!("Night {} falls on the village", night));
            Ok(())
        })
    }

    /// Step the night sequencer forward (no-op once the night is complete)
    pub fn advance_night_step(&self) -> Result<GameState> {
        self.ensure_playable()?;
        self.require_phase(&[GamePhase::Night], "advance the night")?;
        if self.night.step() == NightStep::NightComplete {
            return Ok(self.clone());
        }
        self.mutated(|s| {
            let description = match s.night.advance() {
                NightStep::RoleActive(i) => {
                    format!("{} wakes up", s.night.active_roles[i].display_name())
                }
                _ => "Every role has acted; the night is over".to_string(),
            };
            s.log_event(EventCategory::Night, description);
            Ok(())
        })
    }

    /// Resolve the night's attacks and potions
    ///
    /// Wolf victims survive if protected by the defender or healed by the
    /// witch; the witch's poison always kills.
    pub fn start_dawn(&self) -> Result<(GameState, DawnReport)> {
        self.ensure_playable()?;
        self.require_phase(&[GamePhase::Night], "start the dawn")?;

        let tonight = &self.night.tonight;
        let mut deaths: Vec<PlayerNumber> = [
            WerewolfVariant::Pack,
            WerewolfVariant::BigBadWolf,
            WerewolfVariant::WhiteWerewolf,
        ]
        .iter()
        .filter_map(|variant| tonight.victim(*variant))
        .filter(|victim| tonight.protected != Some(*victim) && tonight.healed != Some(*victim))
        .chain(tonight.poisoned)
        .filter(|victim| self.is_alive(*victim))
        .collect();
        deaths.sort();
        deaths.dedup();

        let next = self.mutated(|s| {
            s.phase = GamePhase::Dawn;
            let night = s.night.current_night_number;
            s.log_event(EventCategory::Dawn, format!("Dawn breaks after night {}", night));
            if deaths.is_empty() {
                s.log_event(EventCategory::Dawn, "Nobody died during the night");
            }
            for victim in &deaths {
                s.kill(*victim, "killed during the night")?;
            }
            Ok(())
        })?;
        Ok((next, DawnReport { deaths }))
    }

    /// Open the village debate
    pub fn start_day(&self) -> Result<GameState> {
        self.ensure_playable()?;
        self.require_phase(&[GamePhase::Dawn], "start the day")?;
        self.mutated(|s| {
            s.phase = GamePhase::Day;
            s.day.current_day_number += 1;
            s.day.vote_in_progress = false;
            s.day.timer_running = false;
            let day = s.day.current_day_number;
            s.log_event(EventCategory::Day, format!("Day {} begins", day));
            Ok(())
        })
    }

    /// Fresh game with the same setup and names
    pub fn reset_game(&self) -> GameState {
        self.restarted()
    }

    /// Record a winner and end the game
    pub fn declare_winner(&self, result: WinResult) -> Result<GameState> {
        if !result.has_winner {
            return Err(NarratorError::InvalidAction(
                "cannot end the game without a winner".to_string(),
            ));
        }
        Ok(self.ended_with(result))
    }

    /// End the game with a result already known to name a winner
    pub(crate) fn ended_with(&self, result: WinResult) -> GameState {
        let mut next = self.clone();
        let message = result
            .message
            .clone()
            .unwrap_or_else(|| "The game is over".to_string());
        next.phase = GamePhase::Ended;
        next.winner = Some(result);
        next.log_event(EventCategory::Victory, message);
        next
    }

    // ------------------------------------------------------------------
    // Player edits
    // ------------------------------------------------------------------

    pub fn toggle_alive(&self, number: PlayerNumber) -> Result<GameState> {
        self.checked_player(number)?;
        self.mutated(|s| {
            let player = s.get_player_mut(number)?;
            player.is_alive = !player.is_alive;
            let (alive, label) = (player.is_alive, player.label());
            if alive {
                s.log_event(EventCategory::Revival, format!("{} is back in the game", label));
            } else {
                s.log_event(EventCategory::Death, format!("{} is eliminated", label));
            }
            Ok(())
        })
    }

    pub fn set_revealed_role(&self, number: PlayerNumber, role: Role) -> Result<GameState> {
        self.checked_player(number)?;
        self.mutated(|s| {
            let player = s.get_player_mut(number)?;
            player.actual_role = Some(role);
            let label = player.label();
            s.log_event(
                EventCategory::Reveal,
                format!("{} is revealed as {}", label, role.display_name()),
            );
            Ok(())
        })
    }

    /// Setup-time assignment (self-selection or dealt cards), not a reveal
    pub fn set_assigned_role(&self, number: PlayerNumber, role: Option<Role>) -> Result<GameState> {
        self.get_player(number)?;
        self.mutated(|s| {
            let player = s.get_player_mut(number)?;
            player.assigned_role = role;
            let label = player.label();
            let message = match role {
                Some(role) => format!("{} receives the {} card", label, role.display_name()),
                None => format!("{} has no card yet", label),
            };
            s.log_event(EventCategory::Setup, message);
            Ok(())
        })
    }

    /// Free-text edits are allowed while the roster is still being built
    pub fn set_notes(&self, number: PlayerNumber, text: impl Into<String>) -> Result<GameState> {
        self.get_player(number)?;
        let text = text.into();
        self.mutated(|s| {
            let player = s.get_player_mut(number)?;
            player.notes = text;
            let label = player.label();
            s.log_event(EventCategory::Setup, format!("Notes updated for {}", label));
            Ok(())
        })
    }

    pub fn set_player_name(&self, number: PlayerNumber, name: impl Into<PlayerName>) -> Result<GameState> {
        self.get_player(number)?;
        let name = name.into();
        self.mutated(|s| {
            s.log_event(EventCategory::Setup, format!("Player {} is now {}", number, name));
            s.get_player_mut(number)?.name = Some(name);
            Ok(())
        })
    }

    /// The Wolf-Hound picks a side on the first night
    pub fn set_wolf_hound_team(&self, team: Team) -> Result<GameState> {
        self.ensure_playable()?;
        if team == Team::Solo {
            return Err(NarratorError::InvalidAction(
                "the Wolf-Hound must side with the village or the werewolves".to_string(),
            ));
        }
        let hound = self
            .holders(Role::WolfHound)
            .next()
            .map(|p| p.number)
            .ok_or_else(|| {
                NarratorError::InvalidAction("no player holds the Wolf-Hound".to_string())
            })?;
        self.mutated(|s| {
            s.get_player_mut(hound)?.wolf_hound_team = Some(team);
            s.log_event(
                EventCategory::RoleAction,
                format!("The Wolf-Hound sides with the {}", team),
            );
            Ok(())
        })
    }

    pub fn set_prejudiced_manipulator_group(
        &self,
        number: PlayerNumber,
        group: ManipulatorGroup,
    ) -> Result<GameState> {
        self.get_player(number)?;
        self.mutated(|s| {
            s.get_player_mut(number)?.prejudiced_manipulator_group = group;
            let label = s.label(number);
            s.log_event(EventCategory::Setup, format!("{} joins group {}", label, group));
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Role powers
    // ------------------------------------------------------------------

    pub fn set_cupid_lovers(&self, a: PlayerNumber, b: PlayerNumber) -> Result<GameState> {
        self.checked_player(a)?;
        self.checked_player(b)?;
        if a == b {
            return Err(NarratorError::InvalidAction(
                "Cupid must pick two different lovers".to_string(),
            ));
        }
        self.mutated(|s| {
            s.cupid_lovers = Some([a, b]);
            let message = format!("{} and {} fall in love", s.label(a), s.label(b));
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    pub fn set_wild_child_role_model(&self, model: PlayerNumber) -> Result<GameState> {
        self.checked_player(model)?;
        self.mutated(|s| {
            s.wild_child_role_model = Some(model);
            let message = format!("The Wild Child chooses {} as role model", s.label(model));
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    /// The Cursed Wolf-Father turns tonight's victim into a werewolf
    pub fn use_infection(&self, target: PlayerNumber) -> Result<GameState> {
        self.checked_player(target)?;
        if self.night.infection_used {
            return Err(NarratorError::InvalidAction(
                "the infection has already been used".to_string(),
            ));
        }
        self.require_alive(target, "infect")?;
        self.mutated(|s| {
            s.night.infection_used = true;
            s.cursed_wolf_father_infected_player = Some(target);
            if s.night.tonight.pack_victim == Some(target) {
                s.night.tonight.pack_victim = None;
            }
            let message = format!("{} is infected and joins the werewolves", s.label(target));
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    pub fn select_werewolf_victim(
        &self,
        target: PlayerNumber,
        variant: WerewolfVariant,
    ) -> Result<GameState> {
        self.checked_player(target)?;
        self.require_alive(target, "attack")?;
        self.mutated(|s| {
            s.night.tonight.set_victim(variant, Some(target));
            let who = match variant {
                WerewolfVariant::Pack => "The werewolves",
                WerewolfVariant::BigBadWolf => "The Big Bad Wolf",
                WerewolfVariant::WhiteWerewolf => "The White Werewolf",
            };
            let message = format!("{} choose to attack {}", who, s.label(target));
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    /// The thief keeps one of the two unused cards, or none
    pub fn set_thief_chosen_role(&self, role: Option<Role>) -> Result<GameState> {
        self.ensure_playable()?;
        if let (Some(role), Some(unused)) = (role, self.setup.unused_roles) {
            if !unused.contains(&role) {
                return Err(NarratorError::InvalidAction(format!(
                    "{} is not one of the unused cards",
                    role.display_name()
                )));
            }
        }
        self.mutated(|s| {
            s.thief_chosen_role = role;
            let message = match role {
                Some(role) => format!("The Thief takes the {} card", role.display_name()),
                None => "The Thief keeps their card".to_string(),
            };
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    pub fn set_sheriff(&self, number: PlayerNumber) -> Result<GameState> {
        self.checked_player(number)?;
        self.require_alive(number, "elect as sheriff")?;
        self.mutated(|s| {
            s.sheriff = Some(number);
            let message = format!("{} is elected sheriff", s.label(number));
            s.log_event(EventCategory::Day, message);
            Ok(())
        })
    }

    pub fn set_prejudiced_manipulator_target(&self, group: ManipulatorGroup) -> Result<GameState> {
        self.ensure_playable()?;
        self.mutated(|s| {
            s.prejudiced_manipulator_target_group = Some(group);
            s.log_event(
                EventCategory::RoleAction,
                format!("The Prejudiced Manipulator targets group {}", group),
            );
            Ok(())
        })
    }

    pub fn transform_wild_child(&self) -> Result<GameState> {
        self.ensure_playable()?;
        self.mutated(|s| {
            s.wild_child_transformed = true;
            s.log_event(EventCategory::Consequence, "The Wild Child becomes a werewolf");
            Ok(())
        })
    }

    /// The defender shields one player, never the same one two nights in a row
    pub fn protect_player(&self, target: PlayerNumber) -> Result<GameState> {
        self.checked_player(target)?;
        self.require_alive(target, "protect")?;
        if self.night.defender_last_protected == Some(target) {
            return Err(NarratorError::InvalidAction(format!(
                "{} was already protected last night",
                self.label(target)
            )));
        }
        self.mutated(|s| {
            s.night.tonight.protected = Some(target);
            let message = format!("The Defender protects {}", s.label(target));
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    fn check_potion(&self, used: bool, potion: &str) -> Result<()> {
        if used {
            return Err(NarratorError::InvalidAction(format!(
                "the {} potion has already been used",
                potion
            )));
        }
        if self.night.tonight.potion_used {
            return Err(NarratorError::InvalidAction(
                "the Witch already used a potion tonight".to_string(),
            ));
        }
        Ok(())
    }

    pub fn use_healing_potion(&self, target: PlayerNumber) -> Result<GameState> {
        self.checked_player(target)?;
        self.check_potion(self.night.healing_potion_used, "healing")?;
        self.mutated(|s| {
            s.night.healing_potion_used = true;
            s.night.tonight.potion_used = true;
            s.night.tonight.healed = Some(target);
            let message = format!("The Witch saves {}", s.label(target));
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    pub fn use_poison_potion(&self, target: PlayerNumber) -> Result<GameState> {
        self.checked_player(target)?;
        self.check_potion(self.night.poison_potion_used, "poison")?;
        self.require_alive(target, "poison")?;
        self.mutated(|s| {
            s.night.poison_potion_used = true;
            s.night.tonight.potion_used = true;
            s.night.tonight.poisoned = Some(target);
            let message = format!("The Witch poisons {}", s.label(target));
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })
    }

    /// Nearest living seat in one direction, skipping the dead
    fn living_neighbour(&self, from: PlayerNumber, forward: bool) -> Option<PlayerNumber> {
        let count = self.player_count();
        let mut seat = from;
        for _ in 1..count {
            seat = if forward {
                seat.next_seat(count)
            } else if seat.as_u32() <= 1 {
                PlayerNumber::new(count)
            } else {
                PlayerNumber::new(seat.as_u32() - 1)
            };
            if seat == from {
                return None;
            }
            if self.is_alive(seat) {
                return Some(seat);
            }
        }
        None
    }

    /// Does this seat currently hunt with the werewolves?
    pub fn is_werewolf_side(&self, number: PlayerNumber) -> bool {
        let Ok(player) = self.get_player(number) else {
            return false;
        };
        if self.is_converted(player) {
            return true;
        }
        match player.role() {
            Some(Role::WolfHound) => player.wolf_hound_team == Some(Team::Werewolf),
            Some(Role::WhiteWerewolf) => true,
            Some(role) => role.team() == Team::Werewolf,
            None => false,
        }
    }

    /// The fox sniffs a player and their living neighbours. Returns whether
    /// a werewolf was among them; on a miss the fox loses the power.
    pub fn use_fox_sniff(&self, center: PlayerNumber) -> Result<(GameState, bool)> {
        self.checked_player(center)?;
        if self.night.fox_power_lost {
            return Err(NarratorError::InvalidAction(
                "the Fox has lost its power".to_string(),
            ));
        }
        let sniffed = [
            self.living_neighbour(center, false),
            Some(center),
            self.living_neighbour(center, true),
        ];
        let found = sniffed
            .iter()
            .flatten()
            .any(|seat| self.is_werewolf_side(*seat));
        let next = self.mutated(|s| {
            if !found {
                s.night.fox_power_lost = true;
            }
            let message = if found {
                format!("The Fox smells a werewolf near {}", s.label(center))
            } else {
                format!("The Fox finds no werewolf near {} and loses its power", s.label(center))
            };
            s.log_event(EventCategory::RoleAction, message);
            Ok(())
        })?;
        Ok((next, found))
    }

    pub fn use_stuttering_judge_vote(&self) -> Result<GameState> {
        self.ensure_playable()?;
        if self.night.stuttering_judge_vote_used {
            return Err(NarratorError::InvalidAction(
                "the Stuttering Judge already called a second vote".to_string(),
            ));
        }
        self.mutated(|s| {
            s.night.stuttering_judge_vote_used = true;
            s.log_event(EventCategory::Day, "The Stuttering Judge calls for a second vote");
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Consequences
    // ------------------------------------------------------------------

    /// Apply what the resolver described
    ///
    /// `chosen_target` is the narrator's pick for consequences that require
    /// a selection (the hunter's shot).
    pub fn apply_consequence(
        &self,
        consequence: &Consequence,
        chosen_target: Option<PlayerNumber>,
    ) -> Result<GameState> {
        self.ensure_playable()?;
        match consequence.kind {
            ConsequenceType::None => Ok(self.clone()),
            ConsequenceType::Lovers | ConsequenceType::KnightRustySword => self.mutated(|s| {
                s.log_event(EventCategory::Consequence, consequence.message.clone());
                for victim in &consequence.affected_players {
                    s.kill(*victim, "consequence")?;
                }
                Ok(())
            }),
            ConsequenceType::Hunter => {
                let target = chosen_target.ok_or_else(|| {
                    NarratorError::InvalidAction("the Hunter's shot needs a target".to_string())
                })?;
                self.checked_player(target)?;
                self.require_alive(target, "shoot")?;
                self.mutated(|s| {
                    let message = format!("The Hunter shoots {}", s.label(target));
                    s.log_event(EventCategory::Consequence, message);
                    s.kill(target, "shot by the Hunter")?;
                    Ok(())
                })
            }
            ConsequenceType::WildChildTransform => self.mutated(|s| {
                s.wild_child_transformed = true;
                s.log_event(EventCategory::Consequence, consequence.message.clone());
                Ok(())
            }),
            ConsequenceType::Siblings => self.mutated(|s| {
                s.log_event(EventCategory::Consequence, consequence.message.clone());
                Ok(())
            }),
        }
    }
}
