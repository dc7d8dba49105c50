//! Role catalog and slot calculator
//!
//! Every role the narrator knows about is declared once in the table below.
//! The table generates the `Role` enum and its const accessors, so team,
//! night order and behavioural flags never live as scattered string literals.

use crate::core::Team;
use crate::{NarratorError, Result};
use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_roles {
    (
        $(
            $role:ident: $id:literal => {
                name: $name:literal,
                french: $french:literal,
                team: $team:ident
                $(, first_night: $first_night:expr)?
                $(, other_nights: $other_nights:expr)?
                $(, alternate_nights: $alternate:expr)?
                $(, limited_uses: $limited:expr)?
                $(, slots: $slots:expr)?
            }
        ),* $(,)?
    ) => {
        /// Closed set of role identifiers
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum Role {
            $(
                #[serde(rename = $id)]
                $role,
            )*
        }

        impl Role {
            /// Stable kebab-case identifier (also the serialized form)
            pub const fn id(&self) -> &'static str {
                match self {
                    $(Role::$role => $id,)*
                }
            }

            pub const fn display_name(&self) -> &'static str {
                match self {
                    $(Role::$role => $name,)*
                }
            }

            /// Name printed on the French card
            pub const fn french_name(&self) -> &'static str {
                match self {
                    $(Role::$role => $french,)*
                }
            }

            pub const fn team(&self) -> Team {
                match self {
                    $(Role::$role => Team::$team,)*
                }
            }

            /// Position in the first night's wake order, if the role wakes then
            pub const fn first_night_order(&self) -> Option<u8> {
                match self {
                    $(Role::$role => define_roles!(@opt $($first_night)?),)*
                }
            }

            /// Position in the wake order of every later night, if any
            pub const fn other_night_order(&self) -> Option<u8> {
                match self {
                    $(Role::$role => define_roles!(@opt $($other_nights)?),)*
                }
            }

            /// Wakes only on every other night
            pub const fn alternate_nights(&self) -> bool {
                match self {
                    $(Role::$role => define_roles!(@flag $($alternate)?),)*
                }
            }

            /// The role's power can only be used a fixed number of times
            pub const fn has_limited_uses(&self) -> bool {
                match self {
                    $(Role::$role => define_roles!(@flag $($limited)?),)*
                }
            }

            /// Number of player seats the role occupies
            pub const fn slot_count(&self) -> u32 {
                match self {
                    $(Role::$role => define_roles!(@slots $($slots)?),)*
                }
            }

            pub const fn all() -> &'static [Role] {
                &[$(Role::$role,)*]
            }
        }
    };

    (@opt $val:expr) => { Some($val) };
    (@opt) => { None };

    (@flag $val:expr) => { $val };
    (@flag) => { false };

    (@slots $val:expr) => { $val };
    (@slots) => { 1 };
}

define_roles! {
    Villager: "villager" => {
        name: "Villager",
        french: "Simple Villageois",
        team: Village
    },
    Thief: "thief" => {
        name: "Thief",
        french: "Voleur",
        team: Village,
        first_night: 1
    },
    Cupid: "cupid" => {
        name: "Cupid",
        french: "Cupidon",
        team: Village,
        first_night: 2
    },
    WildChild: "wild-child" => {
        name: "Wild Child",
        french: "Enfant Sauvage",
        team: Village,
        first_night: 3
    },
    WolfHound: "wolf-hound" => {
        name: "Wolf-Hound",
        french: "Chien-Loup",
        team: Village,
        first_night: 4
    },
    StutteringJudge: "stuttering-judge" => {
        name: "Stuttering Judge",
        french: "Juge Bègue",
        team: Village,
        first_night: 5,
        limited_uses: true
    },
    TwoSisters: "two-sisters" => {
        name: "Two Sisters",
        french: "Deux Sœurs",
        team: Village,
        first_night: 6,
        other_nights: 1,
        slots: 2
    },
    ThreeBrothers: "three-brothers" => {
        name: "Three Brothers",
        french: "Trois Frères",
        team: Village,
        first_night: 7,
        other_nights: 2,
        slots: 3
    },
    Fox: "fox" => {
        name: "Fox",
        french: "Renard",
        team: Village,
        first_night: 8,
        other_nights: 3,
        limited_uses: true
    },
    Seer: "seer" => {
        name: "Seer",
        french: "Voyante",
        team: Village,
        first_night: 9,
        other_nights: 4
    },
    Defender: "defender" => {
        name: "Defender",
        french: "Salvateur",
        team: Village,
        first_night: 10,
        other_nights: 5
    },
    SimpleWerewolf: "simple-werewolf" => {
        name: "Simple Werewolf",
        french: "Loup-Garou",
        team: Werewolf,
        first_night: 11,
        other_nights: 6
    },
    BigBadWolf: "big-bad-wolf" => {
        name: "Big Bad Wolf",
        french: "Grand Méchant Loup",
        team: Werewolf,
        first_night: 12,
        other_nights: 7
    },
    CursedWolfFather: "cursed-wolf-father" => {
        name: "Cursed Wolf-Father",
        french: "Infect Père des Loups",
        team: Werewolf,
        first_night: 13,
        other_nights: 8,
        limited_uses: true
    },
    WhiteWerewolf: "white-werewolf" => {
        name: "White Werewolf",
        french: "Loup-Garou Blanc",
        team: Solo,
        first_night: 14,
        other_nights: 9,
        alternate_nights: true
    },
    Witch: "witch" => {
        name: "Witch",
        french: "Sorcière",
        team: Village,
        first_night: 15,
        other_nights: 10,
        limited_uses: true
    },
    Hunter: "hunter" => {
        name: "Hunter",
        french: "Chasseur",
        team: Village
    },
    KnightWithRustySword: "knight-with-rusty-sword" => {
        name: "Knight with the Rusty Sword",
        french: "Chevalier à l'Épée Rouillée",
        team: Village
    },
    LittleGirl: "little-girl" => {
        name: "Little Girl",
        french: "Petite Fille",
        team: Village
    },
    Elder: "elder" => {
        name: "Elder",
        french: "Ancien",
        team: Village
    },
    Scapegoat: "scapegoat" => {
        name: "Scapegoat",
        french: "Bouc Émissaire",
        team: Village
    },
    VillageIdiot: "village-idiot" => {
        name: "Village Idiot",
        french: "Idiot du Village",
        team: Village
    },
    BearTamer: "bear-tamer" => {
        name: "Bear Tamer",
        french: "Montreur d'Ours",
        team: Village
    },
    Angel: "angel" => {
        name: "Angel",
        french: "Ange",
        team: Solo
    },
    PrejudicedManipulator: "prejudiced-manipulator" => {
        name: "Prejudiced Manipulator",
        french: "Manipulateur",
        team: Solo
    },
}

impl Role {
    /// Wakes on the first night and on every later night
    pub const fn wakes_every_night(&self) -> bool {
        self.first_night_order().is_some()
            && self.other_night_order().is_some()
            && !self.alternate_nights()
    }

    /// Wakes on the first night and never again
    pub const fn first_night_only(&self) -> bool {
        self.first_night_order().is_some() && self.other_night_order().is_none()
    }

    /// Several players share this role identity
    pub const fn is_sibling_group(&self) -> bool {
        self.slot_count() > 1
    }

    /// Wake position for the given night (1-based night number)
    pub const fn night_order(&self, night: u32) -> Option<u8> {
        if night <= 1 {
            self.first_night_order()
        } else {
            self.other_night_order()
        }
    }

    /// Every role that wakes on the given night, in wake order
    pub fn night_sequence(night: u32) -> Vec<Role> {
        let mut roles: Vec<(u8, Role)> = Role::all()
            .iter()
            .filter_map(|role| role.night_order(night).map(|order| (order, *role)))
            .collect();
        roles.sort_by_key(|(order, _)| *order);
        roles.into_iter().map(|(_, role)| role).collect()
    }
}

/// Number of player seats a role occupies (1, or the sibling group size)
pub fn slot_count(role: Role) -> u32 {
    role.slot_count()
}

/// Seats consumed by a whole role list
pub fn total_slots(roles: &[Role]) -> u32 {
    roles.iter().map(|role| role.slot_count()).sum()
}

/// Fold case, accents and separators so "Sorcière", "SORCIERE" and "sorciere" compare equal
fn normalize_name(s: &str) -> String {
    let folded = deunicode(s).to_lowercase();
    let mut out = String::with_capacity(folded.len());
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

impl std::str::FromStr for Role {
    type Err = NarratorError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_name(s);
        Role::all()
            .iter()
            .copied()
            .find(|role| {
                role.id() == wanted
                    || normalize_name(role.display_name()) == wanted
                    || normalize_name(role.french_name()) == wanted
            })
            .ok_or_else(|| NarratorError::UnknownRole(s.trim().to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_counts() {
        assert_eq!(slot_count(Role::Seer), 1);
        assert_eq!(slot_count(Role::TwoSisters), 2);
        assert_eq!(slot_count(Role::ThreeBrothers), 3);
        assert!(Role::all().iter().all(|r| r.slot_count() >= 1));
    }

    #[test]
    fn test_total_slots_is_sum_of_slot_counts() {
        let roles = [
            Role::Seer,
            Role::TwoSisters,
            Role::ThreeBrothers,
            Role::SimpleWerewolf,
            Role::SimpleWerewolf,
        ];
        let expected: u32 = roles.iter().map(|r| slot_count(*r)).sum();
        assert_eq!(total_slots(&roles), expected);
        assert_eq!(total_slots(&roles), 8);
        assert_eq!(total_slots(&[]), 0);
    }

    #[test]
    fn test_parse_role_names() {
        assert_eq!("seer".parse::<Role>().unwrap(), Role::Seer);
        assert_eq!("Wild Child".parse::<Role>().unwrap(), Role::WildChild);
        assert_eq!("Sorcière".parse::<Role>().unwrap(), Role::Witch);
        assert_eq!("SORCIERE".parse::<Role>().unwrap(), Role::Witch);
        assert_eq!("Deux Sœurs".parse::<Role>().unwrap(), Role::TwoSisters);
        assert_eq!(
            "Chevalier à l'Épée Rouillée".parse::<Role>().unwrap(),
            Role::KnightWithRustySword
        );
        assert!(matches!(
            "necromancer".parse::<Role>(),
            Err(NarratorError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_serialized_form_is_id() {
        let json = serde_json::to_string(&Role::CursedWolfFather).unwrap();
        assert_eq!(json, "\"cursed-wolf-father\"");
        let back: Role = serde_json::from_str("\"knight-with-rusty-sword\"").unwrap();
        assert_eq!(back, Role::KnightWithRustySword);
    }

    #[test]
    fn test_night_flags() {
        assert!(Role::Cupid.first_night_only());
        assert!(!Role::Cupid.wakes_every_night());
        assert!(Role::Seer.wakes_every_night());
        assert!(!Role::WhiteWerewolf.wakes_every_night());
        assert!(Role::WhiteWerewolf.alternate_nights());
        assert!(Role::CursedWolfFather.has_limited_uses());
        assert_eq!(Role::Hunter.first_night_order(), None);
    }

    #[test]
    fn test_night_sequences_are_ordered() {
        let first = Role::night_sequence(1);
        assert_eq!(first.first(), Some(&Role::Thief));
        assert_eq!(first.last(), Some(&Role::Witch));
        assert!(first.contains(&Role::Cupid));

        let later = Role::night_sequence(2);
        assert!(!later.contains(&Role::Cupid));
        assert_eq!(later.first(), Some(&Role::TwoSisters));
        let seer = later.iter().position(|r| *r == Role::Seer).unwrap();
        let wolves = later.iter().position(|r| *r == Role::SimpleWerewolf).unwrap();
        assert!(seer < wolves);
    }
}
