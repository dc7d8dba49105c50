//! Setup file parser (.wwg)
//!
//! INI-style files with `[metadata]` and `[setup]` sections:
//!
//! ```text
//! [metadata]
//! Name: Classic 8
//! Description: Seer and witch against three wolves
//!
//! [setup]
//! players=8
//! seer
//! witch
//! 4 villager
//! 2 simple-werewolf
//! unused=hunter;villager
//! names=Alice;Bob;;Dana
//! ```

use crate::core::{PlayerName, PlayerNumber, Role};
use crate::game::{GameSetup, GameState};
use crate::{NarratorError, Result};
use nom::{
    branch::alt,
    bytes::complete::{take_till, take_while1},
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map, map_res, opt, rest},
    sequence::{pair, separated_pair, terminated, tuple},
    IResult,
};
use rustc_hash::FxHashMap;
use std::path::Path;

/// `[metadata]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A parsed setup file
#[derive(Debug, Clone, PartialEq)]
pub struct SetupFile {
    pub metadata: SetupMetadata,
    pub setup: GameSetup,
    /// One entry per seat; `None` for seats left unnamed
    pub names: Vec<Option<PlayerName>>,
}

/// One meaningful line of the `[setup]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetupLine<'a> {
    Setting(&'a str, &'a str),
    Roles(u32, &'a str),
}

fn setting(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        tuple((space0, char('='), space0)),
        rest,
    )(input)
}

fn count(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

/// `<count> <role>` or `<role>`
fn role_line(input: &str) -> IResult<&str, (u32, &str)> {
    map(pair(opt(terminated(count, space1)), rest), |(n, role)| {
        (n.unwrap_or(1), role)
    })(input)
}

fn setup_line(input: &str) -> IResult<&str, SetupLine<'_>> {
    all_consuming(alt((
        map(setting, |(key, value)| SetupLine::Setting(key, value)),
        map(role_line, |(n, role)| SetupLine::Roles(n, role)),
    )))(input)
}

/// `Key: value`
fn metadata_line(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_till(|c| c == ':'), char(':'), rest)(input)
}

impl SetupFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let sections = parse_sections(contents);

        let metadata = match sections.get("metadata") {
            Some(lines) => parse_metadata(lines)?,
            None => SetupMetadata::default(),
        };
        let lines = sections.get("setup").ok_or_else(|| {
            NarratorError::InvalidSetupFormat("missing [setup] section".to_string())
        })?;
        let (setup, names) = parse_setup(lines)?;

        Ok(SetupFile {
            metadata,
            setup,
            names,
        })
    }

    /// A fresh game configured from this file, with the names applied
    pub fn to_game_state(&self) -> GameState {
        let mut state = GameState::from_setup(self.setup.clone());
        for (player, name) in state.players.iter_mut().zip(&self.names) {
            player.name = name.clone();
        }
        state
    }
}

/// Split into lowercase section name -> trimmed, comment-free lines
fn parse_sections(contents: &str) -> FxHashMap<String, Vec<String>> {
    let mut sections: FxHashMap<String, Vec<String>> = FxHashMap::default();
    let mut current: Option<String> = None;

    for line in contents.lines() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_lowercase();
            sections.entry(name.clone()).or_default();
            current = Some(name);
        } else if let Some(name) = &current {
            sections.entry(name.clone()).or_default().push(line.to_string());
        }
        // Lines before the first section are ignored
    }
    sections
}

fn parse_metadata(lines: &[String]) -> Result<SetupMetadata> {
    let mut metadata = SetupMetadata::default();
    for line in lines {
        let (_, (key, value)) = metadata_line(line).map_err(|_| {
            NarratorError::InvalidSetupFormat(format!("expected `Key: value`, got `{}`", line))
        })?;
        let value = value.trim().to_string();
        match key.trim().to_lowercase().as_str() {
            "name" => metadata.name = Some(value),
            "description" => metadata.description = Some(value),
            _ => {}
        }
    }
    Ok(metadata)
}

fn parse_role(name: &str) -> Result<Role> {
    name.trim().parse::<Role>()
}

fn parse_setup(lines: &[String]) -> Result<(GameSetup, Vec<Option<PlayerName>>)> {
    let mut player_count: Option<u32> = None;
    // (copies, role), expanded once the player count is known
    let mut role_lines: Vec<(u32, Role)> = Vec::new();
    let mut unused: Option<[Role; 2]> = None;
    let mut names: Vec<Option<PlayerName>> = Vec::new();

    for line in lines {
        let (_, parsed) = setup_line(line).map_err(|_| {
            NarratorError::InvalidSetupFormat(format!("cannot parse line `{}`", line))
        })?;
        match parsed {
            SetupLine::Setting(key, value) => match key.to_lowercase().as_str() {
                "players" => {
                    let n = value.trim().parse::<u32>().map_err(|_| {
                        NarratorError::InvalidSetupFormat(format!(
                            "players must be a number, got `{}`",
                            value
                        ))
                    })?;
                    player_count = Some(n);
                }
                "unused" => {
                    let cards = value
                        .split(';')
                        .map(parse_role)
                        .collect::<Result<Vec<_>>>()?;
                    match cards.as_slice() {
                        [a, b] => unused = Some([*a, *b]),
                        _ => {
                            return Err(NarratorError::InvalidSetupFormat(format!(
                                "unused needs exactly two roles, got {}",
                                cards.len()
                            )))
                        }
                    }
                }
                "names" => {
                    names = value
                        .split(';')
                        .map(|name| {
                            let name = name.trim();
                            (!name.is_empty()).then(|| PlayerName::new(name))
                        })
                        .collect();
                }
                other => {
                    return Err(NarratorError::InvalidSetupFormat(format!(
                        "unknown setting `{}`",
                        other
                    )))
                }
            },
            SetupLine::Roles(n, name) => {
                let role = parse_role(name)?;
                if role.is_sibling_group() {
                    // One card covers the whole group; "2 two-sisters" means the same
                    if n != 1 && n != role.slot_count() {
                        return Err(NarratorError::InvalidSetupFormat(format!(
                            "{} is one group of {} seats",
                            role.display_name(),
                            role.slot_count()
                        )));
                    }
                    role_lines.push((1, role));
                } else {
                    role_lines.push((n, role));
                }
            }
        }
    }

    let player_count = player_count.ok_or_else(|| {
        NarratorError::InvalidSetupFormat("missing players=<count>".to_string())
    })?;
    if names.len() > player_count as usize {
        return Err(NarratorError::InvalidSetupFormat(format!(
            "{} names for {} players",
            names.len(),
            player_count
        )));
    }
    names.resize(player_count as usize, None);

    let mut roles: Vec<Role> = Vec::new();
    let mut seats = 0u64;
    for (copies, role) in role_lines {
        seats += u64::from(copies) * u64::from(role.slot_count());
        if seats > u64::from(player_count) {
            return Err(NarratorError::InvalidSetup(format!(
                "roles fill more than the {} seats configured",
                player_count
            )));
        }
        roles.extend(std::iter::repeat(role).take(copies as usize));
    }

    let setup = GameSetup {
        player_count,
        selected_roles: roles,
        unused_roles: unused,
    };
    setup.validate()?;
    Ok((setup, names))
}

/// Seat number of each named player, for narrator lookups by name
pub fn seat_by_name(file: &SetupFile, name: &str) -> Option<PlayerNumber> {
    file.names
        .iter()
        .position(|n| {
            n.as_ref()
                .map(|n| n.as_str().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .map(|idx| PlayerNumber::new(idx as u32 + 1))
}
