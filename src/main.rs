//! Wolf Narrator - command line front end
//!
//! Configure games from setup files, inspect saved snapshots, and run
//! automated games for testing and balance checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wolf_narrator::{
    game::{
        active_role_queue, evaluate, AutoPlayer, GameSnapshot, Narrator, NarratorController,
        RandomController, VerbosityLevel, ZeroController,
    },
    loader::SetupFile,
    simulation::{self, ControllerType as SimController},
};

/// Controller type for automated games
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Always takes the first legal option
    Zero,
    /// Seeded random choices
    Random,
}

impl From<ControllerType> for SimController {
    fn from(kind: ControllerType) -> Self {
        match kind {
            ControllerType::Zero => SimController::Zero,
            ControllerType::Random => SimController::Random,
        }
    }
}

/// Verbosity level (names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "narrator")]
#[command(about = "Wolf Narrator - rules assistant for werewolf party games", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure a game from a setup file and save it as a snapshot
    New {
        /// Setup file (.wwg)
        #[arg(value_name = "SETUP")]
        setup: PathBuf,

        /// Snapshot to write
        #[arg(long, short = 'o', default_value = "game.json")]
        output: PathBuf,
    },

    /// Print tonight's wake-up order for a saved game
    Queue {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },

    /// Print the roster and the win evaluation for a saved game
    Status {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },

    /// Play one automated game and print the narration
    Autoplay {
        #[arg(value_name = "SETUP")]
        setup: PathBuf,

        /// Seed for dealing and for the random controller
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, value_enum, default_value = "random")]
        controller: ControllerType,

        /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Stop after this many nights
        #[arg(long, default_value_t = 50)]
        max_rounds: u32,

        /// Save the final state here
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Play many automated games in parallel and report win rates
    Simulate {
        #[arg(value_name = "SETUP")]
        setup: PathBuf,

        #[arg(long, default_value_t = 1000)]
        games: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, value_enum, default_value = "random")]
        controller: ControllerType,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::New { setup, output } => run_new(setup, output),
        Commands::Queue { snapshot } => run_queue(snapshot),
        Commands::Status { snapshot } => run_status(snapshot),
        Commands::Autoplay {
            setup,
            seed,
            controller,
            verbosity,
            max_rounds,
            save,
        } => run_autoplay(setup, seed, controller, verbosity.into(), max_rounds, save),
        Commands::Simulate {
            setup,
            games,
            seed,
            controller,
        } => run_simulate(setup, games, seed, controller),
    }
}

fn load_setup(path: &PathBuf) -> Result<SetupFile> {
    SetupFile::load(path).with_context(|| format!("loading setup file {}", path.display()))
}

fn load_snapshot(path: &PathBuf) -> Result<GameSnapshot> {
    GameSnapshot::load_from_file(path)
        .with_context(|| format!("loading snapshot {}", path.display()))
}

fn run_new(setup: PathBuf, output: PathBuf) -> Result<()> {
    let file = load_setup(&setup)?;
    let state = file.to_game_state();
    GameSnapshot::new(state)
        .save_to_file(&output)
        .with_context(|| format!("writing snapshot {}", output.display()))?;

    let name = file.metadata.name.as_deref().unwrap_or("Untitled game");
    println!(
        "{}: {} players, saved to {}",
        name,
        file.setup.player_count,
        output.display()
    );
    Ok(())
}

fn run_queue(snapshot: PathBuf) -> Result<()> {
    let state = load_snapshot(&snapshot)?.game_state;
    let night = state.night.current_night_number.max(1);
    let queue = if state.night.active_roles.is_empty() {
        active_role_queue(&state)
    } else {
        state.night.active_roles.clone()
    };

    println!("Night {} wake-up order:", night);
    if queue.is_empty() {
        println!("  (nobody wakes)");
    }
    for (idx, role) in queue.iter().enumerate() {
        let marker = if state.night.active_role() == Some(*role) {
            ">"
        } else {
            " "
        };
        println!("{} {:>2}. {}", marker, idx + 1, role.display_name());
    }
    Ok(())
}

fn run_status(snapshot: PathBuf) -> Result<()> {
    let state = load_snapshot(&snapshot)?.game_state;
    println!(
        "Phase: {:?}, night {}, day {}",
        state.phase, state.night.current_night_number, state.day.current_day_number
    );
    for player in &state.players {
        let role = match (player.actual_role, player.assigned_role) {
            (Some(role), _) => format!("{} (revealed)", role.display_name()),
            (None, Some(role)) => role.display_name().to_string(),
            (None, None) => "?".to_string(),
        };
        let status = if player.is_alive { "alive" } else { "dead" };
        println!("  {:<20} {:<6} {}", player.label(), status, role);
    }

    let result = state.winner.clone().unwrap_or_else(|| evaluate(&state));
    match result.message {
        Some(message) if result.has_winner => println!("Result: {}", message),
        _ => println!("Result: no winner yet"),
    }
    Ok(())
}

fn run_autoplay(
    setup: PathBuf,
    seed: u64,
    controller: ControllerType,
    verbosity: VerbosityLevel,
    max_rounds: u32,
    save: Option<PathBuf>,
) -> Result<()> {
    let file = load_setup(&setup)?;
    let mut narrator = Narrator::new(file.to_game_state()).with_verbosity(verbosity);

    let mut zero = ZeroController::new();
    let mut random = RandomController::with_seed(seed);
    let controller: &mut dyn NarratorController = match controller {
        ControllerType::Zero => &mut zero,
        ControllerType::Random => &mut random,
    };

    let result = AutoPlayer::new(&mut narrator, controller, seed)
        .with_max_rounds(max_rounds)
        .run()?;

    if verbosity >= VerbosityLevel::Minimal {
        println!(
            "Game ended after {} night(s): {:?}",
            result.nights_played, result.end_reason
        );
    }
    if let Some(path) = save {
        GameSnapshot::new(narrator.into_state())
            .save_to_file(&path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
    }
    Ok(())
}

fn run_simulate(setup: PathBuf, games: usize, seed: u64, controller: ControllerType) -> Result<()> {
    let file = load_setup(&setup)?;
    println!(
        "Simulating {} games of {} with seed {}\n",
        games,
        file.metadata.name.as_deref().unwrap_or("the setup"),
        seed
    );
    let report = simulation::simulate(&file.setup, games, seed, controller.into())?;
    report.print();
    Ok(())
}
