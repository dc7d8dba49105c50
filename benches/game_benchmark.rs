//! Performance benchmarks for the narrator rules engine
//!
//! Two groups:
//!
//! 1. **rules** - the per-decision queries a front end calls on every
//!    refresh (wake-up queue, win evaluation, consequence resolution)
//! 2. **game_execution** - whole automated games, either from a freshly
//!    configured state or from a cloned snapshot of it
//!
//! Games are played with the seeded RandomController on
//! test_setups/full_village.wwg.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use wolf_narrator::{
    core::{PlayerNumber, Role},
    game::{
        active_role_queue, evaluate, resolve, AutoPlayer, GameState, Narrator, RandomController,
        VerbosityLevel,
    },
    loader::SetupFile,
    Result,
};

/// Metrics collected during one automated game
#[derive(Debug, Clone)]
struct GameMetrics {
    nights: u32,
    /// Committed actions (from the undo history)
    actions: usize,
    duration: Duration,
}

impl GameMetrics {
    fn games_per_sec(&self) -> f64 {
        1.0 / self.duration.as_secs_f64()
    }

    fn actions_per_sec(&self) -> f64 {
        self.actions as f64 / self.duration.as_secs_f64()
    }

    fn actions_per_night(&self) -> f64 {
        if self.nights == 0 {
            0.0
        } else {
            self.actions as f64 / self.nights as f64
        }
    }
}

/// Shared benchmark resources
struct BenchmarkSetup {
    initial: GameState,
}

impl BenchmarkSetup {
    fn load() -> Result<Self> {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_setups/full_village.wwg");
        let file = SetupFile::load(&path)?;
        Ok(BenchmarkSetup {
            initial: file.to_game_state(),
        })
    }
}

fn run_game_with_metrics(initial: GameState, seed: u64) -> Result<GameMetrics> {
    let start = Instant::now();
    let mut narrator = Narrator::new(initial).with_verbosity(VerbosityLevel::Silent);
    let mut controller = RandomController::with_seed(seed);
    let result = AutoPlayer::new(&mut narrator, &mut controller, seed).run()?;
    Ok(GameMetrics {
        nights: result.nights_played,
        actions: narrator.history().len(),
        duration: start.elapsed(),
    })
}

/// A mid-game table: lovers, a wild child role model and two revealed deaths
fn mid_game() -> GameState {
    let roles = vec![
        Role::Cupid,
        Role::WildChild,
        Role::Seer,
        Role::Witch,
        Role::Hunter,
        Role::KnightWithRustySword,
        Role::ThreeBrothers,
        Role::SimpleWerewolf,
        Role::SimpleWerewolf,
        Role::BigBadWolf,
        Role::WhiteWerewolf,
    ];
    let n = PlayerNumber::new;
    let mut state = GameState::configure(13, roles, None)
        .start_game()
        .and_then(|s| s.set_cupid_lovers(n(1), n(5)))
        .and_then(|s| s.set_wild_child_role_model(n(3)))
        .expect("mid-game table should configure");
    for (seat, role) in [(10, Role::SimpleWerewolf), (7, Role::ThreeBrothers)] {
        state = state
            .toggle_alive(n(seat))
            .and_then(|s| s.set_revealed_role(n(seat), role))
            .expect("seat exists");
    }
    state
}

fn bench_rules(c: &mut Criterion) {
    let state = mid_game();
    let mut group = c.benchmark_group("rules");

    group.bench_function("active_role_queue", |b| {
        b.iter(|| active_role_queue(black_box(&state)))
    });
    group.bench_function("evaluate", |b| b.iter(|| evaluate(black_box(&state))));
    group.bench_function("resolve_lovers", |b| {
        b.iter(|| resolve(black_box(&state), PlayerNumber::new(1), None))
    });
    group.bench_function("resolve_siblings", |b| {
        b.iter(|| resolve(black_box(&state), PlayerNumber::new(8), Some(Role::ThreeBrothers)))
    });

    group.finish();
}

/// Benchmark: Fresh mode - configure a new game each iteration
fn bench_game_fresh(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);

    let seed = 42u64;
    println!("\nWarmup game (seed {}):", seed);
    if let Ok(metrics) = run_game_with_metrics(setup.initial.clone(), seed) {
        println!("  Nights: {}", metrics.nights);
        println!("  Actions: {}", metrics.actions);
        println!("  Duration: {:?}", metrics.duration);
        println!("  Games/sec: {:.2}", metrics.games_per_sec());
        println!("  Actions/sec: {:.2}", metrics.actions_per_sec());
        println!("  Actions/night: {:.2}", metrics.actions_per_night());
    }

    group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
        b.iter(|| {
            let file = SetupFile::parse(include_str!("../test_setups/full_village.wwg"))
                .expect("setup should parse");
            run_game_with_metrics(file.to_game_state(), black_box(seed))
                .expect("Game should complete successfully")
        });
    });

    group.finish();
}

/// Benchmark: Snapshot mode - clone the parsed initial state each iteration
fn bench_game_snapshot(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);

    let seed = 42u64;
    group.bench_function(BenchmarkId::new("snapshot", seed), |b| {
        b.iter(|| {
            run_game_with_metrics(setup.initial.clone(), black_box(seed))
                .expect("Game should complete successfully")
        });
    });

    group.finish();
}

criterion_group!(benches, bench_rules, bench_game_fresh, bench_game_snapshot);
criterion_main!(benches);
