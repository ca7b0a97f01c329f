//! PlantGrid Headless Harness
//!
//! Generates plant layouts from the command line and sweeps the layout
//! invariants over many seeded trials. Runs entirely in-process: no UI,
//! no rendering beyond an ASCII grid.
//!
//! Usage:
//!   cargo run -p plantgrid-simtest -- generate --width 10 --height 10 --exits 0,99
//!   cargo run -p plantgrid-simtest -- generate -W 8 -H 6 --exits 3 --mode best-of --json
//!   cargo run -p plantgrid-simtest -- check --verbose

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use plantgrid_logic::carver::carve_with_stats;
use plantgrid_logic::config::{ConfigError, SearchConfig};
use plantgrid_logic::exits::{compute_layout, ExitSet};
use plantgrid_logic::grid::Grid;
use plantgrid_logic::layout::{validate_layout, Layout};
use plantgrid_logic::search::{
    density_target, run_best_of_search, run_density_search, SearchStatus,
};
use plantgrid_search::SearchController;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "plantgrid-simtest", about = "PlantGrid layout harness")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a layout for one grid
    Generate(GenerateArgs),
    /// Sweep layout invariants over seeded trials
    Check(CheckArgs),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
enum Mode {
    /// One attempt
    Single,
    /// First layout reaching the density target
    Density,
    /// Best of N attempts
    BestOf,
}

#[derive(Args)]
struct GenerateArgs {
    /// Grid width in cells
    #[arg(short = 'W', long, default_value_t = 10)]
    width: usize,

    /// Grid height in cells
    #[arg(short = 'H', long, default_value_t = 10)]
    height: usize,

    /// Perimeter exit cells, comma separated
    #[arg(long, value_delimiter = ',')]
    exits: Vec<usize>,

    /// Blocked cells, comma separated
    #[arg(long, value_delimiter = ',')]
    blocked: Vec<usize>,

    #[arg(long, value_enum, default_value_t = Mode::Density)]
    mode: Mode,

    /// Search config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the density target (0-1)
    #[arg(long)]
    density: Option<f64>,

    /// Override the density attempt cap
    #[arg(long)]
    attempt_cap: Option<usize>,

    /// Override the best-of attempt count
    #[arg(long)]
    attempts: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// Seeded trials per grid
    #[arg(long, default_value_t = 100)]
    trials: u64,
}

#[derive(Serialize)]
struct GenerateReport {
    mode: Mode,
    attempts: usize,
    succeeded: bool,
    plants: usize,
    layout: Option<Layout>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    match cli.command {
        Command::Generate(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(generate(args))
        }
        Command::Check(args) => {
            if !check(&args, cli.verbose) {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

// ── generate ───────────────────────────────────────────────────────────

fn load_config(args: &GenerateArgs) -> Result<SearchConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SearchConfig::default(),
    };
    if let Some(density) = args.density {
        config.density = density;
    }
    if let Some(cap) = args.attempt_cap {
        config.attempt_cap = cap;
    }
    if let Some(attempts) = args.attempts {
        config.best_of_attempts = attempts;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

async fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args)?;
    let grid = Grid::with_blocked(args.width, args.height, args.blocked.iter().copied())?;
    let exits = ExitSet::new(&grid, args.exits.iter().copied())?;
    let controller = SearchController::new(config)?;

    let mut rx = controller.subscribe();
    let show_progress = !args.json;
    let progress = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let attempts = rx.borrow_and_update().attempts;
            if show_progress {
                eprint!("\rAttempt: {}", attempts);
            }
        }
    });

    let report = match args.mode {
        Mode::Single => {
            let layout = controller.compute_once(&grid, &exits).await?;
            GenerateReport {
                mode: args.mode,
                attempts: 1,
                succeeded: true,
                plants: layout.plant_count(),
                layout: Some(layout),
            }
        }
        Mode::Density => {
            let outcome = controller.run_density(&grid, &exits).await?;
            GenerateReport {
                mode: args.mode,
                attempts: outcome.attempts,
                succeeded: outcome.succeeded,
                plants: outcome.layout.as_ref().map_or(0, Layout::plant_count),
                layout: outcome.layout,
            }
        }
        Mode::BestOf => {
            let outcome = controller.run_best_of(&grid, &exits).await?;
            GenerateReport {
                mode: args.mode,
                attempts: outcome.attempts,
                succeeded: outcome.layout.is_some(),
                plants: outcome.layout.as_ref().map_or(0, Layout::plant_count),
                layout: outcome.layout,
            }
        }
    };
    progress.abort();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if show_progress && args.mode != Mode::Single {
        eprintln!();
    }
    match &report.layout {
        Some(layout) => {
            print!("{}", layout.render_ascii(&grid));
            println!("Total Plants: {}", report.plants);
        }
        None => println!(
            "No layout reached {} plants in {} attempts",
            density_target(grid.dims(), controller.config().density),
            report.attempts
        ),
    }
    Ok(())
}

// ── check ──────────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(args: &CheckArgs, verbose: bool) -> bool {
    println!("=== PlantGrid Layout Harness ===\n");

    let mut results = Vec::new();
    results.extend(validate_reachability(args.trials));
    results.extend(validate_edge_cases());
    results.extend(validate_density_search());
    results.extend(validate_best_of_search());

    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    failed == 0
}

fn sweep_grids() -> Vec<(&'static str, Grid, Vec<usize>)> {
    let mut grids = Vec::new();
    let cases: [(&str, usize, usize, Vec<usize>, Vec<usize>); 5] = [
        ("3x3_corner", 3, 3, vec![0], vec![]),
        ("10x10_two_exits", 10, 10, vec![0, 99], vec![]),
        ("12x5_all_corners", 12, 5, vec![0, 11, 48, 59], vec![]),
        ("1x9_strip", 1, 9, vec![4], vec![]),
        ("8x8_pillars", 8, 8, vec![0, 63], vec![18, 21, 42, 45]),
    ];
    for (name, w, h, exits, blocked) in cases {
        match Grid::with_blocked(w, h, blocked) {
            Ok(grid) => grids.push((name, grid, exits)),
            Err(e) => log::error!("sweep grid {} is invalid: {}", name, e),
        }
    }
    grids
}

fn validate_reachability(trials: u64) -> Vec<TestResult> {
    println!("--- Reachability ---");
    let mut results = Vec::new();

    for (name, grid, exit_cells) in sweep_grids() {
        let exits = match ExitSet::new(&grid, exit_cells) {
            Ok(e) => e,
            Err(e) => {
                results.push(TestResult {
                    name: format!("reachability_{}", name),
                    passed: false,
                    detail: format!("bad exits: {}", e),
                });
                continue;
            }
        };

        let mut failures = Vec::new();
        let mut sizes = Vec::new();
        for seed in 0..trials {
            let mut rng = StdRng::seed_from_u64(seed);
            let layout = compute_layout(&grid, &exits, &mut rng);
            let errors = validate_layout(&grid, &exits, &layout);
            if !errors.is_empty() {
                failures.push(format!("seed {}: {}", seed, errors[0].message));
            }
            sizes.push(layout.plant_count());
        }
        let min = sizes.iter().min().copied().unwrap_or(0);
        let max = sizes.iter().max().copied().unwrap_or(0);

        results.push(TestResult {
            name: format!("reachability_{}", name),
            passed: failures.is_empty(),
            detail: if failures.is_empty() {
                format!("{} trials, plants {}..={}", trials, min, max)
            } else {
                format!("{} failures, first: {}", failures.len(), failures[0])
            },
        });
    }
    results
}

fn validate_edge_cases() -> Vec<TestResult> {
    println!("--- Edge Cases ---");
    let mut results = Vec::new();

    if let Ok(grid) = Grid::new(1, 1) {
        let (layout, stats) = carve_with_stats(&grid, 0, &mut StdRng::seed_from_u64(0));
        results.push(TestResult {
            name: "single_cell_exit".into(),
            passed: layout.plants.is_empty() && stats.path_searches == 0,
            detail: format!(
                "{} plants, {} path searches",
                layout.plant_count(),
                stats.path_searches
            ),
        });
    }

    if let Ok(grid) = Grid::new(5, 5) {
        let a = compute_layout(&grid, &ExitSet::none(), &mut StdRng::seed_from_u64(1));
        let b = compute_layout(&grid, &ExitSet::none(), &mut StdRng::seed_from_u64(2));
        results.push(TestResult {
            name: "no_exits_all_cells".into(),
            passed: a.plant_count() == 25 && a == b,
            detail: format!("{} plants", a.plant_count()),
        });
    }

    results.push(TestResult {
        name: "zero_width_rejected".into(),
        passed: Grid::new(0, 5).is_err(),
        detail: "0x5 grid → GridError".into(),
    });

    if let Ok(grid) = Grid::new(4, 4) {
        results.push(TestResult {
            name: "interior_exit_rejected".into(),
            passed: ExitSet::new(&grid, [5]).is_err(),
            detail: "cell 5 of 4x4 is interior".into(),
        });
    }

    if let Ok(grid) = Grid::with_blocked(3, 3, [1, 4, 7]) {
        let (layout, stats) = carve_with_stats(&grid, 0, &mut StdRng::seed_from_u64(0));
        results.push(TestResult {
            name: "walled_off_cells_dropped".into(),
            passed: stats.dropped == 3
                && ExitSet::new(&grid, [0])
                    .map_or(false, |exits| validate_layout(&grid, &exits, &layout).is_empty()),
            detail: format!("{} dropped", stats.dropped),
        });
    }

    results
}

fn validate_density_search() -> Vec<TestResult> {
    println!("--- Density Search ---");
    let mut results = Vec::new();
    let Ok(grid) = Grid::new(10, 10) else {
        return results;
    };
    let Ok(exits) = ExitSet::new(&grid, [0, 99]) else {
        return results;
    };

    let zero = match run_density_search(&grid, &exits, 0.0, 1000, &mut StdRng::seed_from_u64(0), |_| {}) {
        Ok(outcome) => outcome,
        Err(e) => {
            results.push(rejected("density_zero_first_attempt", e));
            return results;
        }
    };
    results.push(TestResult {
        name: "density_zero_first_attempt".into(),
        passed: zero.succeeded && zero.attempts == 1,
        detail: format!("{} attempts", zero.attempts),
    });

    let target = density_target(grid.dims(), 0.5);
    let half = match run_density_search(&grid, &exits, 0.5, 1000, &mut StdRng::seed_from_u64(0), |_| {}) {
        Ok(outcome) => outcome,
        Err(e) => {
            results.push(rejected("density_half_meets_target", e));
            return results;
        }
    };
    let meets = half
        .layout
        .as_ref()
        .map_or(!half.succeeded, |l| l.plant_count() >= target);
    results.push(TestResult {
        name: "density_half_meets_target".into(),
        passed: half.attempts <= 1000 && meets,
        detail: format!(
            "succeeded={} after {} attempts (target {})",
            half.succeeded, half.attempts, target
        ),
    });

    let mut finals = 0;
    let impossible = match run_density_search(
        &grid,
        &exits,
        1.0,
        30,
        &mut StdRng::seed_from_u64(0),
        |s: &SearchStatus| {
            if !s.loading {
                finals += 1;
            }
        },
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            results.push(rejected("density_cap_respected", e));
            return results;
        }
    };
    results.push(TestResult {
        name: "density_cap_respected".into(),
        passed: !impossible.succeeded && impossible.attempts == 30 && finals == 1,
        detail: format!("{} attempts, {} completions", impossible.attempts, finals),
    });

    let nan = run_density_search(&grid, &exits, f64::NAN, 10, &mut StdRng::seed_from_u64(0), |_| {});
    results.push(TestResult {
        name: "density_nan_rejected".into(),
        passed: nan.is_err(),
        detail: match nan {
            Ok(outcome) => format!("accepted, {} attempts", outcome.attempts),
            Err(e) => e.to_string(),
        },
    });

    results
}

fn rejected(name: &str, e: ConfigError) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: format!("rejected: {}", e),
    }
}

fn validate_best_of_search() -> Vec<TestResult> {
    println!("--- Best-of Search ---");
    let mut results = Vec::new();
    let Ok(grid) = Grid::new(8, 8) else {
        return results;
    };
    let Ok(exits) = ExitSet::new(&grid, [0, 7]) else {
        return results;
    };
    let n = 50;

    let mut replay = StdRng::seed_from_u64(5);
    let expected = (0..n)
        .map(|_| compute_layout(&grid, &exits, &mut replay).plant_count())
        .max()
        .unwrap_or(0);

    let outcome = run_best_of_search(&grid, &exits, n, &mut StdRng::seed_from_u64(5), |_| {});
    let got = outcome.layout.as_ref().map_or(0, Layout::plant_count);
    results.push(TestResult {
        name: "best_of_exact_attempts".into(),
        passed: outcome.attempts == n,
        detail: format!("{} attempts", outcome.attempts),
    });
    results.push(TestResult {
        name: "best_of_keeps_maximum".into(),
        passed: got == expected,
        detail: format!("{} plants (replayed max {})", got, expected),
    });

    results
}
