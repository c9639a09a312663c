//! Kuhn Poker Solver
//!
//! Runs CFR on Kuhn Poker and prints the equilibrium and the value of the
//! game for the first player.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cfr_solver::cfr::{CFRConfig, CFRSolver};
use cfr_solver::games::kuhn::KuhnNode;

/// Closed-form value of Kuhn Poker for the first player.
const KUHN_VALUE: f64 = -1.0 / 18.0;

#[derive(Parser, Debug)]
#[command(about = "Solve Kuhn Poker with counterfactual regret minimization")]
struct Args {
    /// Number of CFR iterations
    #[arg(short, long, default_value_t = 20_000)]
    iterations: u64,

    /// Sample one deal per iteration instead of enumerating all of them
    #[arg(long)]
    sampling: bool,

    /// Seed for chance sampling
    #[arg(long)]
    seed: Option<u64>,

    /// JSON solver config; overrides --sampling and --seed
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the equilibrium as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn solver_config(&self) -> Result<CFRConfig, Box<dyn Error>> {
        if let Some(path) = &self.config {
            return Ok(CFRConfig::from_json(&fs::read_to_string(path)?)?);
        }

        let mut config = CFRConfig::vanilla().with_chance_sampling(self.sampling);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = args.solver_config()?;

    let root = KuhnNode::new();
    let mut solver = CFRSolver::new(&root, config)?;

    let progress = ProgressBar::new(args.iterations);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} iterations ({per_sec}, eta {eta})")?,
    );
    let start = solver.iteration();
    let step = (args.iterations / 100).max(1);
    let stats = solver
        .run_with_callback(args.iterations, step, |stats| {
            progress.set_position(stats.iterations - start)
        })?
        .clone();
    progress.finish_and_clear();

    solver.compute_equilibrium()?;
    let value = solver.value_of_game()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&solver.export_equilibrium())?);
        return Ok(());
    }

    println!("=== Kuhn Poker CFR ===\n");
    println!(
        "{} iterations over {} information sets in {:.2}s ({:.0} it/s)",
        stats.iterations, stats.info_sets, stats.elapsed_seconds, stats.iterations_per_second
    );
    println!(
        "Storage: {:.1} KiB\n",
        solver.storage().memory_usage() as f64 / 1024.0
    );

    let export = solver.export_equilibrium();
    for (info_set, strategy) in &export.strategies {
        if info_set == "." {
            continue;
        }
        let row: Vec<String> = strategy
            .iter()
            .map(|(action, p)| format!("{}={:.3}", action, p))
            .collect();
        println!("  {:<20} {}", info_set, row.join("  "));
    }

    println!();
    println!("Value of the game: {:.4} (expected {:.4})", value, KUHN_VALUE);

    Ok(())
}
