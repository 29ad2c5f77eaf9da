//! Geodemax - Command Line Interface
//!
//! This is the main entry point for the build-order optimizer.
//! Run with `--help` to see all available options.

use clap::{Parser, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geodemax::{
    data::{load_scenarios, resolve_format, InputFormat},
    display::{display_aggregate, display_header, display_results},
    models::{Resource, ScenarioDefinition},
    optimizer::SearchOptions,
    scheduler::{product_of_first, quality_level_sum, ScenarioResult, Scheduler, SchedulerConfig},
};

/// Which aggregate(s) to compute.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    /// Sum of id times best value
    One,
    /// Product of the best values of the first scenarios
    Two,
    /// Both of the above
    Both,
}

/// Command-line arguments for Geodemax.
#[derive(Parser, Debug)]
#[command(name = "geodemax")]
#[command(author, version, about = "Find the best build order for a production chain", long_about = None)]
struct Args {
    /// Scenario file (blueprint text or CSV recipe table)
    #[arg(default_value = "data.txt")]
    input: PathBuf,

    /// Input format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: InputFormat,

    /// Which aggregate to compute
    #[arg(short, long, value_enum, default_value = "both")]
    part: Part,

    /// Ticks simulated for the quality level sum
    #[arg(long, default_value = "24")]
    quality_minutes: u32,

    /// Ticks simulated for the product
    #[arg(long, default_value = "32")]
    product_minutes: u32,

    /// Number of leading scenarios multiplied together
    #[arg(long, default_value = "3")]
    product_count: usize,

    /// Resource to maximize
    #[arg(short, long, value_enum, default_value = "geode")]
    target: Resource,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Disable the optimistic bound
    #[arg(long, default_value = "false")]
    no_prune: bool,

    /// Disable the dominance rule
    #[arg(long, default_value = "false")]
    no_dominance: bool,

    /// Print search statistics per scenario
    #[arg(long, default_value = "false")]
    stats: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn scheduler_config(&self, time_budget: u32) -> SchedulerConfig {
        let mut config = SchedulerConfig::new(time_budget);
        config.target = self.target;
        config.threads = self.threads;
        config.options = SearchOptions {
            prune_by_bound: !self.no_prune,
            skip_dominated: !self.no_dominance,
        };
        config
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one batch, prints its results and returns the aggregate.
fn run_part<F>(
    args: &Args,
    title: &str,
    label: &str,
    time_budget: u32,
    scenarios: &[ScenarioDefinition],
    aggregate: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&[ScenarioResult]) -> u64,
{
    let scheduler = Scheduler::new(args.scheduler_config(time_budget))?;
    display_header(title, time_budget, args.target);

    let started = Instant::now();
    let results = scheduler.run(scenarios);
    let elapsed = started.elapsed();
    info!(scenarios = scenarios.len(), elapsed_ms = elapsed.as_millis() as u64, "batch finished");

    display_results(&results, args.target, args.stats);

    let results = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    display_aggregate(label, aggregate(&results), elapsed);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    if !args.input.exists() {
        eprintln!("Error: input file '{}' not found.", args.input.display());
        std::process::exit(1);
    }

    println!("Geodemax - Production Chain Optimizer");
    println!("================================================================");
    println!();
    println!("Configuration:");
    println!("  Input:           {}", args.input.display());
    println!("  Format:          {:?}", resolve_format(&args.input, args.format));
    println!("  Target:          {}", args.target);
    println!(
        "  Threads:         {}",
        args.threads.map_or_else(|| "auto".to_string(), |t| t.to_string())
    );
    if args.no_prune || args.no_dominance {
        println!(
            "  Disabled rules:  {}{}",
            if args.no_prune { "bound " } else { "" },
            if args.no_dominance { "dominance" } else { "" }
        );
    }

    let scenarios = load_scenarios(&args.input, args.format)?;
    info!(count = scenarios.len(), "loaded scenarios");
    println!();
    println!("Loaded {} scenarios.", scenarios.len());

    if matches!(args.part, Part::One | Part::Both) {
        run_part(
            &args,
            "QUALITY LEVEL SUM",
            "Quality level",
            args.quality_minutes,
            &scenarios,
            quality_level_sum,
        )?;
    }

    if matches!(args.part, Part::Two | Part::Both) {
        let count = args.product_count.min(scenarios.len());
        run_part(
            &args,
            "PRODUCT OF LEADING SCENARIOS",
            "Product",
            args.product_minutes,
            &scenarios[..count],
            |results| product_of_first(results, count),
        )?;
    }

    Ok(())
}
