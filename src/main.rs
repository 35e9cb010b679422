//! CLI entry point for the Cosmic battle simulator

use clap::{Parser, ValueEnum};
use cosmic_sim::{
    battle::BattleOptions,
    boss::behavior_for,
    config::ScenarioConfig,
    simulation::{run_and_aggregate, run_battle, run_battle_with_seed},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "cosmic-sim")]
#[command(version)]
#[command(about = "Card team vs boss battle simulator", long_about = None)]
struct Args {
    /// Path to the scenario file (YAML or JSON)
    #[arg(short, long, required_unless_present = "rules")]
    config: Option<PathBuf>,

    /// Number of battles to run; 1 prints the battle log
    #[arg(short, long)]
    num_sims: Option<usize>,

    /// Use parallel processing
    #[arg(short, long, default_value = "false")]
    parallel: bool,

    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Only log the start and the result of a single battle
    #[arg(short, long, default_value = "false")]
    fast: bool,

    /// Log round events every N rounds (default: scaled to the fight length)
    #[arg(long)]
    log_every: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Show timing information
    #[arg(short, long, default_value = "false")]
    timing: bool,

    /// Print a boss's special rules and exit
    #[arg(long, value_name = "BOSS")]
    rules: Option<String>,

    /// Debug-level diagnostics on stderr
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(name) = &args.rules {
        let rules = behavior_for(name).special_rules();
        match args.output {
            OutputFormat::Text if rules.is_empty() => println!("{name}: no special rules"),
            OutputFormat::Text => {
                println!("{name}:");
                for rule in rules {
                    println!("  - {rule}");
                }
            }
            OutputFormat::Json => print_json(&serde_json::json!({ "boss": name, "rules": rules })),
        }
        return;
    }

    let Some(path) = &args.config else {
        eprintln!("Error: --config is required");
        std::process::exit(2);
    };

    // Load scenario
    let scenario_config = match ScenarioConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading scenario: {}", e);
            std::process::exit(1);
        }
    };
    let scenario = match scenario_config.build() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error building scenario: {}", e);
            std::process::exit(1);
        }
    };

    let seed = args.seed.or(scenario_config.seed);
    let num_sims = args.num_sims.or(scenario_config.num_sims).unwrap_or(1);

    if num_sims <= 1 {
        let options = BattleOptions {
            fast_log: args.fast || scenario_config.fast,
            log_every: args
                .log_every
                .or(scenario_config.log_every)
                .unwrap_or_else(|| scenario.suggested_log_every()),
            max_rounds: scenario.max_rounds,
        };

        let start = Instant::now();
        let result = match seed {
            Some(seed) => run_battle_with_seed(&scenario, &options, seed),
            None => run_battle(&scenario, &options),
        };
        let elapsed = start.elapsed();

        match args.output {
            OutputFormat::Text => {
                for line in &result.log {
                    println!("{line}");
                }
                if args.timing {
                    println!();
                    println!("--- Performance ---");
                    println!("Rounds: {}", result.rounds);
                    println!("Total time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
                }
            }
            OutputFormat::Json => print_json(&result),
        }
        return;
    }

    // Run simulations
    let start = Instant::now();
    let stats = run_and_aggregate(&scenario, num_sims, args.parallel, seed);
    let elapsed = start.elapsed();

    // Output results
    match args.output {
        OutputFormat::Text => {
            println!("=== Battle Simulation Results ===");
            if let Some(boss) = &scenario.boss {
                println!("Boss: {} (realm {})", boss.name, boss.realm);
            }
            println!(
                "Team: {}",
                scenario
                    .team
                    .iter()
                    .map(|card| card.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if !scenario.reserve.is_empty() {
                println!("Reserve: {}", scenario.reserve.len());
            }
            println!();
            println!("{stats}");

            if args.timing {
                println!();
                println!("--- Performance ---");
                println!("Threads: {}", if args.parallel { num_cpus::get() } else { 1 });
                println!("Total time: {:.3}s", elapsed.as_secs_f64());
                println!("Per battle: {:.3}ms", elapsed.as_secs_f64() * 1000.0 / num_sims as f64);
                println!("Battles/sec: {:.0}", num_sims as f64 / elapsed.as_secs_f64());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "simulations": num_sims,
                "parallel": args.parallel,
                "seed": seed,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "stats": stats,
            });
            print_json(&output);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}
