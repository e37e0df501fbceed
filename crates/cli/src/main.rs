mod sweep;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use baneblade_shared::*;
use baneblade_sim::analyzer::analyze;
use baneblade_sim::run_baneblade;

#[derive(Parser)]
#[command(name = "baneblade", about = "Baneblade robot driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one match against a scripted opponent
    Run {
        /// Random seed for spawns and the robot's own choices
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = MAX_TICKS)]
        max_ticks: u64,

        /// AgentConfig JSON file (defaults apply to missing fields)
        #[arg(long)]
        config: Option<PathBuf>,

        /// circler, oscillator or sitting-duck
        #[arg(long, default_value = "circler")]
        opponent: OpponentScript,

        /// Output path for replay JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run many seeds in parallel and print aggregated metrics
    Sweep {
        #[arg(long, default_value_t = 20)]
        seeds: u32,

        #[arg(long, default_value_t = MAX_TICKS)]
        max_ticks: u64,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Restrict to one opponent (default: all of them)
        #[arg(long)]
        opponent: Option<OpponentScript>,

        /// Also sweep a tuning parameter by name, or "all"
        #[arg(long)]
        param: Option<String>,

        /// Values per swept parameter
        #[arg(long, default_value_t = 5)]
        steps: usize,

        /// CSV output for parameter sweeps
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the default agent tuning as JSON
    Config,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown sweep parameter '{0}' (available: {names})", names = sweep::param_names())]
    UnknownParam(String),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            seed,
            max_ticks,
            config,
            opponent,
            output,
        } => cmd_run(seed, max_ticks, config.as_deref(), opponent, output.as_deref()),

        Commands::Sweep {
            seeds,
            max_ticks,
            config,
            opponent,
            param,
            steps,
            output,
        } => load_agent(config.as_deref()).and_then(|agent| {
            sweep::cmd_sweep(sweep::SweepArgs {
                agent,
                opponents: opponent.map_or_else(|| OpponentScript::ALL.to_vec(), |o| vec![o]),
                seeds,
                max_ticks,
                param: param.as_deref(),
                steps,
                output: output.as_deref(),
            })
        }),

        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

fn load_agent(path: Option<&Path>) -> Result<AgentConfig, CliError> {
    match path {
        Some(path) => {
            let agent = AgentConfig::load(path)?;
            info!(path = %path.display(), "loaded agent config");
            Ok(agent)
        }
        None => Ok(AgentConfig::default()),
    }
}

fn cmd_run(
    seed: u64,
    max_ticks: u64,
    config_path: Option<&Path>,
    opponent: OpponentScript,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let config = MatchConfig {
        seed,
        max_ticks,
        opponent,
        agent: load_agent(config_path)?,
    };

    println!("Running match: baneblade vs {} (seed={})", opponent.name(), seed);

    let replay = run_baneblade(&config);
    let result = &replay.result;
    let metrics = analyze(&replay);

    println!();
    println!("=== Match Result ===");
    println!("Outcome:    {:?}", result.outcome);
    println!("Reason:     {:?}", result.reason);
    println!("Final tick: {}", result.final_tick);
    println!();
    println!("--- Stats ---");
    println!(
        "  baneblade:  energy={:.1}, hits={}, shots={}, wall hits={}",
        result.stats.agent_energy,
        result.stats.agent_hits,
        result.stats.agent_shots,
        result.stats.agent_wall_hits
    );
    println!(
        "  {:<10}  energy={:.1}, hits={}, shots={}",
        opponent.name(),
        result.stats.opponent_energy,
        result.stats.opponent_hits,
        result.stats.opponent_shots
    );
    println!();
    println!("--- Engagement ---");
    println!("  radar contact:   {:.1}%", metrics.observation_ratio * 100.0);
    println!("  dodges:          {}", metrics.threat_events);
    println!("  hit rate:        {:.1}%", metrics.hit_rate * 100.0);
    println!("  mean distance:   {:.1}", metrics.mean_distance);
    println!("  orbiting:        {:.1}%", metrics.orbit_fraction * 100.0);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&replay)?;
        std::fs::write(path, json)?;
        println!("\nReplay written to {}", path.display());
    }
    Ok(())
}

fn cmd_config() -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&AgentConfig::default())?);
    Ok(())
}
