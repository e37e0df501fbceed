use std::io::Write;
use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use baneblade_shared::*;
use baneblade_sim::analyzer::{self, EngagementMetrics};
use baneblade_sim::run_baneblade;

use crate::CliError;

/// A sweepable tuning parameter with its name, range, and accessor.
pub struct SweepParam {
    pub name: &'static str,
    min: f64,
    max: f64,
    /// Apply this parameter value to an AgentConfig.
    apply: fn(&mut AgentConfig, f64),
}

pub const SWEEP_PARAMS: &[SweepParam] = &[
    SweepParam {
        name: "approach_distance",
        min: 100.0,
        max: 250.0,
        apply: |c, v| c.approach_distance = v,
    },
    SweepParam {
        name: "standoff_distance",
        min: 80.0,
        max: 220.0,
        apply: |c, v| c.standoff_distance = v,
    },
    SweepParam {
        name: "base_turn_rate",
        min: 2.0,
        max: 8.0,
        apply: |c, v| c.base_turn_rate = v,
    },
    SweepParam {
        name: "speed_budget",
        min: 8.0,
        max: 16.0,
        apply: |c, v| c.speed_budget = v,
    },
    SweepParam {
        name: "evade_distance",
        min: 30.0,
        max: 150.0,
        apply: |c, v| c.evade_distance = v,
    },
    SweepParam {
        name: "gun_lead_divisor",
        min: 10.0,
        max: 30.0,
        apply: |c, v| c.gun_lead_divisor = v,
    },
    SweepParam {
        name: "fire_power_scale",
        min: 200.0,
        max: 700.0,
        apply: |c, v| c.fire_power_scale = v,
    },
    SweepParam {
        name: "fire_tolerance_degrees",
        min: 5.0,
        max: 30.0,
        apply: |c, v| c.fire_tolerance_degrees = v,
    },
];

/// Match outcomes and metrics averaged over a batch of seeds.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub mean_metrics: EngagementMetrics,
}

impl Aggregate {
    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches as f64
        }
    }

    fn from_runs(runs: &[(MatchOutcome, EngagementMetrics)]) -> Self {
        let mut agg = Aggregate {
            matches: runs.len() as u32,
            ..Default::default()
        };
        if runs.is_empty() {
            return agg;
        }
        let n = runs.len() as f64;
        let m = &mut agg.mean_metrics;
        for (outcome, metrics) in runs {
            match outcome {
                MatchOutcome::AgentWin => agg.wins += 1,
                MatchOutcome::OpponentWin => agg.losses += 1,
                MatchOutcome::Draw => agg.draws += 1,
            }
            m.observation_ratio += metrics.observation_ratio / n;
            m.threat_events += metrics.threat_events;
            m.shots_fired += metrics.shots_fired;
            m.hits += metrics.hits;
            m.mean_distance += metrics.mean_distance / n;
            m.orbit_fraction += metrics.orbit_fraction / n;
            m.wall_hits += metrics.wall_hits;
        }
        m.hit_rate = if m.shots_fired > 0 {
            m.hits as f64 / m.shots_fired as f64
        } else {
            0.0
        };
        agg
    }
}

/// A single match job to be run in parallel.
struct MatchJob {
    config: MatchConfig,
}

fn run_job(job: &MatchJob) -> (MatchOutcome, EngagementMetrics) {
    let replay = run_baneblade(&job.config);
    (replay.result.outcome, analyzer::analyze(&replay))
}

fn jobs_for(
    agent: AgentConfig,
    opponents: &[OpponentScript],
    seeds: u32,
    max_ticks: u64,
) -> Vec<MatchJob> {
    opponents
        .iter()
        .flat_map(|&opponent| {
            (0..seeds).map(move |seed| MatchJob {
                config: MatchConfig {
                    seed: seed as u64,
                    max_ticks,
                    opponent,
                    agent,
                },
            })
        })
        .collect()
}

/// Run every (opponent, seed) pair for one agent tuning on the rayon pool.
pub fn evaluate(
    agent: AgentConfig,
    opponents: &[OpponentScript],
    seeds: u32,
    max_ticks: u64,
) -> Aggregate {
    let jobs = jobs_for(agent, opponents, seeds, max_ticks);
    let runs: Vec<(MatchOutcome, EngagementMetrics)> = jobs.par_iter().map(run_job).collect();
    Aggregate::from_runs(&runs)
}

fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![(min + max) / 2.0],
        _ => (0..steps)
            .map(|i| min + (max - min) * i as f64 / (steps - 1) as f64)
            .collect(),
    }
}

fn print_summary_header() {
    println!(
        "{:>14} {:>6} {:>6} {:>6} {:>7} {:>7} {:>7} {:>7} {:>6}",
        "opponent", "wins", "losses", "draws", "win%", "radar%", "hit%", "dist", "orbit%"
    );
    println!("{:-<80}", "");
}

fn print_summary_row(label: &str, agg: &Aggregate) {
    let m = &agg.mean_metrics;
    println!(
        "{:>14} {:>6} {:>6} {:>6} {:>7.1} {:>7.1} {:>7.1} {:>7.1} {:>6.1}",
        label,
        agg.wins,
        agg.losses,
        agg.draws,
        agg.win_rate() * 100.0,
        m.observation_ratio * 100.0,
        m.hit_rate * 100.0,
        m.mean_distance,
        m.orbit_fraction * 100.0,
    );
}

fn print_param_table(param_name: &str, results: &[(f64, Aggregate)]) {
    println!("\n--- {} ---", param_name);
    println!("{:>12} {:>7} {:>7} {:>7}", "value", "win%", "hit%", "dist");
    println!("{:-<36}", "");

    let best_idx = results
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.1.win_rate().total_cmp(&b.1.win_rate()))
        .map(|(i, _)| i);

    for (i, (value, agg)) in results.iter().enumerate() {
        let marker = if Some(i) == best_idx { " *" } else { "" };
        println!(
            "{:>12.3} {:>7.1} {:>7.1} {:>7.1}{}",
            value,
            agg.win_rate() * 100.0,
            agg.mean_metrics.hit_rate * 100.0,
            agg.mean_metrics.mean_distance,
            marker,
        );
    }
}

fn write_csv(path: &Path, all_results: &[(&str, Vec<(f64, Aggregate)>)]) -> Result<(), CliError> {
    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "parameter,value,matches,wins,losses,draws,win_rate,hit_rate,mean_distance,orbit_fraction"
    )?;

    for (param_name, results) in all_results {
        for (value, agg) in results {
            writeln!(
                file,
                "{},{:.4},{},{},{},{},{:.4},{:.4},{:.2},{:.4}",
                param_name,
                value,
                agg.matches,
                agg.wins,
                agg.losses,
                agg.draws,
                agg.win_rate(),
                agg.mean_metrics.hit_rate,
                agg.mean_metrics.mean_distance,
                agg.mean_metrics.orbit_fraction,
            )?;
        }
    }
    println!("\nCSV written to {}", path.display());
    Ok(())
}

pub struct SweepArgs<'a> {
    pub agent: AgentConfig,
    pub opponents: Vec<OpponentScript>,
    pub seeds: u32,
    pub max_ticks: u64,
    pub param: Option<&'a str>,
    pub steps: usize,
    pub output: Option<&'a Path>,
}

pub fn cmd_sweep(args: SweepArgs<'_>) -> Result<(), CliError> {
    let start = std::time::Instant::now();
    let names: Vec<&str> = args.opponents.iter().map(|o| o.name()).collect();
    println!(
        "=== Sweep ===\nOpponents: {} | Seeds: {} | Max ticks: {}",
        names.join(", "),
        args.seeds,
        args.max_ticks,
    );

    println!();
    print_summary_header();
    for &opponent in &args.opponents {
        let agg = evaluate(args.agent, &[opponent], args.seeds, args.max_ticks);
        print_summary_row(opponent.name(), &agg);
    }

    let Some(filter) = args.param else {
        info!(elapsed_s = start.elapsed().as_secs_f32(), "sweep finished");
        return Ok(());
    };

    let params: Vec<&SweepParam> = if filter == "all" {
        SWEEP_PARAMS.iter().collect()
    } else {
        let found = SWEEP_PARAMS
            .iter()
            .find(|p| p.name == filter)
            .ok_or_else(|| CliError::UnknownParam(filter.to_string()))?;
        vec![found]
    };

    let mut all_results = Vec::new();
    for param in params {
        let results: Vec<(f64, Aggregate)> = linspace(param.min, param.max, args.steps)
            .into_iter()
            .map(|value| {
                let mut agent = args.agent;
                (param.apply)(&mut agent, value);
                (value, evaluate(agent, &args.opponents, args.seeds, args.max_ticks))
            })
            .collect();
        print_param_table(param.name, &results);
        all_results.push((param.name, results));
    }

    if let Some(path) = args.output {
        write_csv(path, &all_results)?;
    }

    info!(elapsed_s = start.elapsed().as_secs_f32(), "sweep finished");
    Ok(())
}

pub fn param_names() -> String {
    SWEEP_PARAMS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
}
