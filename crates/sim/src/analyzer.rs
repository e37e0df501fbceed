use baneblade_shared::*;

use crate::movement::Regime;
use crate::threat::ThreatMemory;

/// Aggregate metrics describing how our robot fought a match.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngagementMetrics {
    /// Ticks with a radar detection / ticks played.
    pub observation_ratio: f64,
    /// Observations where the opponent's energy drop looked like a shot.
    pub threat_events: u32,
    pub shots_fired: u32,
    pub hits: u32,
    /// Hits / shots fired.
    pub hit_rate: f64,
    /// Mean centre-to-centre distance over every recorded frame.
    pub mean_distance: f64,
    /// Share of observations handled in the orbit regime.
    pub orbit_fraction: f64,
    pub wall_hits: u32,
}

/// Analyze a replay and compute engagement metrics.
pub fn analyze(replay: &Replay) -> EngagementMetrics {
    let frames = &replay.frames;
    if frames.is_empty() {
        return EngagementMetrics::default();
    }
    let agent = &replay.config.agent;
    let stats = &replay.result.stats;

    let ticks = replay.result.final_tick.max(1);
    let mut observations = 0u32;
    let mut orbiting = 0u32;
    let mut threat_events = 0u32;
    let mut memory = ThreatMemory::new(agent);

    for obs in frames.iter().filter_map(|f| f.observation.as_ref()) {
        observations += 1;
        if memory.observe(obs.energy) {
            threat_events += 1;
        }
        if Regime::select(obs.distance, agent.approach_distance) == Regime::Orbit {
            orbiting += 1;
        }
    }

    let distance_sum: f64 = frames
        .iter()
        .map(|f| {
            let [a, b] = &f.robots;
            (a.x - b.x).hypot(a.y - b.y)
        })
        .sum();

    let hit_rate = if stats.agent_shots > 0 {
        stats.agent_hits as f64 / stats.agent_shots as f64
    } else {
        0.0
    };

    let orbit_fraction = if observations > 0 {
        orbiting as f64 / observations as f64
    } else {
        0.0
    };

    EngagementMetrics {
        observation_ratio: observations as f64 / ticks as f64,
        threat_events,
        shots_fired: stats.agent_shots,
        hits: stats.agent_hits,
        hit_rate,
        mean_distance: distance_sum / frames.len() as f64,
        orbit_fraction,
        wall_hits: stats.agent_wall_hits,
    }
}
