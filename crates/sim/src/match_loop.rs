use baneblade_shared::*;
use tracing::debug;

use crate::baneblade::BanebladePolicy;
use crate::physics::ArenaState;
use crate::policy::Policy;

/// Run a deterministic match of `policy` against the configured script.
///
/// Decisions happen only on ticks where the radar saw the opponent, exactly
/// as a robot host delivers scan events. Every tick is recorded.
pub fn run_match(config: &MatchConfig, policy: &mut dyn Policy) -> Replay {
    let mut state = ArenaState::new_with_seed(config.seed, config.opponent, config.max_ticks);
    let mut frames = Vec::new();

    let start = policy.on_start();
    state.apply(&start.resolve());
    frames.push(state.frame(None, start.commands().to_vec(), false));

    while !state.is_terminal() {
        let events = state.step();

        if events.wall_hit {
            policy.on_hit_wall();
        }

        let mut commands = Vec::new();
        if let Some(obs) = events.observation {
            let me = state.self_state();
            let act = policy.on_observation(&me, &obs);
            state.apply(&act.resolve());
            commands = act.commands().to_vec();
        }

        frames.push(state.frame(events.observation, commands, events.wall_hit));
    }

    let (outcome, reason) = state.outcome();
    debug!(
        policy = policy.name(),
        opponent = config.opponent.name(),
        seed = config.seed,
        ?outcome,
        ?reason,
        tick = state.tick,
        "match finished"
    );

    Replay {
        config: config.clone(),
        frames,
        result: MatchResult {
            outcome,
            reason,
            final_tick: state.tick,
            stats: state.stats,
        },
    }
}

/// Run our robot, seeded from the match seed, with the configured tuning.
pub fn run_baneblade(config: &MatchConfig) -> Replay {
    let mut policy = BanebladePolicy::with_config(config.agent, config.seed);
    run_match(config, &mut policy)
}
