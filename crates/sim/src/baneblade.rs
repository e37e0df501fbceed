use baneblade_shared::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::movement::{MovementPolicy, Regime, Sign};
use crate::policy::Policy;
use crate::radar::RadarController;
use crate::targeting::{FireSolution, Targeting};
use crate::threat::ThreatMemory;

/// Single-opponent brawler. Closes to about 140 units, then circles the
/// opponent perpendicular to its bearing, dodging whenever the opponent's
/// energy says it just fired. The gun leads lateral motion and only fires
/// when cool and nearly on target.
pub struct BanebladePolicy<R = Pcg64> {
    config: AgentConfig,
    threat: ThreatMemory,
    radar: RadarController,
    movement: MovementPolicy,
    targeting: Targeting,
    rng: R,
    last_decision: Option<Decision>,
}

/// What the last observation led to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub radar_turn: f64,
    pub threat: bool,
    pub regime: Regime,
    pub fire: FireSolution,
}

impl BanebladePolicy<Pcg64> {
    pub fn new(seed: u64) -> Self {
        Self::with_config(AgentConfig::default(), seed)
    }

    pub fn with_config(config: AgentConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg64::seed_from_u64(seed))
    }
}

impl<R: Rng> BanebladePolicy<R> {
    pub fn with_rng(config: AgentConfig, rng: R) -> Self {
        Self {
            config,
            threat: ThreatMemory::new(&config),
            radar: RadarController::new(config.radar_arc),
            movement: MovementPolicy::new(config),
            targeting: Targeting::new(&config),
            rng,
            last_decision: None,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn last_enemy_energy(&self) -> f64 {
        self.threat.last_energy()
    }

    pub fn move_direction(&self) -> Sign {
        self.movement.move_direction()
    }

    pub fn turn_direction(&self) -> Sign {
        self.movement.turn_direction()
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.last_decision
    }

    /// Radar first so the next reading is tighter, then movement, then gun.
    pub fn decide(
        &mut self,
        me: &SelfState,
        obs: &ObservationEvent,
        out: &mut Actuation,
    ) -> Decision {
        let radar_turn = self.radar.track(me, obs, out);
        let threat = self.threat.observe(obs.energy);
        let regime = self.movement.update(me, obs, threat, &mut self.rng, out);
        let fire = self.targeting.aim(me, obs, out);

        let decision = Decision {
            radar_turn,
            threat,
            regime,
            fire,
        };
        self.last_decision = Some(decision);
        decision
    }
}

impl<R: Rng + Send> Policy for BanebladePolicy<R> {
    fn name(&self) -> &str {
        "baneblade"
    }

    fn on_start(&mut self) -> Actuation {
        let mut out = Actuation::new();
        out.push(Command::AdjustGunForBodyTurn(true));
        out.push(Command::AdjustRadarForGunTurn(true));
        out.push(Command::AdjustRadarForBodyTurn(true));
        self.radar.start(&mut out);
        out
    }

    fn on_observation(&mut self, me: &SelfState, obs: &ObservationEvent) -> Actuation {
        let mut out = Actuation::new();
        self.decide(me, obs, &mut out);
        out
    }

    fn on_hit_wall(&mut self) {
        self.movement.on_hit_wall();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn me() -> SelfState {
        SelfState {
            heading: 0.3,
            radar_heading: 1.2,
            gun_heading: 0.0,
            velocity: 6.0,
            gun_heat: 0.0,
            energy: 100.0,
            time: 13,
        }
    }

    #[test]
    fn test_start_commands() {
        let mut policy = BanebladePolicy::new(1);
        let out = policy.on_start();
        let resolved = out.resolve();
        assert_eq!(resolved.adjust_gun_for_body_turn, Some(true));
        assert_eq!(resolved.adjust_radar_for_gun_turn, Some(true));
        assert_eq!(resolved.adjust_radar_for_body_turn, Some(true));
        assert_eq!(resolved.radar_turn, Some(RadarTurn::Sweep));
    }

    #[test]
    fn test_command_order_radar_movement_gun() {
        let mut policy = BanebladePolicy::new(1);
        let obs = ObservationEvent::new(0.2, 300.0, 0.0, 0.0, 100.0);
        let out = policy.on_observation(&me(), &obs);

        let position = |pred: fn(&Command) -> bool| out.commands().iter().position(pred).unwrap();
        let radar = position(|c| matches!(c, Command::TurnRadar(_)));
        let body = position(|c| matches!(c, Command::TurnBody(_)));
        let gun = position(|c| matches!(c, Command::TurnGun(_)));
        assert!(radar < body && body < gun);
    }

    #[test]
    fn test_threat_memory_follows_observations() {
        let mut policy = BanebladePolicy::new(1);
        let obs = ObservationEvent::new(0.2, 300.0, 0.0, 0.0, 100.0);
        policy.on_observation(&me(), &obs);
        assert!(!policy.last_decision().unwrap().threat);

        let obs = ObservationEvent::new(0.2, 300.0, 0.0, 0.0, 98.0);
        policy.on_observation(&me(), &obs);
        assert!(policy.last_decision().unwrap().threat);
        assert_eq!(policy.last_enemy_energy(), 98.0);

        // Same energy again: no second dodge.
        policy.on_observation(&me(), &obs);
        assert!(!policy.last_decision().unwrap().threat);
    }

    #[test]
    fn test_shot_at_range_dodges_then_approaches() {
        let mut policy = BanebladePolicy::new(42);
        let me = me();
        policy.on_observation(&me, &ObservationEvent::new(0.2, 200.0, 0.0, 0.0, 100.0));

        let obs = ObservationEvent::new(0.2, 200.0, 0.0, 0.0, 98.0);
        let out = policy.on_observation(&me, &obs);
        let decision = policy.last_decision().unwrap();
        assert!(decision.threat);
        assert_eq!(decision.regime, Regime::Approach);

        let cmds = out.commands();
        let dodge_turn = cmds
            .iter()
            .position(|c| {
                matches!(c, Command::TurnBody(r) if (r.abs() - 90f64.to_radians()).abs() < 1e-12)
            })
            .expect("90 degree dodge turn");
        let dodge_ahead = cmds
            .iter()
            .position(|c| matches!(c, Command::Ahead(d) if d.abs() == 90.0))
            .expect("90 unit dodge run");
        assert!(dodge_turn < dodge_ahead);

        // Approach orders come after and win the tick.
        let last_ahead = cmds.iter().rposition(|c| matches!(c, Command::Ahead(_))).unwrap();
        assert!(last_ahead > dodge_ahead);
        assert_eq!(out.resolve().ahead, Some(60.0));

        // Radar re-locked toward the opponent: bearing 0.5, radar at 1.2.
        let expected = (0.5 - 1.2) * 2.0;
        assert_eq!(out.resolve().radar_turn, Some(RadarTurn::By(decision.radar_turn)));
        assert!((decision.radar_turn - expected).abs() < 1e-12);

        assert_eq!(policy.move_direction(), Sign::Plus);
        assert_eq!(policy.turn_direction(), Sign::Plus);
    }

    #[test]
    fn test_wall_hit_flips_travel() {
        let mut policy = BanebladePolicy::with_rng(AgentConfig::default(), StepRng::new(0, 0));
        policy.on_hit_wall();
        assert_eq!(policy.move_direction(), Sign::Minus);

        let out = policy.on_observation(&me(), &ObservationEvent::new(0.0, 340.0, 0.0, 0.0, 100.0));
        assert_eq!(out.resolve().ahead, Some(-200.0));
    }

    #[test]
    fn test_same_seed_same_choices() {
        let run = |seed| {
            let mut policy = BanebladePolicy::new(seed);
            let mut log = Vec::new();
            let mut energy = 100.0;
            for time in 0..50u64 {
                energy -= 1.0;
                let me = SelfState { time, ..me() };
                let obs = ObservationEvent::new(0.1, 180.0, 0.0, 3.0, energy);
                let out = policy.on_observation(&me, &obs);
                log.push(out);
            }
            log
        };
        assert_eq!(run(5), run(5));
    }
}
