use baneblade_shared::*;
use rand::Rng;
use tracing::debug;

use crate::geometry::{absolute_bearing, lateral_velocity, normalize_relative_angle};

/// A direction sign that is always +1 or -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn value(self) -> f64 {
        match self {
            Sign::Plus => 1.0,
            Sign::Minus => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }

    pub fn flip(&mut self) {
        *self = self.flipped();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Close in on the opponent's predicted position.
    Approach,
    /// Hold perpendicular to the opponent and nudge around it.
    Orbit,
}

impl Regime {
    /// Strictly farther than `threshold` approaches.
    pub fn select(distance: f64, threshold: f64) -> Self {
        if distance > threshold {
            Regime::Approach
        } else {
            Regime::Orbit
        }
    }
}

/// Body turn-rate for this tick: `base` plus up to `jitter`, dropped back to
/// `base` whenever the sum would exceed the platform limit.
pub fn jittered_turn_rate<R: Rng + ?Sized>(base: f64, jitter: f64, rng: &mut R) -> f64 {
    let rate = base + jitter * rng.gen::<f64>();
    if rate > MAX_TURN_RATE_DEG {
        base
    } else {
        rate
    }
}

#[derive(Debug, Clone)]
pub struct MovementPolicy {
    config: AgentConfig,
    move_direction: Sign,
    turn_direction: Sign,
}

impl MovementPolicy {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            move_direction: Sign::Plus,
            turn_direction: Sign::Plus,
        }
    }

    pub fn move_direction(&self) -> Sign {
        self.move_direction
    }

    pub fn turn_direction(&self) -> Sign {
        self.turn_direction
    }

    /// Issue this tick's movement commands. `threat` is the threat inference
    /// for the same observation.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        me: &SelfState,
        obs: &ObservationEvent,
        threat: bool,
        rng: &mut R,
        out: &mut Actuation,
    ) -> Regime {
        let regime = Regime::select(obs.distance, self.config.approach_distance);
        match regime {
            Regime::Approach => self.approach(me, obs, threat, rng, out),
            Regime::Orbit => self.orbit(me, obs, threat, rng, out),
        }
        regime
    }

    fn approach<R: Rng + ?Sized>(
        &mut self,
        me: &SelfState,
        obs: &ObservationEvent,
        threat: bool,
        rng: &mut R,
        out: &mut Actuation,
    ) {
        // Sharper turning buys a lower top speed.
        let turn_rate =
            jittered_turn_rate(self.config.base_turn_rate, self.config.turn_rate_jitter, rng);
        out.max_turn_rate(turn_rate);
        out.max_velocity(self.config.speed_budget - turn_rate);

        self.evade(me.time, threat, rng, out);

        let bearing = absolute_bearing(me.heading, obs.bearing);
        let lateral = lateral_velocity(obs.velocity, obs.heading, bearing);
        let lead = if me.velocity.abs() < self.config.lead_velocity_epsilon {
            0.0
        } else {
            lateral / me.velocity
        };
        out.turn_body_right(normalize_relative_angle(bearing - me.heading + lead));
        out.ahead((obs.distance - self.config.standoff_distance) * self.move_direction.value());
    }

    fn orbit<R: Rng + ?Sized>(
        &mut self,
        me: &SelfState,
        obs: &ObservationEvent,
        threat: bool,
        rng: &mut R,
        out: &mut Actuation,
    ) {
        self.evade(me.time, threat, rng, out);

        // Put the opponent square off our beam.
        out.turn_body_right(normalize_relative_angle((90.0 + obs.bearing_degrees).to_radians()));

        if me.time.checked_rem(self.config.orbit_flip_period) == Some(0) {
            self.move_direction.flip();
            out.ahead((obs.distance - self.config.standoff_distance) * self.move_direction.value());
            self.move_direction.flip();
        }
    }

    /// Random dodge when the opponent just fired. Returns whether it ran.
    /// Both signs are back to +1 afterwards; only the issued commands persist.
    pub fn evade<R: Rng + ?Sized>(
        &mut self,
        tick: u64,
        threat: bool,
        rng: &mut R,
        out: &mut Actuation,
    ) -> bool {
        if !threat {
            return false;
        }

        if rng.gen::<f64>() < self.config.evade_turn_flip_chance {
            self.turn_direction.flip();
        }
        if rng.gen::<f64>() < self.config.evade_move_flip_chance {
            self.move_direction.flip();
        }

        let turn = (self.config.evade_turn_degrees * self.turn_direction.value()).to_radians();
        let turn_left = rng.gen::<f64>() < self.config.evade_turn_left_chance;
        if turn_left {
            out.turn_body_left(turn);
        } else {
            out.turn_body_right(turn);
        }
        let distance = self.config.evade_distance * self.move_direction.value();
        out.ahead(distance);

        debug!(tick, turn_left, turn, distance, "evasive maneuver");

        self.turn_direction = Sign::Plus;
        self.move_direction = Sign::Plus;
        true
    }

    pub fn on_hit_wall(&mut self) {
        self.move_direction.flip();
        debug!(direction = ?self.move_direction, "wall hit, reversing");
    }
}

impl Default for MovementPolicy {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    /// Every `gen::<f64>()` returns 0.0: every chance succeeds.
    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every `gen::<f64>()` returns just under 1.0: every chance fails.
    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn obs_at(distance: f64) -> ObservationEvent {
        ObservationEvent::new(0.3, distance, 1.0, 5.0, 100.0)
    }

    fn ahead_commands(out: &Actuation) -> Vec<f64> {
        out.commands()
            .iter()
            .filter_map(|c| match c {
                Command::Ahead(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    fn body_turns(out: &Actuation) -> Vec<f64> {
        out.commands()
            .iter()
            .filter_map(|c| match c {
                Command::TurnBody(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sign_flip() {
        let mut s = Sign::default();
        assert_eq!(s.value(), 1.0);
        s.flip();
        assert_eq!(s.value(), -1.0);
        assert_eq!(s.flipped(), Sign::Plus);
    }

    #[test]
    fn test_regime_boundary() {
        assert_eq!(Regime::select(150.0, 150.0), Regime::Orbit);
        assert_eq!(Regime::select(150.001, 150.0), Regime::Approach);
        assert_eq!(Regime::select(149.999, 150.0), Regime::Orbit);
    }

    #[test]
    fn test_turn_rate_jitter_range() {
        let mut rng = Pcg64::seed_from_u64(7);
        for _ in 0..1000 {
            let rate = jittered_turn_rate(4.0, 0.2, &mut rng);
            assert!((4.0..=4.2).contains(&rate));
        }
    }

    #[test]
    fn test_turn_rate_resets_to_base_above_limit() {
        // 9.5 + ~1.0 > 10: reset to 9.5, not clamped to 10.
        assert_eq!(jittered_turn_rate(9.5, 1.0, &mut never()), 9.5);
        assert_eq!(jittered_turn_rate(9.5, 1.0, &mut always()), 9.5);
    }

    #[test]
    fn test_approach_commands() {
        let mut policy = MovementPolicy::default();
        let me = SelfState {
            heading: 0.2,
            velocity: 8.0,
            ..Default::default()
        };
        let obs = obs_at(300.0);
        let mut out = Actuation::new();

        let regime = policy.update(&me, &obs, false, &mut always(), &mut out);
        assert_eq!(regime, Regime::Approach);

        let resolved = out.resolve();
        assert_eq!(resolved.max_turn_rate, Some(4.0));
        assert_eq!(resolved.max_velocity, Some(8.0));
        assert_eq!(resolved.ahead, Some(160.0));

        let bearing: f64 = 0.2 + 0.3;
        let lead = 5.0 * (1.0 - bearing).sin() / 8.0;
        let expected = normalize_relative_angle(bearing - 0.2 + lead);
        assert!((resolved.body_turn.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_approach_velocity_tradeoff() {
        let mut policy = MovementPolicy::default();
        let me = SelfState::default();
        let mut out = Actuation::new();
        policy.update(&me, &obs_at(400.0), false, &mut never(), &mut out);

        let resolved = out.resolve();
        let rate = resolved.max_turn_rate.unwrap();
        assert!(rate > 4.19 && rate <= 4.2);
        assert!((resolved.max_velocity.unwrap() - (12.0 - rate)).abs() < 1e-12);
    }

    #[test]
    fn test_approach_skips_lead_when_stopped() {
        let mut policy = MovementPolicy::default();
        let me = SelfState {
            heading: 0.2,
            velocity: 0.0,
            ..Default::default()
        };
        let mut out = Actuation::new();
        policy.update(&me, &obs_at(300.0), false, &mut always(), &mut out);

        let turn = out.resolve().body_turn.unwrap();
        assert!(turn.is_finite());
        assert!((turn - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_orbit_turns_perpendicular() {
        let mut policy = MovementPolicy::default();
        let me = SelfState {
            heading: 1.0,
            time: 7,
            ..Default::default()
        };
        let obs = obs_at(120.0);
        let mut out = Actuation::new();

        let regime = policy.update(&me, &obs, false, &mut always(), &mut out);
        assert_eq!(regime, Regime::Orbit);

        let resolved = out.resolve();
        let turn = resolved.body_turn.unwrap();
        let new_heading = me.heading + turn;
        let to_opponent = me.heading + obs.bearing;
        // Opponent sits 90 degrees off the new heading.
        let off = normalize_relative_angle(to_opponent - new_heading);
        assert!((off.abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);

        // No nudge off the flip period, and no speed orders in orbit.
        assert_eq!(resolved.ahead, None);
        assert_eq!(resolved.max_velocity, None);
    }

    #[test]
    fn test_orbit_nudge_period() {
        let mut policy = MovementPolicy::default();
        for time in 0..=60u64 {
            let me = SelfState {
                time,
                ..Default::default()
            };
            let before = policy.move_direction();
            let mut out = Actuation::new();
            policy.update(&me, &obs_at(130.0), false, &mut always(), &mut out);

            let aheads = ahead_commands(&out);
            if time % 20 == 0 {
                // Flipped sign: (130 - 140) * -1.
                assert_eq!(aheads, vec![10.0], "tick {time}");
            } else {
                assert!(aheads.is_empty(), "tick {time}");
            }
            assert_eq!(policy.move_direction(), before);
        }
    }

    #[test]
    fn test_orbit_dodge_travel_survives_off_period() {
        let obs = obs_at(130.0);
        let perpendicular = normalize_relative_angle((90.0 + obs.bearing_degrees).to_radians());
        let me = SelfState {
            time: 7,
            ..Default::default()
        };

        for (mut rng, dodge_run) in [(always(), -90.0), (never(), 90.0)] {
            let mut policy = MovementPolicy::default();
            let mut out = Actuation::new();
            let regime = policy.update(&me, &obs, true, &mut rng, &mut out);
            assert_eq!(regime, Regime::Orbit);

            // The dodge turn is logged, then replaced by the perpendicular turn.
            let turns = body_turns(&out);
            assert_eq!(turns.len(), 2);
            assert!((turns[0].abs() - 90f64.to_radians()).abs() < 1e-12);

            let resolved = out.resolve();
            assert_eq!(resolved.body_turn, Some(perpendicular));
            assert_eq!(
                resolved.ahead,
                Some(dodge_run),
                "dodge run should stand off the nudge tick"
            );
            assert_eq!(policy.move_direction(), Sign::Plus);
        }
    }

    #[test]
    fn test_orbit_nudge_supersedes_dodge() {
        let mut policy = MovementPolicy::default();
        let me = SelfState {
            time: 20,
            ..Default::default()
        };
        let mut out = Actuation::new();
        policy.update(&me, &obs_at(130.0), true, &mut always(), &mut out);

        // Dodge ran backwards, then the nudge with the flipped sign: (130 - 140) * -1.
        assert_eq!(ahead_commands(&out), vec![-90.0, 10.0]);
        assert_eq!(out.resolve().ahead, Some(10.0));
        assert_eq!(policy.move_direction(), Sign::Plus);
        assert_eq!(policy.turn_direction(), Sign::Plus);
    }

    #[test]
    fn test_evade_noop_without_threat() {
        let mut policy = MovementPolicy::default();
        let mut out = Actuation::new();
        assert!(!policy.evade(0, false, &mut always(), &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_evade_all_flips() {
        let mut policy = MovementPolicy::default();
        let mut out = Actuation::new();
        assert!(policy.evade(0, true, &mut always(), &mut out));

        // Turn sign flipped to -1, then "turn left by 90 * -1" = right 90.
        assert_eq!(body_turns(&out), vec![90f64.to_radians()]);
        assert_eq!(ahead_commands(&out), vec![-90.0]);
        assert_eq!(policy.move_direction(), Sign::Plus);
        assert_eq!(policy.turn_direction(), Sign::Plus);
    }

    #[test]
    fn test_evade_no_flips() {
        let mut policy = MovementPolicy::default();
        let mut out = Actuation::new();
        policy.evade(0, true, &mut never(), &mut out);

        assert_eq!(body_turns(&out), vec![90f64.to_radians()]);
        assert_eq!(ahead_commands(&out), vec![90.0]);
    }

    #[test]
    fn test_evade_resets_signs_after_wall_hit() {
        let mut policy = MovementPolicy::default();
        policy.on_hit_wall();
        assert_eq!(policy.move_direction(), Sign::Minus);

        let mut out = Actuation::new();
        policy.evade(0, true, &mut never(), &mut out);
        // Reversed sign carried into the dodge, then reset.
        assert_eq!(ahead_commands(&out), vec![-90.0]);
        assert_eq!(policy.move_direction(), Sign::Plus);
    }

    #[test]
    fn test_signs_stay_unit_under_random_events() {
        let mut policy = MovementPolicy::default();
        let mut rng = Pcg64::seed_from_u64(99);
        for i in 0..500u64 {
            let mut out = Actuation::new();
            match i % 3 {
                0 => policy.on_hit_wall(),
                1 => {
                    policy.evade(i, true, &mut rng, &mut out);
                    assert_eq!(policy.move_direction(), Sign::Plus);
                    assert_eq!(policy.turn_direction(), Sign::Plus);
                }
                _ => {
                    let me = SelfState {
                        time: i,
                        ..Default::default()
                    };
                    let threat = rng.gen::<bool>();
                    let obs = obs_at(100.0 + (i % 100) as f64);
                    policy.update(&me, &obs, threat, &mut rng, &mut out);
                }
            }
            assert_eq!(policy.move_direction().value().abs(), 1.0);
            assert_eq!(policy.turn_direction().value().abs(), 1.0);
        }
    }

    #[test]
    fn test_wall_hit_reverses_approach() {
        let mut policy = MovementPolicy::default();
        policy.on_hit_wall();
        let mut out = Actuation::new();
        policy.update(&SelfState::default(), &obs_at(300.0), false, &mut always(), &mut out);
        assert_eq!(out.resolve().ahead, Some(-160.0));
    }
}
