use baneblade_shared::*;
use tracing::trace;

use crate::geometry::{absolute_bearing, lateral_velocity, normalize_relative_angle};

/// Bullet power for a target at `distance`: more power up close, capped at
/// `max_power`. Degenerate distances saturate at the cap.
pub fn fire_power(distance: f64, scale: f64, max_power: f64) -> f64 {
    if distance.is_nan() || distance <= 0.0 {
        return max_power;
    }
    (scale / distance).min(max_power)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireSolution {
    /// Gun turn commanded this tick, radians.
    pub gun_turn: f64,
    pub power: f64,
    pub fired: bool,
}

/// Linear-lead gun laying with a heat/aim fire gate.
#[derive(Debug, Clone, Copy)]
pub struct Targeting {
    lead_divisor: f64,
    power_scale: f64,
    max_power: f64,
    tolerance_degrees: f64,
}

impl Targeting {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            lead_divisor: config.gun_lead_divisor,
            power_scale: config.fire_power_scale,
            max_power: config.max_fire_power,
            tolerance_degrees: config.fire_tolerance_degrees,
        }
    }

    pub fn aim(&self, me: &SelfState, obs: &ObservationEvent, out: &mut Actuation) -> FireSolution {
        let bearing = absolute_bearing(me.heading, obs.bearing);
        let lead = lateral_velocity(obs.velocity, obs.heading, bearing) / self.lead_divisor;
        let gun_turn = normalize_relative_angle(bearing - me.gun_heading + lead);
        out.turn_gun_right(gun_turn);

        let power = fire_power(obs.distance, self.power_scale, self.max_power);
        // The turn just ordered is what remains for the gun to travel.
        let fired = self.ready_to_fire(me.gun_heat, gun_turn);
        if fired {
            out.fire(power);
        }
        trace!(tick = me.time, gun_turn, power, fired, "gun laid");

        FireSolution {
            gun_turn,
            power,
            fired,
        }
    }

    /// Cold gun and less than the tolerance left to turn.
    pub fn ready_to_fire(&self, gun_heat: f64, remaining_gun_turn: f64) -> bool {
        gun_heat == 0.0 && remaining_gun_turn.to_degrees().abs() < self.tolerance_degrees
    }
}

impl Default for Targeting {
    fn default() -> Self {
        Self::new(&AgentConfig::default())
    }
}
