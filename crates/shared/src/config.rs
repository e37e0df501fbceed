use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Unknown opponent '{0}'. Valid options: sitting-duck, circler, oscillator")]
    UnknownOpponent(String),
}

/// Tunables of the Baneblade decision core. Distances are arena units,
/// turn rates and tolerances are degrees. Missing JSON fields take defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Radar overshoot factor applied to every re-lock.
    pub radar_arc: f64,
    /// Opponents strictly farther than this are approached; nearer ones orbited.
    pub approach_distance: f64,
    pub standoff_distance: f64,
    pub base_turn_rate: f64,
    pub turn_rate_jitter: f64,
    /// `max_velocity = speed_budget - turn_rate`.
    pub speed_budget: f64,
    pub orbit_flip_period: u64,
    pub evade_turn_flip_chance: f64,
    pub evade_move_flip_chance: f64,
    pub evade_turn_left_chance: f64,
    pub evade_turn_degrees: f64,
    pub evade_distance: f64,
    /// Opponent energy drop band read as "fired a bullet", inclusive.
    pub fired_energy_min: f64,
    pub fired_energy_max: f64,
    pub initial_enemy_energy: f64,
    /// Below this own speed the approach lead term is dropped.
    pub lead_velocity_epsilon: f64,
    pub gun_lead_divisor: f64,
    pub fire_power_scale: f64,
    pub max_fire_power: f64,
    pub fire_tolerance_degrees: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            radar_arc: RADAR_ARC,
            approach_distance: APPROACH_DISTANCE,
            standoff_distance: STANDOFF_DISTANCE,
            base_turn_rate: BASE_TURN_RATE_DEG,
            turn_rate_jitter: TURN_RATE_JITTER_DEG,
            speed_budget: SPEED_BUDGET,
            orbit_flip_period: ORBIT_FLIP_PERIOD,
            evade_turn_flip_chance: EVADE_TURN_FLIP_CHANCE,
            evade_move_flip_chance: EVADE_MOVE_FLIP_CHANCE,
            evade_turn_left_chance: EVADE_TURN_LEFT_CHANCE,
            evade_turn_degrees: EVADE_TURN_DEG,
            evade_distance: EVADE_DISTANCE,
            fired_energy_min: FIRED_ENERGY_MIN,
            fired_energy_max: FIRED_ENERGY_MAX,
            initial_enemy_energy: START_ENERGY,
            lead_velocity_epsilon: LEAD_VELOCITY_EPSILON,
            gun_lead_divisor: GUN_LEAD_DIVISOR,
            fire_power_scale: FIRE_POWER_SCALE,
            max_fire_power: MAX_BULLET_POWER,
            fire_tolerance_degrees: FIRE_TOLERANCE_DEG,
        }
    }
}

impl AgentConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: AgentConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("radar_arc", self.radar_arc),
            ("approach_distance", self.approach_distance),
            ("base_turn_rate", self.base_turn_rate),
            ("speed_budget", self.speed_budget),
            ("gun_lead_divisor", self.gun_lead_divisor),
            ("fire_power_scale", self.fire_power_scale),
            ("max_fire_power", self.max_fire_power),
            ("fire_tolerance_degrees", self.fire_tolerance_degrees),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("standoff_distance", self.standoff_distance),
            ("turn_rate_jitter", self.turn_rate_jitter),
            ("evade_turn_degrees", self.evade_turn_degrees),
            ("evade_distance", self.evade_distance),
            ("fired_energy_min", self.fired_energy_min),
            ("initial_enemy_energy", self.initial_enemy_energy),
            ("lead_velocity_epsilon", self.lead_velocity_epsilon),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("must be non-negative, got {value}")));
            }
        }

        let chances = [
            ("evade_turn_flip_chance", self.evade_turn_flip_chance),
            ("evade_move_flip_chance", self.evade_move_flip_chance),
            ("evade_turn_left_chance", self.evade_turn_left_chance),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("must be within [0, 1], got {value}")));
            }
        }

        if !(self.fired_energy_max.is_finite() && self.fired_energy_max >= self.fired_energy_min) {
            return Err(invalid(
                "fired_energy_max",
                format!(
                    "must be at least fired_energy_min ({}), got {}",
                    self.fired_energy_min, self.fired_energy_max
                ),
            ));
        }
        if self.orbit_flip_period == 0 {
            return Err(invalid("orbit_flip_period", "must be at least 1".into()));
        }
        if self.max_fire_power > MAX_BULLET_POWER {
            return Err(invalid(
                "max_fire_power",
                format!("must not exceed {MAX_BULLET_POWER}, got {}", self.max_fire_power),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidField { field, reason }
}
