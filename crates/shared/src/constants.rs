// Match
pub const MAX_TICKS: u64 = 3000;

// Arena (compass headings: 0 = north, clockwise positive)
pub const ARENA_WIDTH: f64 = 800.0;
pub const ARENA_HEIGHT: f64 = 600.0;
pub const ROBOT_HALF_WIDTH: f64 = 18.0;
pub const START_ENERGY: f64 = 100.0;

// Body
pub const MAX_VELOCITY: f64 = 8.0;
pub const ACCELERATION: f64 = 1.0;
pub const DECELERATION: f64 = 2.0;
pub const MAX_TURN_RATE_DEG: f64 = 10.0;
pub const TURN_RATE_VELOCITY_PENALTY_DEG: f64 = 0.75;

// Gun and radar
pub const GUN_TURN_RATE_DEG: f64 = 20.0;
pub const RADAR_TURN_RATE_DEG: f64 = 45.0;
pub const RADAR_SCAN_RADIUS: f64 = 1200.0;
pub const GUN_COOLING_RATE: f64 = 0.1;
pub const INITIAL_GUN_HEAT: f64 = 3.0;

// Bullets
pub const MIN_BULLET_POWER: f64 = 0.1;
pub const MAX_BULLET_POWER: f64 = 3.0;

// Baneblade tuning defaults
pub const RADAR_ARC: f64 = 2.0;
pub const APPROACH_DISTANCE: f64 = 150.0;
pub const STANDOFF_DISTANCE: f64 = 140.0;
pub const BASE_TURN_RATE_DEG: f64 = 4.0;
pub const TURN_RATE_JITTER_DEG: f64 = 0.2;
pub const SPEED_BUDGET: f64 = 12.0;
pub const ORBIT_FLIP_PERIOD: u64 = 20;
pub const EVADE_TURN_FLIP_CHANCE: f64 = 0.5;
pub const EVADE_MOVE_FLIP_CHANCE: f64 = 0.2;
pub const EVADE_TURN_LEFT_CHANCE: f64 = 0.3;
pub const EVADE_TURN_DEG: f64 = 90.0;
pub const EVADE_DISTANCE: f64 = 90.0;
pub const FIRED_ENERGY_MIN: f64 = 0.1;
pub const FIRED_ENERGY_MAX: f64 = 3.0;
pub const LEAD_VELOCITY_EPSILON: f64 = 1e-3;
pub const GUN_LEAD_DIVISOR: f64 = 18.0; // half a robot width
pub const FIRE_POWER_SCALE: f64 = 450.0;
pub const FIRE_TOLERANCE_DEG: f64 = 15.0;
