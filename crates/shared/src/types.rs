use serde::{Deserialize, Serialize};

use crate::config::{AgentConfig, ConfigError};

/// Host-owned state of our own robot, read at the start of a decision.
/// Angles are radians on the compass (0 = north, clockwise positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfState {
    pub heading: f64,
    pub radar_heading: f64,
    pub gun_heading: f64,
    pub velocity: f64,
    pub gun_heat: f64,
    pub energy: f64,
    pub time: u64,
}

impl Default for SelfState {
    fn default() -> Self {
        Self {
            heading: 0.0,
            radar_heading: 0.0,
            gun_heading: 0.0,
            velocity: 0.0,
            gun_heat: 0.0,
            energy: crate::START_ENERGY,
            time: 0,
        }
    }
}

/// One radar detection of the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationEvent {
    /// Bearing relative to our body heading, in (-PI, PI].
    pub bearing: f64,
    pub distance: f64,
    /// Opponent's absolute heading.
    pub heading: f64,
    pub velocity: f64,
    pub energy: f64,
    /// Same as `bearing`, in degrees.
    pub bearing_degrees: f64,
}

impl ObservationEvent {
    pub fn new(bearing: f64, distance: f64, heading: f64, velocity: f64, energy: f64) -> Self {
        Self {
            bearing,
            distance,
            heading,
            velocity,
            energy,
            bearing_degrees: bearing.to_degrees(),
        }
    }
}

/// Radar order. `Sweep` keeps the radar turning clockwise until a later
/// order overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RadarTurn {
    Sweep,
    /// Signed turn in radians, positive = clockwise.
    By(f64),
}

/// A single instruction from an agent to the host. Turns are radians,
/// positive = right (clockwise); `MaxTurnRate` is degrees per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    AdjustGunForBodyTurn(bool),
    AdjustRadarForGunTurn(bool),
    AdjustRadarForBodyTurn(bool),
    TurnRadar(RadarTurn),
    TurnBody(f64),
    TurnGun(f64),
    Ahead(f64),
    MaxVelocity(f64),
    MaxTurnRate(f64),
    Fire(f64),
}

/// Ordered commands issued by an agent during one decision.
///
/// Every command is kept so callers can inspect superseded orders; the host
/// only sees [`Actuation::resolve`], where the last command per channel wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actuation {
    commands: Vec<Command>,
}

impl Actuation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn sweep_radar(&mut self) {
        self.push(Command::TurnRadar(RadarTurn::Sweep));
    }

    pub fn turn_radar_right(&mut self, radians: f64) {
        self.push(Command::TurnRadar(RadarTurn::By(radians)));
    }

    pub fn turn_body_right(&mut self, radians: f64) {
        self.push(Command::TurnBody(radians));
    }

    pub fn turn_body_left(&mut self, radians: f64) {
        self.push(Command::TurnBody(-radians));
    }

    pub fn turn_gun_right(&mut self, radians: f64) {
        self.push(Command::TurnGun(radians));
    }

    /// Travel `distance` along the body heading; negative backs up.
    pub fn ahead(&mut self, distance: f64) {
        self.push(Command::Ahead(distance));
    }

    pub fn max_velocity(&mut self, velocity: f64) {
        self.push(Command::MaxVelocity(velocity));
    }

    pub fn max_turn_rate(&mut self, degrees_per_tick: f64) {
        self.push(Command::MaxTurnRate(degrees_per_tick));
    }

    pub fn fire(&mut self, power: f64) {
        self.push(Command::Fire(power));
    }

    /// Collapse the command log into one order per channel.
    pub fn resolve(&self) -> ResolvedActuation {
        let mut out = ResolvedActuation::default();
        for command in &self.commands {
            match *command {
                Command::AdjustGunForBodyTurn(v) => out.adjust_gun_for_body_turn = Some(v),
                Command::AdjustRadarForGunTurn(v) => out.adjust_radar_for_gun_turn = Some(v),
                Command::AdjustRadarForBodyTurn(v) => out.adjust_radar_for_body_turn = Some(v),
                Command::TurnRadar(turn) => out.radar_turn = Some(turn),
                Command::TurnBody(r) => out.body_turn = Some(r),
                Command::TurnGun(r) => out.gun_turn = Some(r),
                Command::Ahead(d) => out.ahead = Some(d),
                Command::MaxVelocity(v) => out.max_velocity = Some(v),
                Command::MaxTurnRate(r) => out.max_turn_rate = Some(r),
                Command::Fire(p) => out.fire = Some(p),
            }
        }
        out
    }
}

/// Last-writer-wins view of an [`Actuation`]. `None` leaves the host's
/// current order on that channel untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedActuation {
    pub adjust_gun_for_body_turn: Option<bool>,
    pub adjust_radar_for_gun_turn: Option<bool>,
    pub adjust_radar_for_body_turn: Option<bool>,
    pub radar_turn: Option<RadarTurn>,
    pub body_turn: Option<f64>,
    pub gun_turn: Option<f64>,
    pub ahead: Option<f64>,
    pub max_velocity: Option<f64>,
    pub max_turn_rate: Option<f64>,
    pub fire: Option<f64>,
}

/// Scripted opponent driven by the reference host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpponentScript {
    /// Parked, never fires.
    SittingDuck,
    /// Drives in a steady circle and fires power 1 every 25 ticks.
    Circler,
    /// Strafes back and forth across our line of sight and fires power 2
    /// every 30 ticks.
    Oscillator,
}

impl OpponentScript {
    pub const ALL: [OpponentScript; 3] = [
        OpponentScript::SittingDuck,
        OpponentScript::Circler,
        OpponentScript::Oscillator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OpponentScript::SittingDuck => "sitting-duck",
            OpponentScript::Circler => "circler",
            OpponentScript::Oscillator => "oscillator",
        }
    }
}

impl std::str::FromStr for OpponentScript {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpponentScript::ALL
            .into_iter()
            .find(|script| script.name() == s)
            .ok_or_else(|| ConfigError::UnknownOpponent(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub seed: u64,
    pub max_ticks: u64,
    pub opponent: OpponentScript,
    pub agent: AgentConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_ticks: crate::MAX_TICKS,
            opponent: OpponentScript::Circler,
            agent: AgentConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RobotSnapshot {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
    pub velocity: f64,
    pub energy: f64,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub power: f64,
    pub owner: usize,
}

/// One tick of a match. Robot 0 is the agent, robot 1 the scripted opponent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u64,
    pub robots: [RobotSnapshot; 2],
    pub bullets: Vec<BulletSnapshot>,
    pub observation: Option<ObservationEvent>,
    pub commands: Vec<Command>,
    pub wall_hit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub config: MatchConfig,
    pub frames: Vec<ReplayFrame>,
    pub result: MatchResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub reason: MatchEndReason,
    pub final_tick: u64,
    pub stats: MatchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    AgentWin,
    OpponentWin,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEndReason {
    Elimination,
    Timeout,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub agent_energy: f64,
    pub opponent_energy: f64,
    pub agent_shots: u32,
    pub agent_hits: u32,
    pub opponent_shots: u32,
    pub opponent_hits: u32,
    pub agent_wall_hits: u32,
    pub observations: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_last_writer_wins() {
        let mut act = Actuation::new();
        act.turn_body_left(1.0);
        act.ahead(90.0);
        act.turn_body_right(0.25);
        act.ahead(-60.0);

        let resolved = act.resolve();
        assert_eq!(resolved.body_turn, Some(0.25));
        assert_eq!(resolved.ahead, Some(-60.0));
        assert_eq!(resolved.gun_turn, None);
        assert_eq!(resolved.fire, None);
        // Superseded orders stay visible in the log.
        assert_eq!(act.commands().len(), 4);
        assert_eq!(act.commands()[0], Command::TurnBody(-1.0));
    }

    #[test]
    fn test_sweep_is_overridden_by_explicit_turn() {
        let mut act = Actuation::new();
        act.sweep_radar();
        assert_eq!(act.resolve().radar_turn, Some(RadarTurn::Sweep));

        act.turn_radar_right(-0.5);
        assert_eq!(act.resolve().radar_turn, Some(RadarTurn::By(-0.5)));
    }

    #[test]
    fn test_observation_degrees() {
        let obs = ObservationEvent::new(std::f64::consts::FRAC_PI_2, 200.0, 0.0, 8.0, 100.0);
        assert!((obs.bearing_degrees - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_opponent_script_names() {
        for script in OpponentScript::ALL {
            let parsed: OpponentScript = script.name().parse().unwrap();
            assert_eq!(parsed, script);
        }
        assert!("tank".parse::<OpponentScript>().is_err());

        let json = serde_json::to_string(&OpponentScript::SittingDuck).unwrap();
        assert_eq!(json, "\"sitting-duck\"");
    }
}
