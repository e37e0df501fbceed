use baneblade_shared::*;
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::f64::consts::{PI, TAU};

use crate::geometry::{bearing_to, normalize_absolute_angle, normalize_relative_angle, project};

pub const AGENT: usize = 0;
pub const OPPONENT: usize = 1;

const SPAWN_MARGIN: f64 = 60.0;
const MIN_SPAWN_DISTANCE: f64 = 250.0;

/// Orders a robot is still carrying out. Turn amounts shrink as they are
/// executed; speed limits and rotation flags persist until replaced.
#[derive(Debug, Clone, Copy)]
struct Orders {
    body_turn: f64,
    gun_turn: f64,
    radar: RadarTurn,
    distance: f64,
    max_velocity: f64,
    max_turn_rate: f64,
    fire: Option<f64>,
    gun_free_of_body: bool,
    radar_free_of_gun: bool,
    radar_free_of_body: bool,
}

impl Default for Orders {
    fn default() -> Self {
        Self {
            body_turn: 0.0,
            gun_turn: 0.0,
            radar: RadarTurn::By(0.0),
            distance: 0.0,
            max_velocity: MAX_VELOCITY,
            max_turn_rate: MAX_TURN_RATE_DEG,
            fire: None,
            gun_free_of_body: false,
            radar_free_of_gun: false,
            radar_free_of_body: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Robot {
    pub position: DVec2,
    pub heading: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
    pub velocity: f64,
    pub gun_heat: f64,
    pub energy: f64,
    pub alive: bool,
    orders: Orders,
}

/// What one tick of motion did to a robot.
#[derive(Debug, Clone, Copy)]
struct Motion {
    radar_from: f64,
    radar_sweep: f64,
    wall_hit: bool,
}

impl Robot {
    pub fn new(position: DVec2, heading: f64) -> Self {
        Self {
            position,
            heading,
            gun_heading: heading,
            radar_heading: heading,
            velocity: 0.0,
            gun_heat: INITIAL_GUN_HEAT,
            energy: START_ENERGY,
            alive: true,
            orders: Orders::default(),
        }
    }

    pub fn self_state(&self, time: u64) -> SelfState {
        SelfState {
            heading: self.heading,
            radar_heading: self.radar_heading,
            gun_heading: self.gun_heading,
            velocity: self.velocity,
            gun_heat: self.gun_heat,
            energy: self.energy,
            time,
        }
    }

    pub fn snapshot(&self) -> RobotSnapshot {
        RobotSnapshot {
            x: self.position.x,
            y: self.position.y,
            heading: self.heading,
            gun_heading: self.gun_heading,
            radar_heading: self.radar_heading,
            velocity: self.velocity,
            energy: self.energy,
            alive: self.alive,
        }
    }

    pub fn gun_turn_remaining(&self) -> f64 {
        self.orders.gun_turn
    }

    pub fn distance_remaining(&self) -> f64 {
        self.orders.distance
    }

    /// Take over every channel the actuation sets; leave the others running.
    pub fn apply(&mut self, act: &ResolvedActuation) {
        let o = &mut self.orders;
        if let Some(v) = act.adjust_gun_for_body_turn {
            o.gun_free_of_body = v;
        }
        if let Some(v) = act.adjust_radar_for_gun_turn {
            o.radar_free_of_gun = v;
        }
        if let Some(v) = act.adjust_radar_for_body_turn {
            o.radar_free_of_body = v;
        }
        if let Some(turn) = act.radar_turn {
            o.radar = turn;
        }
        if let Some(turn) = act.body_turn {
            o.body_turn = turn;
        }
        if let Some(turn) = act.gun_turn {
            o.gun_turn = turn;
        }
        if let Some(distance) = act.ahead {
            o.distance = distance;
        }
        if let Some(v) = act.max_velocity {
            o.max_velocity = v.clamp(0.0, MAX_VELOCITY);
        }
        if let Some(rate) = act.max_turn_rate {
            o.max_turn_rate = rate.clamp(0.0, MAX_TURN_RATE_DEG);
        }
        if act.fire.is_some() {
            o.fire = act.fire;
        }
    }

    fn step_motion(&mut self) -> Motion {
        let o = &mut self.orders;

        let max_turn = turn_rate_at_speed(self.velocity).min(o.max_turn_rate).to_radians();
        let body_step = o.body_turn.clamp(-max_turn, max_turn);
        o.body_turn -= body_step;
        self.heading = normalize_absolute_angle(self.heading + body_step);

        let gun_max = GUN_TURN_RATE_DEG.to_radians();
        let gun_step = o.gun_turn.clamp(-gun_max, gun_max);
        o.gun_turn -= gun_step;
        let gun_total = gun_step + if o.gun_free_of_body { 0.0 } else { body_step };
        self.gun_heading = normalize_absolute_angle(self.gun_heading + gun_total);

        let radar_max = RADAR_TURN_RATE_DEG.to_radians();
        let radar_step = match o.radar {
            RadarTurn::Sweep => radar_max,
            RadarTurn::By(remaining) => {
                let step = remaining.clamp(-radar_max, radar_max);
                o.radar = RadarTurn::By(remaining - step);
                step
            }
        };
        let carried = if !o.radar_free_of_gun {
            gun_total
        } else if !o.radar_free_of_body {
            body_step
        } else {
            0.0
        };
        let radar_from = self.radar_heading;
        let radar_sweep = radar_step + carried;
        self.radar_heading = normalize_absolute_angle(self.radar_heading + radar_sweep);

        self.velocity = next_velocity(self.velocity, o.distance, o.max_velocity);
        o.distance -= self.velocity;
        if o.distance.abs() < 1e-9 {
            o.distance = 0.0;
        }

        let next = project(self.position, self.heading, self.velocity);
        let min = DVec2::splat(ROBOT_HALF_WIDTH);
        let max = DVec2::new(ARENA_WIDTH - ROBOT_HALF_WIDTH, ARENA_HEIGHT - ROBOT_HALF_WIDTH);
        let clamped = next.clamp(min, max);
        let wall_hit = clamped != next;
        if wall_hit {
            self.energy -= wall_damage(self.velocity);
            self.velocity = 0.0;
            o.distance = 0.0;
        }
        self.position = clamped;

        Motion {
            radar_from,
            radar_sweep,
            wall_hit,
        }
    }

    /// Cool the gun, then fire the pending order if the gun is cold.
    /// Returns the power actually spent.
    fn cool_and_fire(&mut self) -> Option<f64> {
        self.gun_heat = (self.gun_heat - GUN_COOLING_RATE).max(0.0);
        let requested = self.orders.fire.take()?;
        if self.gun_heat > 0.0 || self.energy <= 0.0 {
            return None;
        }
        let power = requested.clamp(MIN_BULLET_POWER, MAX_BULLET_POWER).min(self.energy);
        self.energy -= power;
        self.gun_heat = gun_heat_for(power);
        Some(power)
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub position: DVec2,
    pub heading: f64,
    pub power: f64,
    pub owner: usize,
    pub active: bool,
}

impl From<&Bullet> for BulletSnapshot {
    fn from(b: &Bullet) -> Self {
        Self {
            x: b.position.x,
            y: b.position.y,
            heading: b.heading,
            power: b.power,
            owner: b.owner,
        }
    }
}

/// Events the agent must hear about after a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickEvents {
    pub observation: Option<ObservationEvent>,
    pub wall_hit: bool,
}

/// Reference host: our robot (index 0) against a scripted opponent.
#[derive(Debug, Clone)]
pub struct ArenaState {
    pub robots: [Robot; 2],
    pub bullets: Vec<Bullet>,
    pub tick: u64,
    pub max_ticks: u64,
    pub stats: MatchStats,
    script: OpponentScript,
    strafe: f64,
}

impl ArenaState {
    /// Fixed spawns: agent facing east at (200, 300), opponent at (600, 300).
    pub fn new(script: OpponentScript) -> Self {
        Self::fixed(script, MAX_TICKS)
    }

    fn fixed(script: OpponentScript, max_ticks: u64) -> Self {
        Self::with_robots(
            Robot::new(DVec2::new(200.0, 300.0), PI / 2.0),
            Robot::new(DVec2::new(600.0, 300.0), 0.0),
            script,
            max_ticks,
        )
    }

    pub fn new_with_seed(seed: u64, script: OpponentScript, max_ticks: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let agent_pos = random_spot(&mut rng);
        let mut opponent_pos = random_spot(&mut rng);
        let mut tries = 0;
        while agent_pos.distance(opponent_pos) < MIN_SPAWN_DISTANCE && tries < 32 {
            opponent_pos = random_spot(&mut rng);
            tries += 1;
        }
        if agent_pos.distance(opponent_pos) < MIN_SPAWN_DISTANCE {
            return Self::fixed(script, max_ticks);
        }
        let agent = Robot::new(agent_pos, rng.gen_range(0.0..TAU));
        let opponent = Robot::new(opponent_pos, rng.gen_range(0.0..TAU));
        Self::with_robots(agent, opponent, script, max_ticks)
    }

    pub fn with_robots(
        agent: Robot,
        opponent: Robot,
        script: OpponentScript,
        max_ticks: u64,
    ) -> Self {
        let mut state = Self {
            robots: [agent, opponent],
            bullets: Vec::new(),
            tick: 0,
            max_ticks,
            stats: MatchStats::default(),
            script,
            strafe: 1.0,
        };
        state.sync_stats();
        state
    }

    pub fn agent(&self) -> &Robot {
        &self.robots[AGENT]
    }

    pub fn opponent(&self) -> &Robot {
        &self.robots[OPPONENT]
    }

    pub fn self_state(&self) -> SelfState {
        self.robots[AGENT].self_state(self.tick)
    }

    pub fn apply(&mut self, act: &ResolvedActuation) {
        self.robots[AGENT].apply(act);
    }

    pub fn is_terminal(&self) -> bool {
        self.tick >= self.max_ticks || !self.robots[AGENT].alive || !self.robots[OPPONENT].alive
    }

    pub fn outcome(&self) -> (MatchOutcome, MatchEndReason) {
        let agent_alive = self.robots[AGENT].alive;
        let opponent_alive = self.robots[OPPONENT].alive;

        match (agent_alive, opponent_alive) {
            (false, false) => (MatchOutcome::Draw, MatchEndReason::Elimination),
            (true, false) => (MatchOutcome::AgentWin, MatchEndReason::Elimination),
            (false, true) => (MatchOutcome::OpponentWin, MatchEndReason::Elimination),
            (true, true) => {
                let agent = self.robots[AGENT].energy;
                let opponent = self.robots[OPPONENT].energy;
                let outcome = if agent > opponent {
                    MatchOutcome::AgentWin
                } else if opponent > agent {
                    MatchOutcome::OpponentWin
                } else {
                    MatchOutcome::Draw
                };
                (outcome, MatchEndReason::Timeout)
            }
        }
    }

    pub fn frame(
        &self,
        observation: Option<ObservationEvent>,
        commands: Vec<Command>,
        wall_hit: bool,
    ) -> ReplayFrame {
        ReplayFrame {
            tick: self.tick,
            robots: [self.robots[AGENT].snapshot(), self.robots[OPPONENT].snapshot()],
            bullets: self.bullets.iter().map(BulletSnapshot::from).collect(),
            observation,
            commands,
            wall_hit,
        }
    }

    /// Advance one tick and report what the agent saw.
    pub fn step(&mut self) -> TickEvents {
        self.tick += 1;
        let opponent_fire = self.drive_opponent();

        let mut events = TickEvents::default();
        let mut radar = None;

        for idx in [AGENT, OPPONENT] {
            if !self.robots[idx].alive {
                continue;
            }
            let motion = self.robots[idx].step_motion();
            if motion.wall_hit {
                self.on_wall_hit(idx);
                if idx == AGENT {
                    events.wall_hit = true;
                }
            }
            if idx == AGENT {
                radar = Some((motion.radar_from, motion.radar_sweep));
            }

            if idx == OPPONENT {
                if let Some(power) = opponent_fire {
                    self.lay_opponent_gun(power);
                }
            }

            if let Some(power) = self.robots[idx].cool_and_fire() {
                let robot = &self.robots[idx];
                self.bullets.push(Bullet {
                    position: robot.position,
                    heading: robot.gun_heading,
                    power,
                    owner: idx,
                    active: true,
                });
                match idx {
                    AGENT => self.stats.agent_shots += 1,
                    _ => self.stats.opponent_shots += 1,
                }
            }
        }

        self.step_bullets();
        self.bullets.retain(|b| b.active);

        for robot in &mut self.robots {
            if robot.alive && robot.energy <= 0.0 {
                robot.energy = 0.0;
                robot.alive = false;
            }
        }

        if let Some((from, sweep)) = radar {
            if self.radar_sees(from, sweep) {
                events.observation = Some(self.observe());
                self.stats.observations += 1;
            }
        }

        self.sync_stats();
        events
    }

    fn on_wall_hit(&mut self, idx: usize) {
        if idx == AGENT {
            self.stats.agent_wall_hits += 1;
            return;
        }
        match self.script {
            OpponentScript::SittingDuck => {}
            OpponentScript::Circler => {
                let robot = &mut self.robots[OPPONENT];
                robot.heading = normalize_absolute_angle(robot.heading + PI);
            }
            OpponentScript::Oscillator => self.strafe = -self.strafe,
        }
    }

    /// Set the opponent's motion orders for this tick and return the power
    /// it wants to fire, if any.
    fn drive_opponent(&mut self) -> Option<f64> {
        let target = self.robots[AGENT].position;
        let tick = self.tick;
        let strafe = self.strafe;
        let robot = &mut self.robots[OPPONENT];

        let fire = match self.script {
            OpponentScript::SittingDuck => None,
            OpponentScript::Circler => {
                robot.orders.body_turn = 3f64.to_radians();
                robot.orders.max_velocity = 6.0;
                robot.orders.distance = 100.0;
                (tick % 25 == 0).then_some(1.0)
            }
            OpponentScript::Oscillator => {
                let to_agent = bearing_to(robot.position, target);
                robot.orders.body_turn =
                    normalize_relative_angle(to_agent + PI / 2.0 - robot.heading);
                robot.orders.distance = 100.0 * strafe;
                (tick % 30 == 0).then_some(2.0)
            }
        };

        if tick % 40 == 0 && self.script == OpponentScript::Oscillator {
            self.strafe = -self.strafe;
        }
        fire
    }

    /// Scripted gunner: perfect head-on aim from where both robots stand
    /// after moving, no lead.
    fn lay_opponent_gun(&mut self, power: f64) {
        let target = self.robots[AGENT].position;
        let robot = &mut self.robots[OPPONENT];
        robot.gun_heading = bearing_to(robot.position, target);
        robot.orders.gun_turn = 0.0;
        robot.orders.fire = Some(power);
    }

    fn step_bullets(&mut self) {
        for bullet in &mut self.bullets {
            if !bullet.active {
                continue;
            }
            bullet.position = project(bullet.position, bullet.heading, bullet_speed(bullet.power));

            let p = bullet.position;
            if p.x < 0.0 || p.y < 0.0 || p.x > ARENA_WIDTH || p.y > ARENA_HEIGHT {
                bullet.active = false;
                continue;
            }

            let target = 1 - bullet.owner;
            if !self.robots[target].alive {
                continue;
            }
            if self.robots[target].position.distance(p) <= ROBOT_HALF_WIDTH {
                self.robots[target].energy -= bullet_damage(bullet.power);
                self.robots[bullet.owner].energy += 3.0 * bullet.power;
                bullet.active = false;
                match bullet.owner {
                    AGENT => self.stats.agent_hits += 1,
                    _ => self.stats.opponent_hits += 1,
                }
            }
        }
    }

    /// Did the agent's radar beam pass over the opponent this tick?
    fn radar_sees(&self, from: f64, sweep: f64) -> bool {
        let me = &self.robots[AGENT];
        let them = &self.robots[OPPONENT];
        if !me.alive || !them.alive {
            return false;
        }
        let distance = me.position.distance(them.position);
        if distance > RADAR_SCAN_RADIUS {
            return false;
        }
        let half_width = if distance > 0.0 {
            (ROBOT_HALF_WIDTH / distance).atan()
        } else {
            PI
        };
        let offset = normalize_relative_angle(bearing_to(me.position, them.position) - from);
        offset >= sweep.min(0.0) - half_width && offset <= sweep.max(0.0) + half_width
    }

    fn observe(&self) -> ObservationEvent {
        let me = &self.robots[AGENT];
        let them = &self.robots[OPPONENT];
        let absolute = bearing_to(me.position, them.position);
        ObservationEvent::new(
            normalize_relative_angle(absolute - me.heading),
            me.position.distance(them.position),
            them.heading,
            them.velocity,
            them.energy,
        )
    }

    fn sync_stats(&mut self) {
        self.stats.agent_energy = self.robots[AGENT].energy;
        self.stats.opponent_energy = self.robots[OPPONENT].energy;
    }
}

fn random_spot(rng: &mut Pcg64) -> DVec2 {
    DVec2::new(
        rng.gen_range(SPAWN_MARGIN..ARENA_WIDTH - SPAWN_MARGIN),
        rng.gen_range(SPAWN_MARGIN..ARENA_HEIGHT - SPAWN_MARGIN),
    )
}

/// Body turn limit in degrees per tick (slower when moving fast).
pub fn turn_rate_at_speed(velocity: f64) -> f64 {
    MAX_TURN_RATE_DEG - TURN_RATE_VELOCITY_PENALTY_DEG * velocity.abs()
}

/// Velocity after one tick of pursuing `distance` remaining travel.
pub fn next_velocity(velocity: f64, distance: f64, max_velocity: f64) -> f64 {
    let goal = if distance.abs() < 1e-9 {
        0.0
    } else {
        let stopping = (2.0 * DECELERATION * distance.abs()).sqrt().min(distance.abs());
        distance.signum() * max_velocity.min(stopping)
    };
    let speeding_up = goal * velocity >= 0.0 && goal.abs() > velocity.abs();
    let rate = if speeding_up { ACCELERATION } else { DECELERATION };
    velocity + (goal - velocity).clamp(-rate, rate)
}

pub fn bullet_speed(power: f64) -> f64 {
    20.0 - 3.0 * power
}

pub fn bullet_damage(power: f64) -> f64 {
    4.0 * power + 2.0 * (power - 1.0).max(0.0)
}

pub fn gun_heat_for(power: f64) -> f64 {
    1.0 + power / 5.0
}

pub fn wall_damage(velocity: f64) -> f64 {
    (velocity.abs() * 0.5 - 1.0).max(0.0)
}
