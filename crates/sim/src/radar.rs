use baneblade_shared::*;
use tracing::trace;

use crate::geometry::{absolute_bearing, normalize_relative_angle};

/// Sweeps until the opponent shows up, then re-centres on every reading,
/// overshooting by `arc` so the beam crosses the opponent again next tick.
#[derive(Debug, Clone, Copy)]
pub struct RadarController {
    arc: f64,
}

impl RadarController {
    pub fn new(arc: f64) -> Self {
        Self { arc }
    }

    pub fn start(&self, out: &mut Actuation) {
        out.sweep_radar();
    }

    /// Returns the commanded radar turn in radians.
    pub fn track(&self, me: &SelfState, obs: &ObservationEvent, out: &mut Actuation) -> f64 {
        let bearing = absolute_bearing(me.heading, obs.bearing);
        let turn = normalize_relative_angle(bearing - me.radar_heading) * self.arc;
        trace!(tick = me.time, turn, "radar re-lock");
        out.turn_radar_right(turn);
        turn
    }
}

impl Default for RadarController {
    fn default() -> Self {
        Self::new(RADAR_ARC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_start_sweeps() {
        let mut out = Actuation::new();
        RadarController::default().start(&mut out);
        assert_eq!(out.resolve().radar_turn, Some(RadarTurn::Sweep));
    }

    #[test]
    fn test_track_overshoots_by_arc() {
        let me = SelfState {
            heading: 0.5,
            radar_heading: 0.2,
            ..Default::default()
        };
        // Opponent at absolute bearing 0.5 + 0.1 = 0.6, radar 0.4 behind.
        let obs = ObservationEvent::new(0.1, 300.0, 0.0, 0.0, 100.0);
        let mut out = Actuation::new();
        let turn = RadarController::default().track(&me, &obs, &mut out);
        assert!((turn - 0.8).abs() < 1e-12);
        assert_eq!(out.resolve().radar_turn, Some(RadarTurn::By(turn)));
    }

    #[test]
    fn test_track_wraps_the_short_way() {
        let me = SelfState {
            heading: 0.0,
            radar_heading: 2.0 * PI - 0.1,
            ..Default::default()
        };
        let obs = ObservationEvent::new(0.1, 300.0, 0.0, 0.0, 100.0);
        let mut out = Actuation::new();
        let turn = RadarController::new(2.0).track(&me, &obs, &mut out);
        assert!((turn - 0.4).abs() < 1e-9, "turn = {turn}");
    }
}
