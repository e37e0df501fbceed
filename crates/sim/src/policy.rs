use baneblade_shared::{Actuation, ObservationEvent, SelfState};

/// An agent driven by host events. Each handler runs one bounded decision
/// and returns the commands issued during it.
pub trait Policy: Send {
    fn name(&self) -> &str;

    /// Called once before the first tick.
    fn on_start(&mut self) -> Actuation {
        Actuation::new()
    }

    fn on_observation(&mut self, me: &SelfState, obs: &ObservationEvent) -> Actuation;

    fn on_hit_wall(&mut self) {}
}

/// Policy that does nothing - useful for testing.
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn name(&self) -> &str {
        "idle"
    }

    fn on_observation(&mut self, _me: &SelfState, _obs: &ObservationEvent) -> Actuation {
        Actuation::new()
    }
}
