use baneblade_shared::*;

/// True when an energy drop from `last_energy` to `current_energy` looks like
/// the opponent paying for a bullet (inclusive band 0.1..=3).
pub fn enemy_fired(last_energy: f64, current_energy: f64) -> bool {
    drop_in_band(last_energy - current_energy, FIRED_ENERGY_MIN, FIRED_ENERGY_MAX)
}

fn drop_in_band(drop: f64, min: f64, max: f64) -> bool {
    drop >= min && drop <= max
}

/// Last observed opponent energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatMemory {
    last_energy: f64,
    min_drop: f64,
    max_drop: f64,
}

impl ThreatMemory {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            last_energy: config.initial_enemy_energy,
            min_drop: config.fired_energy_min,
            max_drop: config.fired_energy_max,
        }
    }

    pub fn last_energy(&self) -> f64 {
        self.last_energy
    }

    /// Infer whether the opponent fired since the previous observation, then
    /// remember `energy` whatever the answer.
    pub fn observe(&mut self, energy: f64) -> bool {
        let fired = drop_in_band(self.last_energy - energy, self.min_drop, self.max_drop);
        self.last_energy = energy;
        fired
    }
}

impl Default for ThreatMemory {
    fn default() -> Self {
        Self::new(&AgentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_fired_band() {
        assert!(enemy_fired(100.0, 99.0));
        assert!(!enemy_fired(100.0, 100.0));
        assert!(!enemy_fired(100.0, 95.0));
        assert!(!enemy_fired(100.0, 99.95));
        // Band edges are inclusive.
        assert!(enemy_fired(100.0, 97.0));
        assert!(enemy_fired(10.0, 9.5));
        // Energy gains never count.
        assert!(!enemy_fired(50.0, 53.0));
    }

    #[test]
    fn test_memory_updates_unconditionally() {
        let mut memory = ThreatMemory::default();
        assert_eq!(memory.last_energy(), 100.0);

        // Large loss (ramming, bullet hit): not a shot, still remembered.
        assert!(!memory.observe(84.0));
        assert_eq!(memory.last_energy(), 84.0);

        // Compared against the previous observation, not the starting value.
        assert!(memory.observe(82.0));
        assert_eq!(memory.last_energy(), 82.0);

        // Same energy again: nothing fired.
        assert!(!memory.observe(82.0));
    }

    #[test]
    fn test_memory_uses_configured_band() {
        let config = AgentConfig {
            fired_energy_min: 1.0,
            fired_energy_max: 2.0,
            initial_enemy_energy: 50.0,
            ..Default::default()
        };
        let mut memory = ThreatMemory::new(&config);
        assert!(!memory.observe(49.5));
        assert!(memory.observe(48.0));
        assert!(!memory.observe(45.0));
    }
}
