//! Configuration types for the simulation.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range a heritable trait is drawn from at genesis
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraitRange {
    pub min: f64,
    pub max: f64,
}

impl TraitRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw a uniform value from the range
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Per-kind constants shared by every agent of a species
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Velocity magnitude cap
    pub max_speed: f64,
    /// Steering force magnitude cap
    pub max_force: f64,
    /// Geometric footprint; predators use half of it for the capture radius
    pub size: f64,
    /// Passive health decay per tick
    pub death_rate: f64,
    /// Mutation rate a fresh agent starts with
    pub base_mutation_rate: f64,
    /// Reproduction is a 1-in-`spawn_odds` draw per tick
    pub spawn_odds: u32,
    /// Health gained per capture
    pub diet: f64,
    /// Health inflicted on captured prey (predators only)
    pub bite_damage: f64,
    /// Genesis range for attraction traits
    pub attraction: TraitRange,
    /// Genesis range for perception radii
    pub perception: TraitRange,
    /// Fixed drift magnitude applied to perception radii at reproduction
    pub perception_drift: f64,
}

impl SpeciesConfig {
    /// Reference constants for foragers
    pub fn forager() -> Self {
        Self {
            max_speed: 7.5,
            max_force: 0.7,
            size: 15.0,
            death_rate: 0.006,
            base_mutation_rate: 0.25,
            spawn_odds: 250,
            diet: 0.9,
            bite_damage: 0.0,
            attraction: TraitRange::new(-3.0, 3.0),
            perception: TraitRange::new(10.0, 120.0),
            perception_drift: 10.0,
        }
    }

    /// Reference constants for predators
    pub fn predator() -> Self {
        Self {
            max_speed: 5.5,
            max_force: 0.85,
            size: 20.0,
            death_rate: 0.008,
            base_mutation_rate: 0.1,
            spawn_odds: 370,
            diet: 0.09,
            bite_damage: 0.1,
            attraction: TraitRange::new(-5.0, 5.0),
            perception: TraitRange::new(50.0, 150.0),
            perception_drift: 10.0,
        }
    }
}

/// World dimensions and driver-level cadences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width
    pub width: f64,
    /// World height
    pub height: f64,
    /// Margin kept clear when scattering food and genesis agents
    pub spawn_margin: f64,
    /// Food points added per tick
    pub food_per_tick: u32,
    /// Food points scattered at startup
    pub initial_food: usize,
    /// Genesis forager population
    pub initial_foragers: usize,
    /// Genesis predator population
    pub initial_predators: usize,
    /// Ticks between population metrics log lines
    pub metrics_interval: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            spawn_margin: 10.0,
            food_per_tick: 1,
            initial_food: 100,
            initial_foragers: 50,
            initial_predators: 10,
            metrics_interval: 100,
        }
    }
}

/// Full simulation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of ticks to run the simulation
    pub num_ticks: u64,
    /// Random seed for the run
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Forager species constants
    pub forager: SpeciesConfig,
    /// Predator species constants
    pub predator: SpeciesConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_ticks: 10_000,
            seed: 0,
            world: WorldConfig::default(),
            forager: SpeciesConfig::forager(),
            predator: SpeciesConfig::predator(),
        }
    }
}

impl SimConfig {
    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        for (kind, species) in [("forager", &self.forager), ("predator", &self.predator)] {
            if species.max_speed <= 0.0 || species.max_force <= 0.0 {
                return Err(Error::Config(format!(
                    "{kind}: max_speed and max_force must be positive"
                )));
            }
            if species.spawn_odds == 0 {
                return Err(Error::Config(format!("{kind}: spawn_odds must be nonzero")));
            }
            for range in [&species.attraction, &species.perception] {
                if range.min > range.max {
                    return Err(Error::Config(format!("{kind}: trait range min exceeds max")));
                }
            }
        }
        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return Err(Error::Config("world dimensions must be positive".to_string()));
        }
        if self.world.width <= 2.0 * self.world.spawn_margin
            || self.world.height <= 2.0 * self.world.spawn_margin
        {
            return Err(Error::Config(
                "world dimensions must leave room inside the spawn margin".to_string(),
            ));
        }
        if self.world.metrics_interval == 0 {
            return Err(Error::Config("metrics_interval must be nonzero".to_string()));
        }
        Ok(())
    }
}
