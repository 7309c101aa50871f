//! Heritable trait vectors for the two agent kinds.
//!
//! Trait counts are fixed per kind and traits only ever change at reproduction
//! time; a living agent's genome is immutable.

use rand::Rng;
use serde::{Deserialize, Serialize};
use vivarium_core::{Kind, SpeciesConfig};

/// Forager traits: signed attraction weights and perception radii for the food
/// and poison channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForagerGenome {
    pub food_attraction: f64,
    pub poison_attraction: f64,
    pub food_perception: f64,
    pub poison_perception: f64,
}

/// Predator traits: attraction weight and perception radius for prey
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredatorGenome {
    pub prey_attraction: f64,
    pub prey_perception: f64,
}

/// Kind-tagged genome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Genome {
    Forager(ForagerGenome),
    Predator(PredatorGenome),
}

impl Genome {
    /// Genesis genome: every trait drawn uniformly from the species ranges
    pub fn random<R: Rng>(kind: Kind, species: &SpeciesConfig, rng: &mut R) -> Self {
        match kind {
            Kind::Forager => Genome::Forager(ForagerGenome {
                food_attraction: species.attraction.sample(rng),
                poison_attraction: species.attraction.sample(rng),
                food_perception: species.perception.sample(rng),
                poison_perception: species.perception.sample(rng),
            }),
            Kind::Predator => Genome::Predator(PredatorGenome {
                prey_attraction: species.attraction.sample(rng),
                prey_perception: species.perception.sample(rng),
            }),
        }
    }

    /// Derive an offspring genome with independent uniform noise per trait.
    ///
    /// Attraction traits drift by up to `mutation_rate` (the parent's current,
    /// possibly decayed rate); perception radii drift by the fixed
    /// `perception_drift` magnitude. The parent genome is untouched.
    pub fn offspring<R: Rng>(
        &self,
        mutation_rate: f64,
        perception_drift: f64,
        rng: &mut R,
    ) -> Self {
        let mut drift = |magnitude: f64| rng.gen_range(-magnitude..=magnitude);
        match self {
            Genome::Forager(g) => Genome::Forager(ForagerGenome {
                food_attraction: g.food_attraction + drift(mutation_rate),
                poison_attraction: g.poison_attraction + drift(mutation_rate),
                food_perception: g.food_perception + drift(perception_drift),
                poison_perception: g.poison_perception + drift(perception_drift),
            }),
            Genome::Predator(g) => Genome::Predator(PredatorGenome {
                prey_attraction: g.prey_attraction + drift(mutation_rate),
                prey_perception: g.prey_perception + drift(perception_drift),
            }),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Genome::Forager(_) => Kind::Forager,
            Genome::Predator(_) => Kind::Predator,
        }
    }
}
