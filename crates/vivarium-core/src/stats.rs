//! Population and trait statistics collected over a run.

use serde::{Deserialize, Serialize};

/// Summary statistics for one heritable trait across a population
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraitStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl TraitStats {
    /// Compute stats over a sample slice; an empty slice yields all zeros
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            samples: samples.len(),
        }
    }
}

/// Per-tick population counts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub tick: u64,
    pub foragers: usize,
    pub predators: usize,
    pub food: usize,
}
