//! Driver-owned world: collections, tick loop, and run statistics.

use crate::agent::{Agent, Environment};
use crate::genome::Genome;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vivarium_core::{Kind, PopulationSnapshot, SimConfig, TraitStats, Vec2};

/// The simulation world. Owns the food points and both agent lists; agents
/// borrow them one tick at a time.
pub struct World {
    config: SimConfig,
    foragers: Vec<Agent>,
    predators: Vec<Agent>,
    food: Vec<Vec2>,
    /// Latent poison channel, refreshed from predator positions each tick
    poison: Vec<Vec2>,
    rng: ChaCha8Rng,
    tick: u64,
    history: Vec<PopulationSnapshot>,
}

impl World {
    pub fn new(config: SimConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let foragers = (0..config.world.initial_foragers)
            .map(|_| {
                let position = scatter(&config.world, &mut rng);
                Agent::spawn_random(Kind::Forager, config.forager, position, &mut rng)
            })
            .collect();

        let predators = (0..config.world.initial_predators)
            .map(|_| {
                let position = scatter(&config.world, &mut rng);
                Agent::spawn_random(Kind::Predator, config.predator, position, &mut rng)
            })
            .collect();

        let food = (0..config.world.initial_food)
            .map(|_| scatter(&config.world, &mut rng))
            .collect();

        Self {
            config,
            foragers,
            predators,
            food,
            poison: Vec::new(),
            rng,
            tick: 0,
            history: Vec::new(),
        }
    }

    /// Run the configured number of ticks, stopping early on extinction
    pub fn run(&mut self) -> WorldSummary {
        info!(
            num_ticks = self.config.num_ticks,
            seed = self.config.seed,
            foragers = self.foragers.len(),
            predators = self.predators.len(),
            food = self.food.len(),
            "starting simulation"
        );

        for _ in 0..self.config.num_ticks {
            self.step();

            if self.foragers.is_empty() && self.predators.is_empty() {
                info!(tick = self.tick, "both populations extinct, stopping early");
                break;
            }
        }

        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            foragers = summary.foragers,
            predators = summary.predators,
            food = summary.food,
            "simulation finished"
        );
        summary
    }

    /// Advance the world by one tick
    pub fn step(&mut self) {
        self.tick += 1;
        let (width, height) = (self.config.world.width, self.config.world.height);

        // The poison channel carries current rival predator positions; the
        // collection itself is never consumed from.
        self.poison.clear();
        self.poison.extend(self.predators.iter().map(|p| p.position));

        // Predators first, as in the reference driver. Reverse index order
        // keeps removal and insertion safe against index shift.
        let mut i = self.predators.len();
        while i > 0 {
            i -= 1;
            let outcome = self.predators[i].step(
                &mut Environment {
                    food: &mut self.food,
                    poison: &mut self.poison,
                    prey: &mut self.foragers,
                    width,
                    height,
                },
                &mut self.rng,
            );

            if let Some(child) = outcome.offspring {
                debug!(parent = %self.predators[i].id, child = %child.id, tick = self.tick, "predator born");
                self.predators.push(child);
            }
            if !outcome.alive {
                let dead = self.predators.remove(i);
                debug!(agent = %dead.id, tick = self.tick, "predator died");
            }
        }

        for _ in 0..self.config.world.food_per_tick {
            let position = scatter(&self.config.world, &mut self.rng);
            self.food.push(position);
        }

        let mut i = self.foragers.len();
        while i > 0 {
            i -= 1;
            let outcome = self.foragers[i].step(
                &mut Environment {
                    food: &mut self.food,
                    poison: &mut self.poison,
                    prey: &mut [],
                    width,
                    height,
                },
                &mut self.rng,
            );

            if let Some(child) = outcome.offspring {
                debug!(parent = %self.foragers[i].id, child = %child.id, tick = self.tick, "forager born");
                self.foragers.push(child);
            }
            if !outcome.alive {
                let dead = self.foragers.remove(i);
                debug!(agent = %dead.id, tick = self.tick, "forager died");
                // a forager corpse becomes food
                self.food.push(dead.position);
            }
        }

        self.history.push(PopulationSnapshot {
            tick: self.tick,
            foragers: self.foragers.len(),
            predators: self.predators.len(),
            food: self.food.len(),
        });

        if self.tick % self.config.world.metrics_interval == 0 {
            self.emit_population_metrics();
        }
    }

    fn emit_population_metrics(&self) {
        let traits = self.trait_summary();
        info!(
            tick = self.tick,
            foragers = self.foragers.len(),
            predators = self.predators.len(),
            food = self.food.len(),
            food_attraction_mean = traits.forager.food_attraction.mean,
            poison_attraction_mean = traits.forager.poison_attraction.mean,
            food_perception_mean = traits.forager.food_perception.mean,
            poison_perception_mean = traits.forager.poison_perception.mean,
            prey_attraction_mean = traits.predator.prey_attraction.mean,
            prey_perception_mean = traits.predator.prey_perception.mean,
            "population metrics snapshot"
        );
    }

    fn trait_summary(&self) -> TraitSummary {
        let mut food_attraction = Vec::with_capacity(self.foragers.len());
        let mut poison_attraction = Vec::with_capacity(self.foragers.len());
        let mut food_perception = Vec::with_capacity(self.foragers.len());
        let mut poison_perception = Vec::with_capacity(self.foragers.len());
        for agent in &self.foragers {
            if let Genome::Forager(g) = &agent.genome {
                food_attraction.push(g.food_attraction);
                poison_attraction.push(g.poison_attraction);
                food_perception.push(g.food_perception);
                poison_perception.push(g.poison_perception);
            }
        }

        let mut prey_attraction = Vec::with_capacity(self.predators.len());
        let mut prey_perception = Vec::with_capacity(self.predators.len());
        for agent in &self.predators {
            if let Genome::Predator(g) = &agent.genome {
                prey_attraction.push(g.prey_attraction);
                prey_perception.push(g.prey_perception);
            }
        }

        TraitSummary {
            forager: ForagerTraitStats {
                food_attraction: TraitStats::from_samples(&food_attraction),
                poison_attraction: TraitStats::from_samples(&poison_attraction),
                food_perception: TraitStats::from_samples(&food_perception),
                poison_perception: TraitStats::from_samples(&poison_perception),
            },
            predator: PredatorTraitStats {
                prey_attraction: TraitStats::from_samples(&prey_attraction),
                prey_perception: TraitStats::from_samples(&prey_perception),
            },
        }
    }

    /// Finalized run statistics
    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            ticks: self.tick,
            foragers: self.foragers.len(),
            predators: self.predators.len(),
            food: self.food.len(),
            traits: self.trait_summary(),
            history: self.history.clone(),
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn foragers(&self) -> &[Agent] {
        &self.foragers
    }

    pub fn predators(&self) -> &[Agent] {
        &self.predators
    }

    pub fn food(&self) -> &[Vec2] {
        &self.food
    }
}

/// Uniform random position inside the world's spawn margin
fn scatter<R: Rng>(world: &vivarium_core::WorldConfig, rng: &mut R) -> Vec2 {
    Vec2::new(
        rng.gen_range(world.spawn_margin..world.width - world.spawn_margin),
        rng.gen_range(world.spawn_margin..world.height - world.spawn_margin),
    )
}

/// Per-trait statistics for the forager population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForagerTraitStats {
    pub food_attraction: TraitStats,
    pub poison_attraction: TraitStats,
    pub food_perception: TraitStats,
    pub poison_perception: TraitStats,
}

/// Per-trait statistics for the predator population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredatorTraitStats {
    pub prey_attraction: TraitStats,
    pub prey_perception: TraitStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitSummary {
    pub forager: ForagerTraitStats,
    pub predator: PredatorTraitStats,
}

/// End-of-run report: final counts, trait statistics, population history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSummary {
    pub ticks: u64,
    pub foragers: usize,
    pub predators: usize,
    pub food: usize,
    pub traits: TraitSummary,
    pub history: Vec<PopulationSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vivarium_core::AgentId;

    fn small_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.seed = 42;
        config.num_ticks = 50;
        config.world.initial_foragers = 8;
        config.world.initial_predators = 3;
        config.world.initial_food = 20;
        config
    }

    #[test]
    fn test_world_spawns_initial_populations() {
        let world = World::new(small_config());
        assert_eq!(world.foragers().len(), 8);
        assert_eq!(world.predators().len(), 3);
        assert_eq!(world.food().len(), 20);
    }

    #[test]
    fn test_agents_spawn_inside_margin() {
        let config = small_config();
        let world = World::new(config.clone());
        let margin = config.world.spawn_margin;
        for agent in world.foragers().iter().chain(world.predators()) {
            assert!(agent.position.x >= margin && agent.position.x <= config.world.width - margin);
            assert!(agent.position.y >= margin && agent.position.y <= config.world.height - margin);
        }
    }

    #[test]
    fn test_step_advances_tick_and_spawns_food() {
        let mut world = World::new(small_config());
        let food_before = world.food().len();
        world.step();
        assert_eq!(world.tick_count(), 1);
        // at least the per-tick spawn landed; consumption may offset it
        assert!(world.food().len() <= food_before + 1 + 8);
    }

    #[test]
    fn test_dead_agents_are_removed() {
        let mut config = small_config();
        config.world.food_per_tick = 0;
        let mut world = World::new(config);
        world.food.clear();
        let doomed: Vec<AgentId> = world.foragers.iter().map(|a| a.id).collect();
        for agent in &mut world.foragers {
            agent.health = 0.001;
        }
        world.step();
        // every starved agent is gone; only same-tick offspring may remain
        assert!(world.foragers().iter().all(|a| !doomed.contains(&a.id)));
    }

    #[test]
    fn test_forager_corpse_becomes_food() {
        let mut config = small_config();
        config.world.food_per_tick = 0;
        let mut world = World::new(config);
        world.predators.clear();
        world.food.clear();
        let positions: Vec<Vec2> = world.foragers.iter().map(|a| a.position).collect();
        for agent in &mut world.foragers {
            agent.health = 0.001;
        }

        world.step();

        // one corpse per dead forager
        assert_eq!(world.food().len(), positions.len());
        for position in positions {
            assert!(world.food().contains(&position));
        }
    }

    #[test]
    fn test_run_records_history() {
        let mut world = World::new(small_config());
        let summary = world.run();
        assert_eq!(summary.history.len() as u64, summary.ticks);
        assert!(summary.ticks <= 50);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let summary_a = World::new(small_config()).run();
        let summary_b = World::new(small_config()).run();
        assert_eq!(summary_a.ticks, summary_b.ticks);
        assert_eq!(summary_a.foragers, summary_b.foragers);
        assert_eq!(summary_a.predators, summary_b.predators);
        assert_eq!(summary_a.food, summary_b.food);
        assert_eq!(
            summary_a.traits.forager.food_attraction.mean,
            summary_b.traits.forager.food_attraction.mean
        );
    }

    #[test]
    fn test_summary_serializes() {
        let mut world = World::new(small_config());
        world.step();
        let summary = world.summary();
        let json = serde_json::to_string(&summary).unwrap();
        let parsed: WorldSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ticks, summary.ticks);
        assert_eq!(parsed.history.len(), summary.history.len());
    }
}
