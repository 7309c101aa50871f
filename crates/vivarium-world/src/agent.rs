//! Agent state: kinematics, steering, health lifecycle, and reproduction.

use crate::genome::Genome;
use crate::perception;
use rand::Rng;
use serde::{Deserialize, Serialize};
use vivarium_core::{AgentId, Kind, SpeciesConfig, Vec2};

/// Lifespan advance per tick
const LIFESPAN_STEP: f64 = 1.0 / 30_000.0;
/// Below this decayed rate the mutation rate snaps back to the floor
const MUTATION_DECAY_CUTOFF: f64 = 0.01;
/// Floor-reset value for the mutation rate
const MUTATION_FLOOR: f64 = 0.05;
/// Distance from a world edge at which boundary repulsion kicks in
const EDGE_MARGIN: f64 = 15.0;

/// One steering-driven agent. The same concrete struct covers both kinds;
/// behavior dispatches on the genome variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub kind: Kind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Per-tick force accumulator, zeroed after every integration
    acceleration: Vec2,
    /// Health in [0, 1], clamped both ways
    pub health: f64,
    /// Time-in-existence proxy; starts at 1, zeroed on death
    pub lifespan: f64,
    /// Decays over the agent's lifespan; bounds offspring trait drift
    pub mutation_rate: f64,
    /// Terminal once false; the driver removes the agent
    pub alive: bool,
    /// Overlay flag for perception-radius rendering; no effect on behavior
    pub debug: bool,
    pub genome: Genome,
    pub species: SpeciesConfig,
}

/// Mutable slice of the world an agent sees for one tick. The driver owns the
/// collections; the agent only borrows them.
pub struct Environment<'a> {
    /// Consumable food points
    pub food: &'a mut Vec<Vec2>,
    /// The latent poison channel; the driver feeds it rival predator positions
    pub poison: &'a mut Vec<Vec2>,
    /// Rival agents a predator can capture
    pub prey: &'a mut [Agent],
    pub width: f64,
    pub height: f64,
}

/// What one tick of behavior reported back to the driver
#[derive(Debug)]
pub struct StepOutcome {
    pub alive: bool,
    pub offspring: Option<Agent>,
}

impl Agent {
    /// Genesis agent with a uniformly drawn genome
    pub fn spawn_random<R: Rng>(
        kind: Kind,
        species: SpeciesConfig,
        position: Vec2,
        rng: &mut R,
    ) -> Self {
        let genome = Genome::random(kind, &species, rng);
        Self::with_genome(kind, species, position, genome)
    }

    /// Reproduction path: parent's position, mutated genome, fresh defaults
    /// everywhere else. The parent is never modified.
    pub fn spawn_from<R: Rng>(parent: &Agent, rng: &mut R) -> Self {
        let genome = parent.genome.offspring(
            parent.mutation_rate,
            parent.species.perception_drift,
            rng,
        );
        Self::with_genome(parent.kind, parent.species, parent.position, genome)
    }

    fn with_genome(kind: Kind, species: SpeciesConfig, position: Vec2, genome: Genome) -> Self {
        Self {
            id: AgentId::new(),
            kind,
            position,
            velocity: Vec2::new(0.0, 1.0),
            acceleration: Vec2::ZERO,
            health: 1.0,
            lifespan: 1.0,
            mutation_rate: species.base_mutation_rate,
            alive: true,
            debug: false,
            genome,
            species,
        }
    }

    /// Accumulate a force for this tick; no immediate effect on motion
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Semi-implicit Euler step with post-hoc speed clamping
    pub fn integrate(&mut self) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.limited(self.species.max_speed);
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
    }

    /// Steer toward `target`, clamped to `max_force`. Returned rather than
    /// applied so callers can scale it by a genome weight first. A target
    /// coincident with our own position yields a zero steer.
    pub fn seek(&self, target: Vec2) -> Vec2 {
        let offset = target - self.position;
        if offset.length() == 0.0 {
            return Vec2::ZERO;
        }
        let desired = offset.normalized() * self.species.max_speed;
        (desired - self.velocity).limited(self.species.max_force)
    }

    /// Repulsion away from world edges. The axis checks are independent and a
    /// y correction overwrites an x correction computed in the same call, so at
    /// most one correction applies per tick. The steer is applied directly
    /// without a `max_force` clamp.
    pub fn boundaries(&mut self, width: f64, height: f64) {
        let mut desired = None;

        if self.position.x < EDGE_MARGIN {
            desired = Some(Vec2::new(self.species.max_speed, self.velocity.y));
        } else if self.position.x > width - EDGE_MARGIN {
            desired = Some(Vec2::new(-self.species.max_speed, self.velocity.y));
        }

        if self.position.y < EDGE_MARGIN {
            desired = Some(Vec2::new(self.velocity.x, self.species.max_speed));
        } else if self.position.y > height - EDGE_MARGIN {
            desired = Some(Vec2::new(self.velocity.x, -self.species.max_speed));
        }

        if let Some(desired) = desired {
            let desired = desired.normalized() * self.species.max_speed;
            let steer = desired - self.velocity;
            self.apply_force(steer);
        }
    }

    /// Adjust health by `delta`, clamped to [0, 1]. Reaching zero kills the
    /// agent immediately and irreversibly.
    pub fn calc_health(&mut self, delta: f64) {
        self.health += delta;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.lifespan = 0.0;
            self.alive = false;
        }
        if self.health >= 1.0 {
            self.health = 1.0;
        }
    }

    /// Aging, mutation-rate decay, passive health decay, then integration.
    ///
    /// The mutation rate shrinks by a factor of `1/lifespan` each tick until
    /// the decayed value would drop under the cutoff, at which point it resets
    /// to the floor. The reset is the literal policy, not a clamp: the rate can
    /// jump back up after decaying below the floor.
    pub fn update(&mut self) {
        self.lifespan += LIFESPAN_STEP;

        let decay = 1.0 / self.lifespan;
        if self.mutation_rate * decay >= MUTATION_DECAY_CUTOFF {
            self.mutation_rate *= decay;
        } else {
            self.mutation_rate = MUTATION_FLOOR;
        }

        self.calc_health(-self.species.death_rate);
        self.integrate();
    }

    /// One full behavior tick: perception-weighted steering, boundary
    /// repulsion, lifecycle update, and a reproduction draw.
    pub fn step<R: Rng>(&mut self, env: &mut Environment<'_>, rng: &mut R) -> StepOutcome {
        let genome = self.genome.clone();
        let diet = self.species.diet;
        match genome {
            Genome::Forager(g) => {
                let food_steer = perception::scan(self, env.food, diet, g.food_perception, true);
                self.apply_force(food_steer * g.food_attraction);

                let poison_steer =
                    perception::scan(self, env.poison, 0.0, g.poison_perception, false);
                self.apply_force(poison_steer * g.poison_attraction);
            }
            Genome::Predator(g) => {
                let damage = self.species.bite_damage;
                let steer = perception::hunt(self, env.prey, diet, g.prey_perception, damage);
                self.apply_force(steer * g.prey_attraction);
            }
        }

        self.boundaries(env.width, env.height);
        self.update();

        let offspring = self.try_reproduce(rng);
        StepOutcome {
            alive: self.alive,
            offspring,
        }
    }

    /// Fixed 1-in-`spawn_odds` draw for exactly one offspring
    fn try_reproduce<R: Rng>(&self, rng: &mut R) -> Option<Agent> {
        if rng.gen_range(0..self.species.spawn_odds) == 0 {
            Some(Agent::spawn_from(self, rng))
        } else {
            None
        }
    }

    /// Velocity direction in radians, for orientation-dependent rendering
    pub fn heading(&self) -> f64 {
        self.velocity.heading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn forager_at(position: Vec2) -> Agent {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Agent::spawn_random(Kind::Forager, SpeciesConfig::forager(), position, &mut rng)
    }

    #[test]
    fn test_integrate_clamps_speed() {
        let mut agent = forager_at(Vec2::new(100.0, 100.0));
        agent.apply_force(Vec2::new(50.0, -30.0));
        agent.integrate();
        assert!(agent.velocity.length() <= agent.species.max_speed + 1e-9);
    }

    #[test]
    fn test_integrate_resets_acceleration() {
        let mut agent = forager_at(Vec2::new(100.0, 100.0));
        agent.apply_force(Vec2::new(1.0, 1.0));
        agent.integrate();
        let position = agent.position;
        agent.integrate();
        // no accumulated force left; second step moves by velocity only
        assert_eq!(agent.position, position + agent.velocity);
    }

    #[test]
    fn test_integrate_at_rest_is_noop() {
        let mut agent = forager_at(Vec2::new(100.0, 100.0));
        agent.velocity = Vec2::ZERO;
        agent.integrate();
        assert_eq!(agent.position, Vec2::new(100.0, 100.0));
        assert_eq!(agent.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_seek_respects_force_cap() {
        let agent = forager_at(Vec2::new(0.0, 0.0));
        let steer = agent.seek(Vec2::new(500.0, -200.0));
        assert!(steer.length() <= agent.species.max_force + 1e-9);
    }

    #[test]
    fn test_seek_coincident_target_is_zero() {
        let agent = forager_at(Vec2::new(42.0, 42.0));
        assert_eq!(agent.seek(Vec2::new(42.0, 42.0)), Vec2::ZERO);
    }

    #[test]
    fn test_boundary_bounce() {
        // agent drifting off the left edge gets a positive x velocity back
        let mut agent = forager_at(Vec2::new(5.0, 300.0));
        agent.velocity = Vec2::new(-2.0, 0.0);
        agent.boundaries(800.0, 600.0);
        agent.integrate();
        assert!(agent.velocity.x > 0.0);
    }

    #[test]
    fn test_boundary_noop_in_interior() {
        let mut agent = forager_at(Vec2::new(400.0, 300.0));
        agent.velocity = Vec2::new(1.0, 1.0);
        agent.boundaries(800.0, 600.0);
        agent.integrate();
        assert_eq!(agent.velocity, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_y_boundary_overrides_x() {
        // in a corner only the y correction survives
        let mut agent = forager_at(Vec2::new(5.0, 5.0));
        agent.velocity = Vec2::new(0.0, -3.0);
        agent.boundaries(800.0, 600.0);
        agent.integrate();
        assert!(agent.velocity.y > 0.0);
        // the x correction was overwritten, so no x force was applied
        assert_eq!(agent.velocity.x, 0.0);
    }

    #[test]
    fn test_health_clamps_high() {
        let mut agent = forager_at(Vec2::new(0.0, 0.0));
        agent.calc_health(0.9);
        assert_eq!(agent.health, 1.0);
    }

    #[test]
    fn test_death_is_immediate_and_idempotent() {
        let mut agent = forager_at(Vec2::new(0.0, 0.0));
        agent.calc_health(-1.5);
        assert_eq!(agent.health, 0.0);
        assert_eq!(agent.lifespan, 0.0);
        assert!(!agent.alive);

        // further decay on a dead agent keeps health clamped at zero
        agent.calc_health(-0.1);
        assert_eq!(agent.health, 0.0);
        assert!(!agent.alive);
    }

    #[test]
    fn test_starvation_scenario() {
        let mut agent = forager_at(Vec2::new(400.0, 300.0));
        agent.health = 0.006;
        agent.update();
        assert_eq!(agent.health, 0.0);
        assert!(!agent.alive);
    }

    #[test]
    fn test_mutation_rate_decays_then_resets_to_floor() {
        let mut agent = forager_at(Vec2::new(400.0, 300.0));
        let initial = agent.mutation_rate;
        agent.update();
        assert!(agent.mutation_rate < initial);

        // once the decayed value would undershoot the cutoff, the rate snaps
        // back to the floor, even jumping up from below it
        agent.lifespan = 100.0;
        agent.mutation_rate = 0.02;
        agent.update();
        assert_eq!(agent.mutation_rate, 0.05);
    }

    #[test]
    fn test_spawn_from_gives_fresh_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut parent = forager_at(Vec2::new(120.0, 80.0));
        parent.health = 0.3;
        parent.lifespan = 1.5;
        parent.velocity = Vec2::new(4.0, -2.0);

        let child = Agent::spawn_from(&parent, &mut rng);
        assert_eq!(child.position, parent.position);
        assert_eq!(child.velocity, Vec2::new(0.0, 1.0));
        assert_eq!(child.health, 1.0);
        assert_eq!(child.lifespan, 1.0);
        assert_eq!(child.mutation_rate, parent.species.base_mutation_rate);
        assert_eq!(child.kind, Kind::Forager);
        assert!(child.alive);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_cap(fx in -1000.0f64..1000.0, fy in -1000.0f64..1000.0) {
            let mut agent = forager_at(Vec2::new(400.0, 300.0));
            agent.apply_force(Vec2::new(fx, fy));
            agent.integrate();
            prop_assert!(agent.velocity.length() <= agent.species.max_speed + 1e-9);
        }

        #[test]
        fn prop_seek_never_exceeds_force_cap(
            tx in -2000.0f64..2000.0,
            ty in -2000.0f64..2000.0,
            vx in -10.0f64..10.0,
            vy in -10.0f64..10.0,
        ) {
            let mut agent = forager_at(Vec2::new(400.0, 300.0));
            agent.velocity = Vec2::new(vx, vy);
            let steer = agent.seek(Vec2::new(tx, ty));
            prop_assert!(steer.length() <= agent.species.max_force + 1e-9);
        }

        #[test]
        fn prop_health_stays_in_bounds(deltas in proptest::collection::vec(-0.5f64..0.5, 0..50)) {
            let mut agent = forager_at(Vec2::new(0.0, 0.0));
            for delta in deltas {
                agent.calc_health(delta);
                prop_assert!((0.0..=1.0).contains(&agent.health));
            }
        }
    }
}
