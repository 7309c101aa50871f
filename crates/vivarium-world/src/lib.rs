//! Agent behavior and lifecycle engine.
//!
//! This crate implements the steering, perception, genome, and world-driver layers
//! of the sandbox: foragers chase food, predators chase foragers, and both kinds
//! age, reproduce with mutated traits, and die.

pub mod genome;
pub mod agent;
pub mod perception;
pub mod world;

pub use agent::{Agent, Environment, StepOutcome};
pub use genome::{ForagerGenome, Genome, PredatorGenome};
pub use world::{World, WorldSummary};
