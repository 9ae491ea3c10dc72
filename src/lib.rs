pub mod bounds;
pub mod config;
pub mod error;
pub mod particle;
pub mod population;
pub mod render;
pub mod simulation;
pub mod sort;

use serde::{Deserialize, Serialize};

/// Scaling factors shared by every particle in a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Dampening applied to the whole velocity update.
    pub k: f32,
    /// Pull towards the particle's personal best.
    pub c1: f32,
    /// Pull towards the population's global best.
    pub c2: f32,
}
