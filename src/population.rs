use nalgebra::Vector2;
use rand::prelude::*;
use tracing::{debug, trace};

use crate::Coefficients;
use crate::bounds::Bounds;
use crate::error::SwarmError;
use crate::particle::Particle;
use crate::sort::quicksort_by_key;

/// Fixed-size swarm. `particles[0]` is always the global best after construction
/// and after every `update`.
#[derive(Debug, Clone)]
pub struct Population {
    particles: Vec<Particle>,
    coefficients: Coefficients,
}

impl Population {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        coefficients: Coefficients,
        bounds: &Bounds,
        goal: &Vector2<f32>,
        rng: &mut R,
    ) -> Result<Self, SwarmError> {
        if size == 0 {
            return Err(SwarmError::EmptyPopulation);
        }
        let particles: Vec<Particle> = (0..size)
            .map(|_| Particle::initialize(bounds, goal, rng))
            .collect();
        let population = Population::from_particles(particles, coefficients)?;
        debug!(
            size,
            best_fitness = population.best().fitness,
            "population spawned"
        );
        Ok(population)
    }

    /// Wrap already-built particles, ranking them by fitness.
    pub fn from_particles(
        mut particles: Vec<Particle>,
        coefficients: Coefficients,
    ) -> Result<Self, SwarmError> {
        if particles.is_empty() {
            return Err(SwarmError::EmptyPopulation);
        }
        for particle in particles.iter_mut() {
            particle.is_global_best = false;
        }
        let mut population = Population {
            particles,
            coefficients,
        };
        population.rank();
        Ok(population)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn best(&self) -> &Particle {
        &self.particles[0]
    }

    /// Advance every particle one tick, then re-rank.
    ///
    /// All particles chase the global best as it stood before this tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        goal: &Vector2<f32>,
        goal_radius: f32,
        rng: &mut R,
    ) {
        let global_best = self.particles[0].position;
        for particle in self.particles.iter_mut() {
            particle.update(&global_best, goal, &self.coefficients, goal_radius, rng);
        }

        self.particles[0].is_global_best = false;
        self.rank();
        trace!(
            best_fitness = self.best().fitness,
            reached = self.fraction_reached_goal(),
            "population updated"
        );
    }

    fn rank(&mut self) {
        quicksort_by_key(&mut self.particles, |p| p.fitness);
        self.particles[0].is_global_best = true;
    }

    pub fn fraction_reached_goal(&self) -> f32 {
        let reached = self.particles.iter().filter(|p| p.reached_goal).count();
        reached as f32 / self.particles.len() as f32
    }

    /// Strictly more than `threshold` of the swarm is sitting on the goal.
    pub fn most_reached_goal(&self, threshold: f32) -> bool {
        self.fraction_reached_goal() > threshold
    }

    /// Unfreeze every particle where it stands.
    pub fn revive(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.reached_goal = false;
        }
    }
}
