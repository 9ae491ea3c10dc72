use nalgebra::Vector2;
use rand::prelude::*;

use crate::Coefficients;
use crate::bounds::{Bounds, limit};

/// Speed cap applied right after a particle is spawned.
pub const INITIAL_SPEED_LIMIT: f32 = 1.0;
/// Speed cap applied after every velocity update.
pub const MAX_SPEED: f32 = 5.0;

/// One candidate solution: a point searching for the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub personal_best_position: Vector2<f32>,
    pub personal_best_fitness: f32,
    /// Distance to the goal, lower is better.
    pub fitness: f32,
    pub is_global_best: bool,
    /// Latched once the particle gets inside the goal; it stops moving until revived.
    pub reached_goal: bool,
}

impl Particle {
    /// Particle at a fixed position and velocity, scored against `goal`.
    pub fn new(position: Vector2<f32>, velocity: Vector2<f32>, goal: &Vector2<f32>) -> Self {
        let mut particle = Particle {
            position,
            velocity,
            personal_best_position: position,
            personal_best_fitness: 0.0,
            fitness: 0.0,
            is_global_best: false,
            reached_goal: false,
        };
        particle.compute_fitness(goal);
        particle.personal_best_fitness = particle.fitness;
        particle
    }

    /// Spawn somewhere inside `bounds` with a small random heading.
    pub fn initialize<R: Rng + ?Sized>(
        bounds: &Bounds,
        goal: &Vector2<f32>,
        rng: &mut R,
    ) -> Self {
        let position = bounds.random_point(rng);
        let xv = rng.random_range(0.0..=0.5 * bounds.width());
        let yv = rng.random_range(0.0..=0.5 * bounds.height());
        let velocity = limit(Vector2::new(xv, yv), INITIAL_SPEED_LIMIT);
        Particle::new(position, velocity, goal)
    }

    pub fn compute_fitness(&mut self, goal: &Vector2<f32>) {
        self.fitness = (self.position - goal).norm();
    }

    /// PSO velocity rule with the dampening `k` applied to the whole sum.
    pub fn update_velocity<R: Rng + ?Sized>(
        &mut self,
        global_best: &Vector2<f32>,
        coefficients: &Coefficients,
        rng: &mut R,
    ) {
        let Coefficients { k, c1, c2 } = *coefficients;
        let rx1: f32 = rng.random();
        let rx2: f32 = rng.random();
        let ry1: f32 = rng.random();
        let ry2: f32 = rng.random();

        let pull_personal = self.personal_best_position - self.position;
        let pull_global = global_best - self.position;

        let next_xv = k * (self.velocity.x + c1 * rx1 * pull_personal.x + c2 * rx2 * pull_global.x);
        let next_yv = k * (self.velocity.y + c1 * ry1 * pull_personal.y + c2 * ry2 * pull_global.y);

        self.velocity = limit(Vector2::new(next_xv, next_yv), MAX_SPEED);
    }

    /// Frozen particles stay put.
    pub fn move_towards<R: Rng + ?Sized>(
        &mut self,
        global_best: &Vector2<f32>,
        coefficients: &Coefficients,
        rng: &mut R,
    ) {
        if self.reached_goal {
            return;
        }
        self.update_velocity(global_best, coefficients, rng);
        self.position += self.velocity;
    }

    /// Move one tick, then rescore against the goal and update the personal best
    /// and the reached latch.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        global_best: &Vector2<f32>,
        goal: &Vector2<f32>,
        coefficients: &Coefficients,
        goal_radius: f32,
        rng: &mut R,
    ) {
        self.move_towards(global_best, coefficients, rng);
        self.compute_fitness(goal);

        if self.fitness < self.personal_best_fitness {
            self.personal_best_position = self.position;
            self.personal_best_fitness = self.fitness;
        }

        if self.fitness < goal_radius / 2.0 {
            self.reached_goal = true;
        }
    }
}
