use nalgebra::Vector2;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::Bounds;
use crate::config::SwarmConfig;
use crate::error::SwarmError;
use crate::population::Population;
use crate::render::Frame;

/// Why the goal moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalChange {
    Initial,
    /// Enough of the swarm got there after the goal settled.
    Reached,
    /// The swarm failed to get there in time.
    Stale,
    /// Placed explicitly by the host, e.g. from pointer input.
    Placed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub tick: u64,
    pub position: Vector2<f32>,
    pub reason: GoalChange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub goals: Vec<GoalEvent>,
    pub best_fitness: f32,
    pub fraction_reached: f32,
}

/// Drives a population towards a goal that keeps moving.
pub struct Simulation {
    config: SwarmConfig,
    bounds: Bounds,
    population: Population,
    goal: Vector2<f32>,
    goal_age: u32,
    tick: u64,
    rng: StdRng,
    history: Vec<GoalEvent>,
}

impl Simulation {
    /// Build from a config and the canvas the host provides. A random goal is
    /// placed unless one is given.
    pub fn new(
        config: SwarmConfig,
        bounds: Bounds,
        goal: Option<Vector2<f32>>,
    ) -> Result<Self, SwarmError> {
        config.validate()?;
        if let Some(goal) = &goal {
            check_goal(&bounds, goal)?;
        }
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let goal = goal.unwrap_or_else(|| bounds.random_point(&mut rng));
        let population = Population::new(
            config.population_size,
            config.coefficients(),
            &bounds,
            &goal,
            &mut rng,
        )?;
        debug!(x = goal.x, y = goal.y, "initial goal");

        Ok(Simulation {
            config,
            bounds,
            population,
            goal,
            goal_age: 0,
            tick: 0,
            rng,
            history: vec![GoalEvent {
                tick: 0,
                position: goal,
                reason: GoalChange::Initial,
            }],
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn goal(&self) -> Vector2<f32> {
        self.goal
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn goal_age(&self) -> u32 {
        self.goal_age
    }

    pub fn history(&self) -> &[GoalEvent] {
        &self.history
    }

    /// One frame: maybe move the goal, then advance the swarm.
    pub fn step(&mut self) -> Option<GoalEvent> {
        let mut event = None;
        if let Some(reason) = self.review_goal() {
            let position = self.bounds.random_point(&mut self.rng);
            event = Some(self.relocate(position, reason));
        }

        self.population
            .update(&self.goal, self.config.goal_size, &mut self.rng);
        self.tick += 1;
        self.goal_age = self.goal_age.saturating_add(1);
        event
    }

    /// Put the goal somewhere specific and wake the swarm up.
    pub fn place_goal(&mut self, position: Vector2<f32>) -> Result<GoalEvent, SwarmError> {
        check_goal(&self.bounds, &position)?;
        Ok(self.relocate(position, GoalChange::Placed))
    }

    fn review_goal(&self) -> Option<GoalChange> {
        let most = self
            .population
            .most_reached_goal(self.config.reach_threshold);
        if most && self.goal_age > self.config.settle_ticks {
            Some(GoalChange::Reached)
        } else if !most && self.goal_age >= self.config.stale_ticks {
            Some(GoalChange::Stale)
        } else {
            None
        }
    }

    fn relocate(&mut self, position: Vector2<f32>, reason: GoalChange) -> GoalEvent {
        debug!(
            tick = self.tick,
            ?reason,
            reached = self.population.fraction_reached_goal(),
            x = position.x,
            y = position.y,
            "goal relocated"
        );
        self.goal = position;
        self.goal_age = 0;
        self.population.revive();
        let event = GoalEvent {
            tick: self.tick,
            position,
            reason,
        };
        self.history.push(event);
        event
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            tick: self.tick,
            particles: self.population.particles(),
            goal: self.goal,
            goal_size: self.config.goal_size,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.tick,
            goals: self.history.clone(),
            best_fitness: self.population.best().fitness,
            fraction_reached: self.population.fraction_reached_goal(),
        }
    }
}

fn check_goal(bounds: &Bounds, goal: &Vector2<f32>) -> Result<(), SwarmError> {
    // NaN fails `contains`, infinities land outside
    if !bounds.contains(goal) {
        return Err(SwarmError::InvalidGoal {
            x: goal.x,
            y: goal.y,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Bounds {
        Bounds::from_size(200.0, 200.0).unwrap()
    }

    fn seeded(seed: u64) -> SwarmConfig {
        SwarmConfig {
            population_size: 100,
            width: 200,
            height: 200,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SwarmConfig {
            goal_size: 0.0,
            ..seeded(1)
        };
        assert!(matches!(
            Simulation::new(config, canvas(), None),
            Err(SwarmError::InvalidGoalRadius(_))
        ));
    }

    #[test]
    fn explicit_goal_must_be_finite_and_on_canvas() {
        for goal in [
            Vector2::new(f32::NAN, 5.0),
            Vector2::new(5.0, f32::INFINITY),
            Vector2::new(1e6, -1e6),
            Vector2::new(-0.5, 100.0),
        ] {
            assert!(
                matches!(
                    Simulation::new(seeded(1), canvas(), Some(goal)),
                    Err(SwarmError::InvalidGoal { .. })
                ),
                "{goal:?} should be rejected"
            );
        }
        assert!(Simulation::new(seeded(1), canvas(), Some(Vector2::new(200.0, 0.0))).is_ok());
    }

    #[test]
    fn placed_goal_is_checked_and_keeps_the_old_one_on_error() {
        let mut sim = Simulation::new(seeded(8), canvas(), None).unwrap();
        let before = sim.goal();
        assert!(matches!(
            sim.place_goal(Vector2::new(f32::NAN, f32::NAN)),
            Err(SwarmError::InvalidGoal { .. })
        ));
        assert!(sim.place_goal(Vector2::new(250.0, 10.0)).is_err());
        assert_eq!(sim.goal(), before);
        assert_eq!(sim.history().len(), 1);
    }

    #[test]
    fn goal_age_saturates() {
        let config = SwarmConfig {
            goal_size: 1e-6,
            ..seeded(9)
        };
        let mut sim = Simulation::new(config, canvas(), None).unwrap();
        sim.goal_age = u32::MAX - 1;
        sim.config.stale_ticks = u32::MAX;
        sim.config.settle_ticks = u32::MAX;
        sim.step();
        assert_eq!(sim.goal_age(), u32::MAX);
        // a stale relocation fires at the limit and resets the age
        sim.step();
        assert_eq!(sim.goal_age(), 1);
    }

    #[test]
    fn starts_with_goal_inside_canvas() {
        let sim = Simulation::new(seeded(1), canvas(), None).unwrap();
        assert!(sim.bounds().contains(&sim.goal()));
        assert_eq!(sim.history().len(), 1);
        assert_eq!(sim.history()[0].reason, GoalChange::Initial);
        assert_eq!(sim.population().len(), 100);
    }

    #[test]
    fn explicit_goal_is_used() {
        let goal = Vector2::new(50.0, 60.0);
        let sim = Simulation::new(seeded(2), canvas(), Some(goal)).unwrap();
        assert_eq!(sim.goal(), goal);
        let best = sim.population().best();
        assert!((best.fitness - (best.position - goal).norm()).abs() < 1e-4);
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = Simulation::new(seeded(3), canvas(), None).unwrap();
        let mut b = Simulation::new(seeded(3), canvas(), None).unwrap();
        for _ in 0..100 {
            a.step();
            b.step();
        }
        assert_eq!(a.goal(), b.goal());
        assert_eq!(a.population().particles(), b.population().particles());
    }

    #[test]
    fn unreachable_goal_goes_stale() {
        // Nobody can reach a goal this small, so only staleness moves it.
        let config = SwarmConfig {
            goal_size: 1e-6,
            stale_ticks: 20,
            ..seeded(4)
        };
        let mut sim = Simulation::new(config, canvas(), None).unwrap();
        let mut events = vec![];
        for _ in 0..45 {
            events.extend(sim.step());
        }
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.reason == GoalChange::Stale));
        assert_eq!(events[0].tick, 20);
        assert_eq!(events[1].tick, 40);
        assert_eq!(sim.history().len(), 3);
    }

    #[test]
    fn reached_goal_moves_after_settling() {
        // A goal covering the whole canvas is reached by everyone on the first tick.
        let config = SwarmConfig {
            goal_size: 1000.0,
            settle_ticks: 5,
            stale_ticks: 100,
            ..seeded(5)
        };
        let mut sim = Simulation::new(config, canvas(), None).unwrap();
        let mut events = vec![];
        for _ in 0..7 {
            events.extend(sim.step());
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, GoalChange::Reached);
        assert_eq!(events[0].tick, 6);
        assert_eq!(sim.goal_age(), 1);
    }

    #[test]
    fn relocation_revives_the_swarm() {
        let config = SwarmConfig {
            goal_size: 1000.0,
            ..seeded(6)
        };
        let mut sim = Simulation::new(config, canvas(), None).unwrap();
        sim.step();
        assert_eq!(sim.population().fraction_reached_goal(), 1.0);

        let event = sim.place_goal(Vector2::new(10.0, 10.0)).unwrap();
        assert_eq!(event.reason, GoalChange::Placed);
        assert_eq!(sim.goal(), Vector2::new(10.0, 10.0));
        assert_eq!(sim.goal_age(), 0);
        assert_eq!(sim.population().fraction_reached_goal(), 0.0);
    }

    #[test]
    fn frame_and_summary_reflect_state() {
        let mut sim = Simulation::new(seeded(7), canvas(), None).unwrap();
        for _ in 0..10 {
            sim.step();
        }
        let frame = sim.frame();
        assert_eq!(frame.tick, 10);
        assert_eq!(frame.particles.len(), 100);
        assert_eq!(frame.goal, sim.goal());

        let summary = sim.summary();
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.best_fitness, frame.particles[0].fitness);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"Initial\""));
    }
}
