use nalgebra::Vector2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SwarmError;

/// Axis-aligned rectangle particles and goals are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
}

impl Bounds {
    pub fn new(min: Vector2<f32>, max: Vector2<f32>) -> Result<Self, SwarmError> {
        let width = max.x - min.x;
        let height = max.y - min.y;
        let finite = min.iter().chain(max.iter()).all(|v| v.is_finite());
        if !finite || width <= 0.0 || height <= 0.0 {
            return Err(SwarmError::DegenerateBounds { width, height });
        }
        Ok(Bounds { min, max })
    }

    /// Rectangle anchored at the origin, the usual canvas shape.
    pub fn from_size(width: f32, height: f32) -> Result<Self, SwarmError> {
        Bounds::new(Vector2::zeros(), Vector2::new(width, height))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: &Vector2<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    /// Uniform point inside the rectangle. Draws x then y.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2<f32> {
        let rx: f32 = rng.random();
        let ry: f32 = rng.random();
        Vector2::new(
            self.min.x + rx * self.width(),
            self.min.y + ry * self.height(),
        )
    }
}

/// Scale `v` down to `max` if it is longer, otherwise return it unchanged.
pub fn limit(v: Vector2<f32>, max: f32) -> Vector2<f32> {
    let speed = v.norm();
    // A zero vector never exceeds max, so there is no division by 0
    if speed > max { v * (max / speed) } else { v }
}
