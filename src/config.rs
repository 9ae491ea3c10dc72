use std::fs;
use std::path::Path;

use colors_transform::{Color, Rgb as Colour};
use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::Coefficients;
use crate::bounds::Bounds;
use crate::error::SwarmError;

/// Hex colours used to draw a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: String,
    pub particle: String,
    pub global_best: String,
    pub goal: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            background: "#ffffff".to_string(),
            particle: "#000000".to_string(),
            global_best: "#00ff00".to_string(),
            goal: "#ff0000".to_string(),
        }
    }
}

/// Palette converted to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colours {
    pub background: Rgb<u8>,
    pub particle: Rgb<u8>,
    pub global_best: Rgb<u8>,
    pub goal: Rgb<u8>,
}

impl Palette {
    pub fn colours(&self) -> Result<Colours, SwarmError> {
        Ok(Colours {
            background: parse_colour(&self.background)?,
            particle: parse_colour(&self.particle)?,
            global_best: parse_colour(&self.global_best)?,
            goal: parse_colour(&self.goal)?,
        })
    }
}

fn parse_colour(hex: &str) -> Result<Rgb<u8>, SwarmError> {
    let colour =
        Colour::from_hex_str(hex).map_err(|_| SwarmError::InvalidColour(hex.to_string()))?;
    Ok(Rgb([
        colour.get_red().round() as u8,
        colour.get_green().round() as u8,
        colour.get_blue().round() as u8,
    ]))
}

/// Everything needed to run a swarm, normally loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub population_size: usize,
    /// Velocity dampening.
    pub k: f32,
    /// Personal best attraction.
    pub c1: f32,
    /// Global best attraction.
    pub c2: f32,
    /// Diameter of the goal; particles within half of it have reached it.
    pub goal_size: f32,
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    /// Fraction of the swarm that must reach the goal before it moves on.
    pub reach_threshold: f32,
    /// Goal age after which a mostly reached goal is relocated.
    pub settle_ticks: u32,
    /// Goal age at which a goal nobody is reaching is relocated.
    pub stale_ticks: u32,
    pub particle_size: u32,
    pub best_size: u32,
    pub palette: Palette,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        SwarmConfig {
            population_size: 1000,
            k: 1.5,
            c1: 0.9,
            c2: 0.001256,
            goal_size: 15.0,
            width: 800,
            height: 800,
            seed: None,
            reach_threshold: 0.25,
            settle_ticks: 350,
            stale_ticks: 500,
            particle_size: 4,
            best_size: 18,
            palette: Palette::default(),
        }
    }
}

impl SwarmConfig {
    /// Read a JSON config; fields that are left out keep their defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SwarmError> {
        let text = fs::read_to_string(path)?;
        let config: SwarmConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            k: self.k,
            c1: self.c1,
            c2: self.c2,
        }
    }

    pub fn bounds(&self) -> Result<Bounds, SwarmError> {
        Bounds::from_size(self.width as f32, self.height as f32)
    }

    pub fn validate(&self) -> Result<(), SwarmError> {
        if self.population_size == 0 {
            return Err(SwarmError::EmptyPopulation);
        }
        if self.width == 0 || self.height == 0 {
            return Err(SwarmError::DegenerateBounds {
                width: self.width as f32,
                height: self.height as f32,
            });
        }
        if !self.goal_size.is_finite() || self.goal_size <= 0.0 {
            return Err(SwarmError::InvalidGoalRadius(self.goal_size));
        }
        for (name, value) in [("k", self.k), ("c1", self.c1), ("c2", self.c2)] {
            if !value.is_finite() {
                return Err(SwarmError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.reach_threshold) {
            return Err(SwarmError::InvalidConfig(format!(
                "reach_threshold must be within [0, 1], got {}",
                self.reach_threshold
            )));
        }
        if self.settle_ticks == 0 || self.stale_ticks == 0 {
            return Err(SwarmError::InvalidConfig(
                "settle_ticks and stale_ticks must be positive".to_string(),
            ));
        }
        if self.settle_ticks > self.stale_ticks {
            return Err(SwarmError::InvalidConfig(format!(
                "settle_ticks ({}) must not exceed stale_ticks ({})",
                self.settle_ticks, self.stale_ticks
            )));
        }
        if self.particle_size == 0 || self.best_size == 0 {
            return Err(SwarmError::InvalidConfig(
                "particle display sizes must be positive".to_string(),
            ));
        }
        self.palette.colours()?;
        Ok(())
    }
}
