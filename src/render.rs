use std::fs;
use std::path::PathBuf;

use image::{Rgb, RgbImage};
use nalgebra::Vector2;

use crate::bounds::Bounds;
use crate::config::{Colours, SwarmConfig};
use crate::error::SwarmError;
use crate::particle::Particle;

/// What a renderer gets to draw each tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub tick: u64,
    pub particles: &'a [Particle],
    pub goal: Vector2<f32>,
    pub goal_size: f32,
}

/// Host side of the simulation: supplies the canvas and draws frames.
pub trait Renderer {
    fn bounds(&self) -> Bounds;

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), SwarmError>;
}

/// Writes every frame to `<output>/frames_XXXXXXXX.png`, numbered by tick.
pub struct PngRenderer {
    output: PathBuf,
    bounds: Bounds,
    colours: Colours,
    particle_size: u32,
    best_size: u32,
    frames: usize,
}

impl PngRenderer {
    pub fn new<P: Into<PathBuf>>(output: P, config: &SwarmConfig) -> Result<Self, SwarmError> {
        let output = output.into();
        fs::create_dir_all(&output)?;
        Ok(PngRenderer {
            output,
            bounds: config.bounds()?,
            colours: config.palette.colours()?,
            particle_size: config.particle_size,
            best_size: config.best_size,
            frames: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    pub fn draw(&self, frame: &Frame<'_>) -> RgbImage {
        let width = self.bounds.width() as u32;
        let height = self.bounds.height() as u32;
        let mut img = RgbImage::from_pixel(width, height, self.colours.background);

        let origin = self.bounds.min;
        fill_disc(&mut img, frame.goal - origin, frame.goal_size, self.colours.goal);

        let mut best = None;
        for particle in frame.particles {
            if particle.is_global_best {
                best = Some(particle);
                continue;
            }
            fill_disc(
                &mut img,
                particle.position - origin,
                self.particle_size as f32,
                self.colours.particle,
            );
        }
        // Best last so it sits on top of the crowd
        if let Some(particle) = best {
            fill_disc(
                &mut img,
                particle.position - origin,
                self.best_size as f32,
                self.colours.global_best,
            );
        }
        img
    }
}

impl Renderer for PngRenderer {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), SwarmError> {
        let img = self.draw(frame);
        img.save(self.output.join(format!("frames_{:0>8}.png", frame.tick)))?;
        self.frames += 1;
        Ok(())
    }
}

/// Keeps the loop running without producing any output.
pub struct HeadlessRenderer {
    bounds: Bounds,
    frames: usize,
}

impl HeadlessRenderer {
    pub fn new(bounds: Bounds) -> Self {
        HeadlessRenderer { bounds, frames: 0 }
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }
}

impl Renderer for HeadlessRenderer {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn present(&mut self, _frame: &Frame<'_>) -> Result<(), SwarmError> {
        self.frames += 1;
        Ok(())
    }
}

/// Filled circle of the given diameter, clipped to the image.
fn fill_disc(img: &mut RgbImage, centre: Vector2<f32>, diameter: f32, colour: Rgb<u8>) {
    let radius = diameter / 2.0;
    let radius_squared = radius * radius;
    let (width, height) = img.dimensions();

    let min_x = (centre.x - radius).floor().max(0.0) as u32;
    let min_y = (centre.y - radius).floor().max(0.0) as u32;
    let max_x = (centre.x + radius).ceil().min(width as f32 - 1.0);
    let max_y = (centre.y + radius).ceil().min(height as f32 - 1.0);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }

    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let dx = x as f32 + 0.5 - centre.x;
            let dy = y as f32 + 0.5 - centre.y;
            if dx * dx + dy * dy <= radius_squared {
                img.put_pixel(x, y, colour);
            }
        }
    }
}
