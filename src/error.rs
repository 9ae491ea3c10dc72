use thiserror::Error;

/// Errors raised while setting up or rendering a swarm.
#[derive(Debug, Error)]
pub enum SwarmError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("population must contain at least one particle")]
    EmptyPopulation,
    #[error("bounds {width}x{height} do not enclose any area")]
    DegenerateBounds { width: f32, height: f32 },
    #[error("goal ({x}, {y}) is not a finite point inside the canvas")]
    InvalidGoal { x: f32, y: f32 },
    #[error("goal radius {0} must be positive")]
    InvalidGoalRadius(f32),
    #[error("could not parse colour {0:?}")]
    InvalidColour(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
