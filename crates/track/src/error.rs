use thiserror::Error;

/// Setup failures of the track environment.
///
/// Everything is checked when the environment is built or reconfigured; the
/// per-step loop itself cannot fail.
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("{obstacles} obstacles do not fit in {slots} slots")]
    TooManyObstacles { obstacles: usize, slots: usize },
    #[error("slot table sides differ: {right} right slots, {left} left slots")]
    MismatchedSlotTable { right: usize, left: usize },
    #[error("invalid speed window: min speed {min} exceeds max speed {max}")]
    InvalidSpeedWindow { min: f32, max: f32 },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}
