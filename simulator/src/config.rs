//! Simulation configuration.

use std::time::Duration;

use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No actors to simulate.
    #[error("actor count cannot be 0")]
    NoActors,

    /// Speed multiplier must be a positive finite number.
    #[error("speed multiplier must be positive and finite, got {0}")]
    InvalidSpeed(f64),
}

/// Main simulation configuration.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of actors to spawn in random mode.
    pub actors: usize,
    /// Mean inter-arrival delay between actors.
    pub mean_arrival: Duration,
    /// Time one actor spends on the rope.
    pub crossing_time: Duration,
    /// Speed multiplier; divides every delay in the run.
    pub speed: f64,
    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            actors: 30,
            mean_arrival: Duration::from_secs(2),
            crossing_time: Duration::from_secs(1),
            speed: 1.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actors == 0 {
            return Err(ConfigError::NoActors);
        }

        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.speed));
        }

        Ok(())
    }

    /// Scale a wall-clock duration by the speed multiplier.
    pub fn scaled(&self, base: Duration) -> Duration {
        Duration::from_secs_f64(base.as_secs_f64() / self.speed)
    }
}
