//! Random arrival generation.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ropesim_coordinator::Direction;

/// Generates actor arrivals: exponentially-distributed inter-arrival delays
/// and uniform random directions.
pub struct ArrivalGenerator {
    rng: StdRng,
    mean: Duration,
}

impl ArrivalGenerator {
    /// Create a generator with the given mean inter-arrival delay.
    /// Passing a seed makes the run reproducible.
    pub fn new(mean: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng, mean }
    }

    /// Draw the delay until the next arrival.
    ///
    /// Inverse-CDF sample of an exponential distribution with the
    /// configured mean: `-mean * ln(1 - u)` for uniform `u` in `[0, 1)`.
    pub fn next_delay(&mut self) -> Duration {
        let u: f64 = self.rng.gen();
        Duration::from_secs_f64(-self.mean.as_secs_f64() * (1.0 - u).ln())
    }

    /// Draw a uniformly random travel direction.
    pub fn next_direction(&mut self) -> Direction {
        self.rng.gen()
    }
}
