//! Simulation metrics.

use std::collections::VecDeque;

use ropesim_coordinator::Direction;

/// Simulation metrics.
#[derive(Debug, Clone)]
pub struct SimulationMetrics {
    /// Total completed crossings.
    pub total_crossings: u64,
    /// Completed eastbound crossings.
    pub eastbound_crossings: u64,
    /// Completed westbound crossings.
    pub westbound_crossings: u64,
    /// Wait-latency samples (ms), time spent blocked in `enter`.
    wait_samples: VecDeque<u64>,
    /// Maximum samples to keep.
    max_samples: usize,
}

impl SimulationMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self {
            total_crossings: 0,
            eastbound_crossings: 0,
            westbound_crossings: 0,
            wait_samples: VecDeque::with_capacity(10000),
            max_samples: 10000,
        }
    }

    /// Record a completed crossing and how long the actor waited to enter.
    pub fn record_crossing(&mut self, direction: Direction, wait_ms: u64) {
        self.total_crossings += 1;
        match direction {
            Direction::East => self.eastbound_crossings += 1,
            Direction::West => self.westbound_crossings += 1,
        }

        if self.wait_samples.len() >= self.max_samples {
            self.wait_samples.pop_front();
        }
        self.wait_samples.push_back(wait_ms);
    }

    /// Get average wait in ms.
    pub fn average_wait_ms(&self) -> u64 {
        if self.wait_samples.is_empty() {
            return 0;
        }

        let sum: u64 = self.wait_samples.iter().sum();
        sum / self.wait_samples.len() as u64
    }

    /// Get the worst wait seen, in ms.
    pub fn max_wait_ms(&self) -> u64 {
        self.wait_samples.iter().copied().max().unwrap_or(0)
    }

    /// Get p99 wait.
    #[allow(dead_code)]
    pub fn p99_wait_ms(&self) -> u64 {
        self.percentile_wait(99)
    }

    /// Get percentile wait.
    #[allow(dead_code)]
    fn percentile_wait(&self, percentile: usize) -> u64 {
        if self.wait_samples.is_empty() {
            return 0;
        }

        let mut sorted: Vec<_> = self.wait_samples.iter().copied().collect();
        sorted.sort_unstable();

        let idx = (sorted.len() * percentile / 100).min(sorted.len() - 1);
        sorted[idx]
    }
}

impl Default for SimulationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
