//! Metrics collection for coordinator monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Direction;

/// Coordinator metrics.
///
/// All counters are relaxed atomics; they are observational only and never
/// participate in the crossing protocol itself.
#[derive(Debug, Default)]
pub struct RopeMetrics {
    /// Total eastbound crossings admitted.
    pub crossings_east: AtomicU64,
    /// Total westbound crossings admitted.
    pub crossings_west: AtomicU64,
    /// Peak concurrent eastbound occupancy.
    pub peak_east: AtomicU64,
    /// Peak concurrent westbound occupancy.
    pub peak_west: AtomicU64,
    /// Times the rope was fully released (possession handed back).
    pub releases: AtomicU64,
}

impl RopeMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an admission with the occupancy observed at entry.
    pub fn entered(&self, direction: Direction, occupancy: u64) {
        let (crossings, peak) = match direction {
            Direction::East => (&self.crossings_east, &self.peak_east),
            Direction::West => (&self.crossings_west, &self.peak_west),
        };
        crossings.fetch_add(1, Ordering::Relaxed);
        peak.fetch_max(occupancy, Ordering::Relaxed);
    }

    /// Record a full release of the rope by the last occupant.
    pub fn released(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> RopeMetricsSnapshot {
        RopeMetricsSnapshot {
            crossings_east: self.crossings_east.load(Ordering::Relaxed),
            crossings_west: self.crossings_west.load(Ordering::Relaxed),
            peak_east: self.peak_east.load(Ordering::Relaxed),
            peak_west: self.peak_west.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of coordinator metrics at a point in time.
#[derive(Debug, Clone, Copy)]
pub struct RopeMetricsSnapshot {
    pub crossings_east: u64,
    pub crossings_west: u64,
    pub peak_east: u64,
    pub peak_west: u64,
    pub releases: u64,
}

impl RopeMetricsSnapshot {
    /// Total crossings in both directions.
    pub fn crossings_total(&self) -> u64 {
        self.crossings_east + self.crossings_west
    }

    /// Largest concurrent occupancy seen in either direction.
    pub fn peak_occupancy(&self) -> u64 {
        self.peak_east.max(self.peak_west)
    }
}
