//! Simulation controller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use ropesim_coordinator::{Direction, RopeCoordinator, RopeMetricsSnapshot};

use crate::arrivals::ArrivalGenerator;
use crate::config::SimulationConfig;
use crate::metrics::SimulationMetrics;
use crate::scenario::Scenario;

/// Controls the simulation: spawns one crosser task per actor and waits for
/// all of them to finish before returning.
pub struct SimulationController {
    /// Configuration.
    config: SimulationConfig,
    /// The shared rope.
    rope: Arc<RopeCoordinator>,
    /// Simulation metrics.
    metrics: Arc<Mutex<SimulationMetrics>>,
}

impl SimulationController {
    /// Create a new simulation controller.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            rope: Arc::new(RopeCoordinator::new()),
            metrics: Arc::new(Mutex::new(SimulationMetrics::new())),
        }
    }

    /// The shared rope coordinator.
    #[allow(dead_code)]
    pub fn rope(&self) -> Arc<RopeCoordinator> {
        self.rope.clone()
    }

    /// Snapshot of the coordinator's counters.
    pub fn rope_metrics(&self) -> RopeMetricsSnapshot {
        self.rope.metrics().snapshot()
    }

    /// Get simulation metrics.
    pub fn metrics(&self) -> SimulationMetrics {
        self.metrics.lock().clone()
    }

    /// Run the configured number of randomly-directed actors arriving at
    /// exponentially-distributed intervals.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!(actors = self.config.actors, "Running random simulation");

        let mut arrivals = ArrivalGenerator::new(self.config.mean_arrival, self.config.seed);
        let mut crossers = Vec::with_capacity(self.config.actors);

        for actor in 0..self.config.actors {
            tokio::time::sleep(self.config.scaled(arrivals.next_delay())).await;
            let direction = arrivals.next_direction();
            crossers.push(self.spawn_crosser(actor, direction));
        }

        self.join_crossers(crossers).await
    }

    /// Run a scripted scenario.
    pub async fn run_scenario(&self, scenario: Scenario) -> anyhow::Result<()> {
        info!(
            name = %scenario.name,
            description = %scenario.description,
            "Running scenario"
        );

        let mut arrivals = ArrivalGenerator::new(self.config.mean_arrival, self.config.seed);
        let mut crossers = Vec::with_capacity(scenario.arrivals.len());

        for (actor, scripted) in scenario.arrivals.iter().enumerate() {
            let delay = Duration::from_millis(scripted.delay_ms);
            tokio::time::sleep(self.config.scaled(delay)).await;

            let direction = scripted
                .direction
                .unwrap_or_else(|| arrivals.next_direction());
            crossers.push(self.spawn_crosser(actor, direction));
        }

        self.join_crossers(crossers).await
    }

    /// Spawn one crosser task: wait for the rope, cross, exit.
    fn spawn_crosser(&self, actor: usize, direction: Direction) -> JoinHandle<()> {
        let rope = self.rope.clone();
        let metrics = self.metrics.clone();
        let crossing_time = self.config.scaled(self.config.crossing_time);

        tokio::spawn(async move {
            let arrived = Instant::now();
            let permit = rope.enter(direction).await;
            let waited = arrived.elapsed();

            info!(
                actor,
                %direction,
                occupants = permit.occupants(),
                "crossing the rope"
            );
            tokio::time::sleep(crossing_time).await;
            drop(permit);

            metrics
                .lock()
                .record_crossing(direction, waited.as_millis() as u64);
        })
    }

    /// Wait for every spawned crosser to finish.
    async fn join_crossers(&self, crossers: Vec<JoinHandle<()>>) -> anyhow::Result<()> {
        for result in join_all(crossers).await {
            result?;
        }

        info!(
            crossings = self.metrics.lock().total_crossings,
            "All actors finished"
        );
        Ok(())
    }
}
