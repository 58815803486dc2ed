//! Core crossing coordinator implementation.
//!
//! The rope carries any number of actors traveling the same direction at
//! once, but never both directions simultaneously. Admission is arbitrated
//! by a signed occupancy count protected by a mutex; blocked actors park on
//! a [`Notify`] that the last occupant signals when the rope frees.

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::{Direction, RopeMetrics};

/// Shared rope state.
///
/// Owned exclusively by the coordinator and mutated only behind its mutex.
/// The transition methods are pure so the admission rules can be tested
/// without a runtime.
#[derive(Debug)]
struct RopeState {
    /// Signed occupancy count: positive = eastbound occupants, negative =
    /// westbound (magnitude), zero = rope free.
    crossers: i64,
    /// Possession token. `Some(d)` exactly while `crossers` carries `d`'s
    /// sign; set by the first occupant of a direction, cleared by the last.
    owner: Option<Direction>,
}

impl RopeState {
    fn new() -> Self {
        Self {
            crossers: 0,
            owner: None,
        }
    }

    /// Try to admit one actor. Succeeds iff the rope is free or already
    /// occupied by `direction`; returns the occupancy magnitude including
    /// the admitted actor.
    fn try_enter(&mut self, direction: Direction) -> Option<u64> {
        match direction {
            Direction::East if self.crossers >= 0 => {
                self.crossers += 1;
                if self.crossers == 1 {
                    self.owner = Some(Direction::East);
                }
                Some(self.crossers as u64)
            }
            Direction::West if self.crossers <= 0 => {
                self.crossers -= 1;
                if self.crossers == -1 {
                    self.owner = Some(Direction::West);
                }
                Some(self.crossers.unsigned_abs())
            }
            _ => None,
        }
    }

    /// Record one actor leaving; returns the remaining occupancy magnitude.
    /// Zero means the caller was the last occupant and possession is free.
    fn leave(&mut self, direction: Direction) -> u64 {
        debug_assert_eq!(self.owner, Some(direction), "exit without matching enter");
        match direction {
            Direction::East => {
                debug_assert!(self.crossers > 0);
                self.crossers -= 1;
            }
            Direction::West => {
                debug_assert!(self.crossers < 0);
                self.crossers += 1;
            }
        }
        if self.crossers == 0 {
            self.owner = None;
        }
        self.crossers.unsigned_abs()
    }
}

/// Coordinates crossings over the single-lane rope.
///
/// `enter` blocks until the calling actor's direction may occupy the rope
/// and returns a [`CrossingPermit`]; dropping the permit records the exit.
/// The protocol has no failure path: calls only block or proceed.
#[derive(Debug)]
pub struct RopeCoordinator {
    /// Occupancy state, the only protocol-relevant shared data.
    state: Mutex<RopeState>,
    /// Signaled by the last occupant when the rope fully frees.
    freed: Notify,
    /// Observational counters.
    metrics: RopeMetrics,
}

impl RopeCoordinator {
    /// Create a coordinator with a free rope.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RopeState::new()),
            freed: Notify::new(),
            metrics: RopeMetrics::new(),
        }
    }

    /// Block until an actor of `direction` may occupy the rope.
    ///
    /// An actor whose own direction already holds the rope is admitted
    /// immediately; an actor facing opposite traffic parks until the last
    /// opposing occupant exits. Waiters released together are not ordered
    /// among themselves, and a continuous same-direction stream keeps the
    /// rope occupied, so the opposite direction has no fairness bound.
    pub async fn enter(&self, direction: Direction) -> CrossingPermit<'_> {
        let notified = self.freed.notified();
        tokio::pin!(notified);
        loop {
            // Register for the next wakeup before checking, so a release
            // between the check and the await cannot be lost.
            notified.as_mut().enable();
            {
                let mut state = self.state.lock();
                if let Some(occupancy) = state.try_enter(direction) {
                    self.metrics.entered(direction, occupancy);
                    debug!(%direction, occupancy, "entered the rope");
                    return CrossingPermit {
                        rope: self,
                        direction,
                        occupancy,
                    };
                }
            }
            notified.as_mut().await;
            notified.set(self.freed.notified());
        }
    }

    /// Record that one actor of `direction` has left the rope.
    ///
    /// Called automatically when a [`CrossingPermit`] drops; must pair with
    /// a prior `enter` of the same direction. The last occupant releases
    /// possession and wakes every parked waiter.
    pub fn exit(&self, direction: Direction) {
        let remaining = self.state.lock().leave(direction);
        debug!(%direction, remaining, "left the rope");
        if remaining == 0 {
            self.metrics.released();
            self.freed.notify_waiters();
        }
    }

    /// Current signed occupancy count: positive = eastbound occupants,
    /// negative = westbound (magnitude), zero = rope free.
    pub fn crossers(&self) -> i64 {
        self.state.lock().crossers
    }

    /// Direction currently holding rope possession, if any.
    pub fn owner(&self) -> Option<Direction> {
        self.state.lock().owner
    }

    /// Coordinator metrics.
    pub fn metrics(&self) -> &RopeMetrics {
        &self.metrics
    }
}

impl Default for RopeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that the holder may occupy the rope, returned by
/// [`RopeCoordinator::enter`].
///
/// The crossing itself happens while the permit is held, outside any lock;
/// dropping the permit performs the exit.
#[derive(Debug)]
pub struct CrossingPermit<'a> {
    rope: &'a RopeCoordinator,
    direction: Direction,
    occupancy: u64,
}

impl CrossingPermit<'_> {
    /// Direction this permit admits.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Same-direction occupancy observed at admission, including the holder.
    pub fn occupants(&self) -> u64 {
        self.occupancy
    }
}

impl Drop for CrossingPermit<'_> {
    fn drop(&mut self) {
        self.rope.exit(self.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_single_crosser() {
        let rope = RopeCoordinator::new();

        let permit = rope.enter(Direction::East).await;
        assert_eq!(permit.occupants(), 1);
        assert_eq!(rope.crossers(), 1);
        assert_eq!(rope.owner(), Some(Direction::East));

        drop(permit);
        assert_eq!(rope.crossers(), 0);
        assert_eq!(rope.owner(), None);
    }

    #[tokio::test]
    async fn test_same_direction_crosses_concurrently() {
        let rope = RopeCoordinator::new();

        let first = rope.enter(Direction::East).await;
        // A second eastbound actor must be admitted without waiting for the
        // first to finish.
        let second = timeout(Duration::from_millis(100), rope.enter(Direction::East))
            .await
            .expect("same-direction entry must not block");

        assert_eq!(first.occupants(), 1);
        assert_eq!(second.occupants(), 2);
        assert_eq!(rope.crossers(), 2);

        drop(first);
        assert_eq!(rope.crossers(), 1);
        drop(second);
        assert_eq!(rope.crossers(), 0);
    }

    #[tokio::test]
    async fn test_opposite_direction_blocks_until_exit() {
        let rope = Arc::new(RopeCoordinator::new());

        let east = rope.enter(Direction::East).await;
        assert_eq!(rope.crossers(), 1);

        let rope2 = rope.clone();
        let mut west = tokio::spawn(async move {
            let permit = rope2.enter(Direction::West).await;
            let observed = rope2.crossers();
            drop(permit);
            observed
        });

        // The westbound entry must stay pending while eastbound occupies
        // the rope.
        assert!(
            timeout(Duration::from_millis(100), &mut west).await.is_err(),
            "westbound entered while eastbound held the rope"
        );
        assert_eq!(rope.crossers(), 1);

        drop(east);
        let observed = timeout(Duration::from_secs(5), west)
            .await
            .expect("westbound waiter starved after rope freed")
            .unwrap();

        // Count went 1 -> 0 -> -1: the waiter saw sole westbound occupancy.
        assert_eq!(observed, -1);
        assert_eq!(rope.crossers(), 0);
        assert_eq!(rope.owner(), None);
    }

    #[tokio::test]
    async fn test_multiple_waiters_released_together() {
        let rope = Arc::new(RopeCoordinator::new());

        let east = rope.enter(Direction::East).await;

        let mut waiters = Vec::new();
        for _ in 0..4 {
            let rope = rope.clone();
            waiters.push(tokio::spawn(async move {
                let permit = rope.enter(Direction::West).await;
                // Hold long enough that the released platoon overlaps.
                tokio::time::sleep(Duration::from_millis(100)).await;
                drop(permit);
            }));
        }

        // Give the waiters time to park, then free the rope.
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(east);

        for waiter in waiters {
            timeout(Duration::from_secs(5), waiter)
                .await
                .expect("westbound waiter never admitted")
                .unwrap();
        }

        assert_eq!(rope.crossers(), 0);
        let snapshot = rope.metrics().snapshot();
        assert_eq!(snapshot.crossings_west, 4);
        // Woken together and holding for 100ms each, the westbound platoon
        // overlaps on the rope.
        assert!(snapshot.peak_west >= 2);
    }

    #[tokio::test]
    async fn test_possession_handover() {
        let rope = RopeCoordinator::new();

        let east = rope.enter(Direction::East).await;
        assert_eq!(rope.owner(), Some(Direction::East));
        drop(east);
        assert_eq!(rope.owner(), None);

        let west = rope.enter(Direction::West).await;
        assert_eq!(rope.owner(), Some(Direction::West));
        assert_eq!(rope.crossers(), -1);
        drop(west);

        assert_eq!(rope.metrics().snapshot().releases, 2);
    }

    #[tokio::test]
    async fn test_randomized_actors_all_complete() {
        let rope = Arc::new(RopeCoordinator::new());
        let mut rng = StdRng::seed_from_u64(42);

        let mut actors = Vec::new();
        for _ in 0..30 {
            let direction: Direction = rng.gen();
            let rope = rope.clone();
            actors.push(tokio::spawn(async move {
                let permit = rope.enter(direction).await;
                // Mutual exclusion: while this permit is held the signed
                // count must carry our direction's sign.
                let crossers = rope.crossers();
                match direction {
                    Direction::East => assert!(crossers > 0),
                    Direction::West => assert!(crossers < 0),
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
                drop(permit);
            }));
        }

        for actor in actors {
            timeout(Duration::from_secs(30), actor)
                .await
                .expect("actor never finished crossing")
                .unwrap();
        }

        assert_eq!(rope.crossers(), 0);
        assert_eq!(rope.owner(), None);
        assert_eq!(rope.metrics().snapshot().crossings_total(), 30);
    }

    mod state_properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Under arbitrary admit/leave sequences the count always equals
            /// eastbound-active minus westbound-active, possession always
            /// matches the count's sign, and admission is refused exactly
            /// when the opposite direction occupies the rope.
            #[test]
            fn state_invariants(ops in prop::collection::vec(any::<(bool, bool)>(), 1..200)) {
                let mut state = RopeState::new();
                let mut east_active: i64 = 0;
                let mut west_active: i64 = 0;

                for (is_enter, is_east) in ops {
                    let direction = if is_east { Direction::East } else { Direction::West };

                    if is_enter {
                        let blocked_by = match direction {
                            Direction::East => west_active,
                            Direction::West => east_active,
                        };
                        match state.try_enter(direction) {
                            Some(occupancy) => {
                                prop_assert_eq!(blocked_by, 0);
                                match direction {
                                    Direction::East => east_active += 1,
                                    Direction::West => west_active += 1,
                                }
                                let expected = match direction {
                                    Direction::East => east_active,
                                    Direction::West => west_active,
                                };
                                prop_assert_eq!(occupancy as i64, expected);
                            }
                            None => prop_assert!(blocked_by > 0),
                        }
                    } else {
                        // Exit one active actor of the requested direction,
                        // if any.
                        let active = match direction {
                            Direction::East => &mut east_active,
                            Direction::West => &mut west_active,
                        };
                        if *active > 0 {
                            let remaining = state.leave(direction);
                            *active -= 1;
                            prop_assert_eq!(remaining as i64, *active);
                        }
                    }

                    // Conservation and sign exclusivity.
                    prop_assert!(east_active == 0 || west_active == 0);
                    prop_assert_eq!(state.crossers, east_active - west_active);
                    let expected_owner = if east_active > 0 {
                        Some(Direction::East)
                    } else if west_active > 0 {
                        Some(Direction::West)
                    } else {
                        None
                    };
                    prop_assert_eq!(state.owner, expected_owner);
                }
            }
        }
    }
}
