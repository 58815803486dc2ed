//! Ropesim Crossing Coordinator
//!
//! This crate contains the synchronization core of the rope crossing
//! simulation: the coordinator that lets any number of actors travel the
//! rope in one direction concurrently while guaranteeing mutual exclusion
//! between the two directions.

pub mod direction;
pub mod metrics;
pub mod rope;

pub use direction::*;
pub use metrics::*;
pub use rope::*;
