//! Synthetic candle generation for subjects with no reachable provider.
//!
//! - [`SimulationPolicy`] holds every tuning constant of the simulation
//! - [`SyntheticGenerator`] produces a canonical series from the policy,
//!   a random source and the last real series (if any)
//!
//! Synthetic series satisfy the same invariants as live ones. Callers learn
//! that a series is synthetic from the fetch outcome, never from the data.

mod generator;
mod policy;

pub use generator::{SyntheticGenerator, SyntheticMode};
pub use policy::SimulationPolicy;
