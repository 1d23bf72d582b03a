//! Core types for the `ReCollect` waste pickup client.

/// Domain models and identifiers for pickup schedules.
pub mod model;
/// Error type and the trait describing a pickup schedule source.
pub mod ports;

pub use model::*;
pub use ports::*;
