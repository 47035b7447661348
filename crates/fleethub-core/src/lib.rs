//! fleethub Core Library
//!
//! Shared types for the fleethub machine-fleet backend.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`MachineId`, `CustomerId`)

pub mod ids;

pub use ids::{CustomerId, MachineId, ParseIdError};
