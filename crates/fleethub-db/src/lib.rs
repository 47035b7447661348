//! fleethub Database Layer
//!
//! Postgres models for the locally owned fleet data (machines, customers,
//! user-machine assignments) and the [`FleetStore`] contract consumed by the
//! user services.

pub mod models;
pub mod store;

pub use models::customer::Customer;
pub use models::machine::Machine;
pub use models::user_machine::UserMachine;
pub use store::{FleetStore, PgFleetStore};
