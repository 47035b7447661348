//! Core services: attribute codec, role reconciliation, machine access,
//! enrichment pipeline and the user lifecycle sagas.

pub mod attributes;
pub mod enrichment;
pub mod machines;
pub mod roles;
pub mod user_service;

#[cfg(test)]
pub(crate) mod fakes;

pub use enrichment::{Enricher, EnrichmentOptions};
pub use roles::{RoleCatalog, RoleOutcome};
pub use user_service::UserService;
