//! fleethub User Management API
//!
//! Orchestrates user lifecycle operations across the identity provider that
//! owns the accounts, the local relational store that owns machine and
//! customer data, and the blob store that holds profile images. Reads
//! assemble an enriched, filtered view; writes run as sagas with explicit
//! compensation, since the provider offers no transactions.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use auth::ActingUser;
pub use error::UserApiError;
pub use router::{users_router, UsersState};
pub use services::UserService;
