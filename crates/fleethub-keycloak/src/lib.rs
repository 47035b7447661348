//! fleethub Keycloak Client
//!
//! Admin REST API client for the identity provider that owns fleethub's user
//! accounts, credentials and role mappings.
//!
//! The [`IdentityProvider`] trait is the seam the user services depend on;
//! [`KeycloakAdminClient`] is the reqwest-backed implementation with admin
//! token caching and provider error-body unwrapping.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod traits;

pub use auth::AdminTokenCache;
pub use client::{KeycloakAdminClient, KeycloakConfig};
pub use error::{KeycloakError, KeycloakResult};
pub use models::{CredentialRepresentation, RoleRepresentation, UserQuery, UserRepresentation};
pub use traits::IdentityProvider;
