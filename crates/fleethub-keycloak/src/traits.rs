//! The identity provider contract.
//!
//! The user services depend on this trait rather than on the concrete HTTP
//! client so saga and enrichment logic can be exercised with fakes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::KeycloakResult;
use crate::models::{RoleRepresentation, UserQuery, UserRepresentation};

/// Operations the core needs from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch a single user by provider ID.
    async fn get_user(&self, id: Uuid) -> KeycloakResult<UserRepresentation>;

    /// List users matching the query (one provider page).
    async fn list_users(&self, query: &UserQuery) -> KeycloakResult<Vec<UserRepresentation>>;

    /// Create a user; returns the new user's ID parsed from the response
    /// Location header.
    async fn create_user(&self, user: &UserRepresentation) -> KeycloakResult<Uuid>;

    /// Replace a user's stored representation.
    async fn update_user(&self, id: Uuid, user: &UserRepresentation) -> KeycloakResult<()>;

    /// Delete a user account.
    async fn delete_user(&self, id: Uuid) -> KeycloakResult<()>;

    /// Realm roles currently mapped to the user.
    async fn get_user_roles(&self, id: Uuid) -> KeycloakResult<Vec<RoleRepresentation>>;

    /// All realm roles defined by the provider.
    async fn list_realm_roles(&self) -> KeycloakResult<Vec<RoleRepresentation>>;

    /// Map a realm role onto the user.
    async fn add_role_mapping(&self, id: Uuid, role: &RoleRepresentation) -> KeycloakResult<()>;

    /// Remove a realm role mapping from the user.
    async fn remove_role_mapping(&self, id: Uuid, role: &RoleRepresentation) -> KeycloakResult<()>;

    /// Trigger the provider's email verification flow for the user.
    async fn send_verification_email(&self, id: Uuid) -> KeycloakResult<()>;
}
