//! User management API router configuration.
//!
//! Configures routes for user management endpoints:
//! - GET /users - List users (with pagination, search and enrichment)
//! - POST /users - Create a new user
//! - GET /users/:id - Get user details
//! - PUT /users/:id - Update user
//! - DELETE /users/:id - Delete user
//! - POST /users/:id/role - Assign an application role
//! - POST /signup - Self-signup

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use fleethub_blob::BlobStore;
use fleethub_db::FleetStore;
use fleethub_keycloak::IdentityProvider;

use crate::handlers::{
    assign_role_handler, create_user_handler, delete_user_handler, get_user_handler,
    list_users_handler, self_signup_handler, update_user_handler,
};
use crate::services::UserService;

/// Application state for user management routes.
#[derive(Clone)]
pub struct UsersState {
    /// Lifecycle saga orchestrator shared across handlers.
    pub user_service: Arc<UserService>,
}

impl UsersState {
    /// Wire the user service over the given collaborators.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn FleetStore>,
        blob: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(provider, store, blob)),
        }
    }
}

/// Create the user management router with all endpoints.
///
/// All `/users` endpoints expect an [`crate::auth::ActingUser`] extension
/// inserted by the deployment's authentication middleware; `/signup` is the
/// one unauthenticated route.
pub fn users_router(state: UsersState) -> Router {
    Router::new()
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/users/:id",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .route("/users/:id/role", post(assign_role_handler))
        .route("/signup", post(self_signup_handler))
        .layer(Extension(state.user_service))
}
