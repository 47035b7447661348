//! List and get user endpoint handlers.
//!
//! GET /users - List users with pagination, search and enrichment.
//! GET /users/:id - Get one fully enriched user.

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::error::UserApiError;
use crate::models::{ListUsersQuery, UserProfile};
use crate::services::UserService;

/// Lists users with enrichment and visibility filtering.
#[utoipa::path(
    get,
    path = "/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users listed", body = Vec<UserProfile>),
        (status = 502, description = "Identity provider unavailable"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn list_users_handler(
    Extension(acting): Extension<ActingUser>,
    Extension(user_service): Extension<Arc<UserService>>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserProfile>>, UserApiError> {
    let profiles = user_service.list_users(&query, acting.id()).await?;
    Ok(Json(profiles))
}

/// Fetches one user with roles, machines and attributes resolved.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserProfile),
        (status = 404, description = "User not found"),
        (status = 502, description = "Identity provider unavailable"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn get_user_handler(
    Extension(user_service): Extension<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, UserApiError> {
    let profile = user_service.get_user(id).await?;
    Ok(Json(profile))
}
