//! Delete user endpoint handler.
//!
//! DELETE /users/:id - Remove a user from the provider and local store.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::Extension;
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::error::UserApiError;
use crate::services::UserService;

/// Deletes a user. Holders of a protected role are rejected.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "User holds a protected role"),
        (status = 404, description = "User not found"),
        (status = 502, description = "Identity provider rejected the delete"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn delete_user_handler(
    Extension(acting): Extension<ActingUser>,
    Extension(user_service): Extension<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, UserApiError> {
    tracing::info!(acting_user = %acting.id(), user_id = %id, "Deleting user");

    user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
