//! Update user endpoint handler.
//!
//! PUT /users/:id - Partial profile update with attribute merge.

use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::error::UserApiError;
use crate::models::{UpdateUserRequest, UserProfile};
use crate::services::UserService;

/// Applies a partial update to a user.
///
/// Omitted fields keep their stored values; the location fields accept an
/// explicit empty string as a clear.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserProfile),
        (status = 400, description = "Validation error or unknown role"),
        (status = 403, description = "Role is protected"),
        (status = 404, description = "User not found"),
        (status = 502, description = "Identity provider rejected the update"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn update_user_handler(
    Extension(acting): Extension<ActingUser>,
    Extension(user_service): Extension<Arc<UserService>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, UserApiError> {
    tracing::info!(acting_user = %acting.id(), user_id = %id, "Updating user");

    let profile = user_service.update_user(id, &request).await?;
    Ok(Json(profile))
}
