//! Role assignment endpoint handler.
//!
//! POST /users/:id/role - Assign an application role, reconciling away the
//! prior one.

use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::error::UserApiError;
use crate::models::{AssignRoleRequest, RoleAssignmentResult};
use crate::services::{RoleOutcome, UserService};

/// Assigns an application role to a user.
///
/// Assigning the role the user already holds succeeds without provider
/// mutations and reports `already_assigned: true`.
#[utoipa::path(
    post,
    path = "/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role reconciled", body = RoleAssignmentResult),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Current or desired role is protected"),
        (status = 404, description = "User not found"),
        (status = 502, description = "Identity provider rejected the mapping"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn assign_role_handler(
    Extension(acting): Extension<ActingUser>,
    Extension(user_service): Extension<Arc<UserService>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<RoleAssignmentResult>, UserApiError> {
    tracing::info!(
        acting_user = %acting.id(),
        user_id = %id,
        role = %request.role,
        "Assigning role"
    );

    let outcome = user_service.assign_role(id, &request.role).await?;
    Ok(Json(RoleAssignmentResult {
        role: request.role,
        already_assigned: outcome == RoleOutcome::AlreadyAssigned,
    }))
}
