//! Create user endpoint handlers.
//!
//! POST /users - Administrative user creation.
//! POST /signup - Self-signup without a role, with verification email.

use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};

use crate::auth::ActingUser;
use crate::error::UserApiError;
use crate::models::{CreateUserRequest, CreateUserResponse};
use crate::services::UserService;

/// Creates a new user with a role and machine assignments.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Validation error or unknown role"),
        (status = 403, description = "Role is protected"),
        (status = 502, description = "Identity provider rejected the request"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn create_user_handler(
    Extension(acting): Extension<ActingUser>,
    Extension(user_service): Extension<Arc<UserService>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), UserApiError> {
    tracing::info!(acting_user = %acting.id(), username = %request.username, "Creating user");

    let id = user_service.create_user(&request, false).await?;
    Ok((StatusCode::CREATED, Json(CreateUserResponse { id })))
}

/// Self-signup: creates a user without a role and sends a verification email.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = CreateUserResponse),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Identity provider rejected the request"),
    ),
    tag = "Users"
)]
pub async fn self_signup_handler(
    Extension(user_service): Extension<Arc<UserService>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), UserApiError> {
    tracing::info!(username = %request.username, "Self-signup");

    let id = user_service.create_user(&request, true).await?;
    Ok((StatusCode::CREATED, Json(CreateUserResponse { id })))
}
