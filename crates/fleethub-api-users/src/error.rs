//! Error types for the user management API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fleethub_blob::BlobError;
use fleethub_core::{CustomerId, MachineId};
use fleethub_keycloak::KeycloakError;
use serde::Serialize;
use utoipa::ToSchema;

/// Error type for the user management API.
#[derive(Debug, thiserror::Error)]
pub enum UserApiError {
    /// Bad input (blank mandatory fields, malformed values).
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more requested machine IDs do not exist locally.
    #[error("Unknown machine IDs: {0:?}")]
    InvalidMachines(Vec<MachineId>),

    /// One or more requested customer IDs do not exist locally.
    #[error("Unknown customer IDs: {0:?}")]
    InvalidCustomers(Vec<CustomerId>),

    /// The role may not be assigned or removed through this operation.
    #[error("Role '{0}' is protected")]
    RoleProtected(String),

    /// The requested role does not exist in the provider's catalog.
    #[error("Unknown role '{0}'")]
    UnknownRole(String),

    /// The provider rejected the role-mapping addition.
    #[error("Role assignment failed ({status}): {message}")]
    RoleAssignmentFailed {
        /// Provider HTTP status.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// User not found.
    #[error("User not found")]
    NotFound,

    /// Authentication required.
    #[error("Authentication required")]
    Unauthorized,

    /// The acting user may not perform this operation.
    #[error("Operation not permitted")]
    Forbidden,

    /// The identity provider or blob store returned a non-success result.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// Upstream HTTP status.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// Local store failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything unexpected caught at the operation boundary.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<KeycloakError> for UserApiError {
    fn from(err: KeycloakError) -> Self {
        match err {
            KeycloakError::Upstream { status, message } => {
                UserApiError::Upstream { status, message }
            }
            KeycloakError::Request(e) => UserApiError::Upstream {
                status: 502,
                message: e.to_string(),
            },
            KeycloakError::Config(msg) | KeycloakError::InvalidResponse(msg) => {
                UserApiError::Internal(msg)
            }
        }
    }
}

impl From<BlobError> for UserApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::InvalidData(msg) => UserApiError::Validation(msg),
            BlobError::Io(e) => UserApiError::Upstream {
                status: 502,
                message: e.to_string(),
            },
        }
    }
}

/// RFC 7807 Problem Details response format.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetails {
    fn new(kind: &str, title: &str, status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            problem_type: format!("https://fleethub.dev/problems/{kind}"),
            title: title.to_string(),
            status: status.as_u16(),
            detail: Some(detail.into()),
        }
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> Response {
        let (status, problem) = match &self {
            UserApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ProblemDetails::new("validation-error", "Validation Error", StatusCode::BAD_REQUEST, msg),
            ),
            UserApiError::InvalidMachines(_) | UserApiError::InvalidCustomers(_) => (
                StatusCode::BAD_REQUEST,
                ProblemDetails::new(
                    "validation-error",
                    "Validation Error",
                    StatusCode::BAD_REQUEST,
                    self.to_string(),
                ),
            ),
            UserApiError::UnknownRole(_) => (
                StatusCode::BAD_REQUEST,
                ProblemDetails::new(
                    "unknown-role",
                    "Unknown Role",
                    StatusCode::BAD_REQUEST,
                    self.to_string(),
                ),
            ),
            UserApiError::RoleProtected(_) => (
                StatusCode::FORBIDDEN,
                ProblemDetails::new(
                    "role-protected",
                    "Role Protected",
                    StatusCode::FORBIDDEN,
                    self.to_string(),
                ),
            ),
            UserApiError::RoleAssignmentFailed { .. } => (
                StatusCode::BAD_GATEWAY,
                ProblemDetails::new(
                    "role-assignment-failed",
                    "Role Assignment Failed",
                    StatusCode::BAD_GATEWAY,
                    self.to_string(),
                ),
            ),
            UserApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ProblemDetails::new(
                    "not-found",
                    "Not Found",
                    StatusCode::NOT_FOUND,
                    "User not found",
                ),
            ),
            UserApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ProblemDetails::new(
                    "unauthorized",
                    "Unauthorized",
                    StatusCode::UNAUTHORIZED,
                    "Missing or invalid authentication",
                ),
            ),
            UserApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                ProblemDetails::new(
                    "forbidden",
                    "Forbidden",
                    StatusCode::FORBIDDEN,
                    "Operation not permitted",
                ),
            ),
            UserApiError::Upstream { .. } => (
                StatusCode::BAD_GATEWAY,
                ProblemDetails::new(
                    "upstream-error",
                    "Upstream Error",
                    StatusCode::BAD_GATEWAY,
                    self.to_string(),
                ),
            ),
            UserApiError::Database(e) => {
                tracing::error!(error = ?e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemDetails::new(
                        "internal-error",
                        "Internal Server Error",
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A database error occurred",
                    ),
                )
            }
            UserApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemDetails::new(
                        "internal-error",
                        "Internal Server Error",
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred",
                    ),
                )
            }
        };

        (status, Json(problem)).into_response()
    }
}
