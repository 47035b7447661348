//! Error types for the Keycloak client.

use thiserror::Error;

/// Error type for identity provider operations.
#[derive(Debug, Error)]
pub enum KeycloakError {
    /// Client misconfiguration (bad base URL, failed HTTP client build).
    #[error("Keycloak configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, body read).
    #[error("Keycloak request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Keycloak returned {status}: {message}")]
    Upstream {
        /// HTTP status code from the provider.
        status: u16,
        /// Message unwrapped from the provider's error body.
        message: String,
    },

    /// The provider answered 2xx but the body or headers were unusable.
    #[error("Unexpected Keycloak response: {0}")]
    InvalidResponse(String),
}

/// Result alias for identity provider operations.
pub type KeycloakResult<T> = Result<T, KeycloakError>;

/// Unwrap the human-meaningful message from a Keycloak error body.
///
/// Token endpoints answer `{"error": ..., "error_description": ...}`, admin
/// endpoints answer `{"errorMessage": ...}`; anything else falls back to the
/// raw body text (or the status line when the body is empty).
pub(crate) fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "errorMessage"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body.trim().to_string()
    }
}
