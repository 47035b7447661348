//! Wire representations for the Keycloak admin API.
//!
//! Shapes follow the admin REST API: camelCase fields, extended profile data
//! carried as a string-list-valued attribute bag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user account as stored by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    /// Provider-assigned user ID (absent on create payloads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Whether the account may log in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Whether the email address has been verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Extended profile fields as a multi-valued attribute bag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, Vec<String>>>,

    /// Credentials to set (create payloads only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialRepresentation>>,

    /// Actions the user must complete at next login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,
}

impl UserRepresentation {
    /// First value of an attribute, if present and non-empty.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_ref()?
            .get(name)?
            .first()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// All values of an attribute (empty slice when absent).
    #[must_use]
    pub fn attribute_values(&self, name: &str) -> &[String] {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .map_or(&[], Vec::as_slice)
    }
}

/// A credential entry on a create payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRepresentation {
    /// Credential type, normally `"password"`.
    #[serde(rename = "type")]
    pub credential_type: String,

    /// The secret value.
    pub value: String,

    /// Whether the user must change it at first login.
    pub temporary: bool,
}

impl CredentialRepresentation {
    /// A permanent password credential.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self {
            credential_type: "password".to_string(),
            value: value.into(),
            temporary: false,
        }
    }
}

/// A realm role as stored by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    /// Provider-assigned role ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Role name.
    pub name: String,

    /// Optional role description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Offset of the first record (provider `first`).
    pub first: Option<i32>,

    /// Maximum number of records (provider `max`).
    pub max: Option<i32>,

    /// Free-text search across username, name and email.
    pub search: Option<String>,

    /// Username filter.
    pub username: Option<String>,

    /// Email filter.
    pub email: Option<String>,

    /// Filter on the enabled flag.
    pub enabled: Option<bool>,

    /// Filter on the email-verified flag.
    pub email_verified: Option<bool>,

    /// Whether username/email filters require exact matches.
    pub exact: Option<bool>,
}

impl UserQuery {
    /// Render the query string pairs for the provider.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(first) = self.first {
            pairs.push(("first", first.to_string()));
        }
        if let Some(max) = self.max {
            pairs.push(("max", max.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(username) = &self.username {
            pairs.push(("username", username.clone()));
        }
        if let Some(email) = &self.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(enabled) = self.enabled {
            pairs.push(("enabled", enabled.to_string()));
        }
        if let Some(email_verified) = self.email_verified {
            pairs.push(("emailVerified", email_verified.to_string()));
        }
        if let Some(exact) = self.exact {
            pairs.push(("exact", exact.to_string()));
        }
        pairs
    }
}
