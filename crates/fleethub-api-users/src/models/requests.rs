//! Request models for the user management API.
//!
//! Optionality matters in [`UpdateUserRequest`]: for the set-empty-allowed
//! location fields, `None` means "field omitted, keep the stored value" while
//! `Some("")` means "explicitly clear". The two must not be collapsed.

use fleethub_core::{CustomerId, MachineId};
use fleethub_keycloak::UserQuery;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Request to create a new user.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Login name.
    pub username: String,

    /// Email address.
    pub email: String,

    /// Initial password (omitted for invitation-style flows).
    #[serde(default)]
    pub password: Option<String>,

    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,

    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,

    /// Application role to assign (required unless self-signup).
    #[serde(default)]
    pub role: Option<String>,

    /// Machines the user may access.
    #[serde(default)]
    pub machine_ids: Vec<MachineId>,

    /// Customer scopes the user belongs to.
    #[serde(default)]
    pub customer_ids: Vec<CustomerId>,

    /// Job title.
    #[serde(default)]
    pub job_title: Option<String>,

    /// Department.
    #[serde(default)]
    pub department: Option<String>,

    /// Phone country code.
    #[serde(default)]
    pub phone_code: Option<String>,

    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,

    /// IANA time zone.
    #[serde(default)]
    pub timezone: Option<String>,

    /// UI locale.
    #[serde(default)]
    pub locale: Option<String>,

    /// City.
    #[serde(default)]
    pub city: Option<String>,

    /// Country.
    #[serde(default)]
    pub country: Option<String>,

    /// Region.
    #[serde(default)]
    pub region: Option<String>,

    /// State or province.
    #[serde(default)]
    pub state: Option<String>,

    /// FCM device tokens, each encoded `"<deviceId>||<token>"`.
    #[serde(default)]
    pub fcm_tokens: Vec<String>,

    /// Base64-encoded profile image to upload.
    #[serde(default)]
    pub profile_image_base64: Option<String>,
}

/// Request to update an existing user.
///
/// Every field is optional; omitted fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// New given name (blank keeps the stored value).
    #[serde(default)]
    pub first_name: Option<String>,

    /// New family name (blank keeps the stored value).
    #[serde(default)]
    pub last_name: Option<String>,

    /// New enabled flag; only applied when explicitly supplied.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// New application role; triggers role reconciliation when supplied.
    #[serde(default)]
    pub role: Option<String>,

    /// New machine list; replaces all assignments when supplied.
    #[serde(default)]
    pub machine_ids: Option<Vec<MachineId>>,

    /// New customer scopes; applied only when non-empty.
    #[serde(default)]
    pub customer_ids: Vec<CustomerId>,

    /// Job title (skip-if-blank).
    #[serde(default)]
    pub job_title: Option<String>,

    /// Department (skip-if-blank).
    #[serde(default)]
    pub department: Option<String>,

    /// Phone country code (skip-if-blank).
    #[serde(default)]
    pub phone_code: Option<String>,

    /// Phone number (skip-if-blank).
    #[serde(default)]
    pub phone_number: Option<String>,

    /// IANA time zone (skip-if-blank).
    #[serde(default)]
    pub timezone: Option<String>,

    /// UI locale (skip-if-blank).
    #[serde(default)]
    pub locale: Option<String>,

    /// City (set-empty-allowed).
    #[serde(default)]
    pub city: Option<String>,

    /// Country (set-empty-allowed).
    #[serde(default)]
    pub country: Option<String>,

    /// Region (set-empty-allowed).
    #[serde(default)]
    pub region: Option<String>,

    /// State or province (set-empty-allowed).
    #[serde(default)]
    pub state: Option<String>,

    /// New FCM device tokens; merged with dedup when non-empty.
    #[serde(default)]
    pub fcm_tokens: Vec<String>,

    /// Base64-encoded replacement profile image.
    #[serde(default)]
    pub profile_image_base64: Option<String>,
}

/// Request to assign an application role to a user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignRoleRequest {
    /// The desired role name.
    pub role: String,
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Offset of the first record (default: 0).
    #[serde(default)]
    pub skip: Option<i32>,

    /// Maximum number of records (default: 20, max: 100).
    #[serde(default)]
    pub top: Option<i32>,

    /// Free-text search across username, name and email.
    #[serde(default)]
    pub search: Option<String>,

    /// Exact or prefix username filter.
    #[serde(default)]
    pub username: Option<String>,

    /// Exact or prefix email filter.
    #[serde(default)]
    pub email: Option<String>,

    /// Filter on the enabled flag.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Filter on the email-verified flag.
    #[serde(default)]
    pub email_verified: Option<bool>,

    /// Whether username/email filters require exact matches.
    #[serde(default)]
    pub exact: Option<bool>,

    /// Restrict results to users in this customer scope.
    ///
    /// Enforced by post-filtering enriched profiles, not delegated to the
    /// provider's own search.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,

    /// Whether to fetch roles and machine assignments per user.
    #[serde(default)]
    pub detailed: Option<bool>,

    /// Whether to include administrative users and the acting user.
    #[serde(default)]
    pub include_admins_and_self: Option<bool>,
}

impl ListUsersQuery {
    /// Default page size.
    pub const DEFAULT_TOP: i32 = 20;

    /// Maximum allowed page size.
    pub const MAX_TOP: i32 = 100;

    /// Offset, defaulting to 0.
    #[must_use]
    pub fn skip(&self) -> i32 {
        self.skip.unwrap_or(0).max(0)
    }

    /// Page size, clamped to the valid range.
    #[must_use]
    pub fn top(&self) -> i32 {
        self.top.unwrap_or(Self::DEFAULT_TOP).clamp(1, Self::MAX_TOP)
    }

    /// Render the provider-side query parameters.
    #[must_use]
    pub fn to_provider_query(&self) -> UserQuery {
        UserQuery {
            first: Some(self.skip()),
            max: Some(self.top()),
            search: self.search.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            enabled: self.enabled,
            email_verified: self.email_verified,
            exact: self.exact,
        }
    }
}
