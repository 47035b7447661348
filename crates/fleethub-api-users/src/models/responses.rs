//! Response models for the user management API.

use fleethub_core::{CustomerId, MachineId};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A single machine the user may access.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MachineAssignmentView {
    /// Assignment row ID.
    pub id: Uuid,

    /// The machine granted.
    pub machine_id: MachineId,
}

/// The fully enriched user view model.
///
/// Assembled fresh on every read from the provider's representation plus
/// local joins; never persisted as a unit.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct UserProfile {
    /// Provider-assigned user ID.
    pub id: Uuid,

    /// Login name.
    pub username: String,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the account may log in.
    pub enabled: bool,

    /// Whether the email address has been verified.
    pub email_verified: bool,

    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Job title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    /// Department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Current application role name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Display name for the current role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_display_name: Option<String>,

    /// Customer scopes the user belongs to.
    pub customer_ids: Vec<CustomerId>,

    /// Machines the user may access.
    pub machines: Vec<MachineAssignmentView>,

    /// Profile image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,

    /// Phone country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_code: Option<String>,

    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// IANA time zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// UI locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Country.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// State or province.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// FCM device tokens, each encoded `"<deviceId>||<token>"`.
    pub fcm_tokens: Vec<String>,
}

/// Response returned after creating a user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    /// The new user's provider-assigned ID.
    pub id: Uuid,
}

/// Response returned by the role assignment operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleAssignmentResult {
    /// The role that was requested.
    pub role: String,

    /// Whether the user already held the role.
    pub already_assigned: bool,
}
