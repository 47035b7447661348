//! Attribute codec.
//!
//! Converts the provider's flat, multi-valued attribute bag into the typed
//! [`UserProfile`] and merges partial profile updates back into a bag.
//!
//! Each updatable attribute carries an explicit merge policy; new fields are
//! added by declaring a policy entry, not by copying branches.

use std::collections::HashMap;
use std::str::FromStr;

use fleethub_core::CustomerId;
use fleethub_keycloak::UserRepresentation;
use uuid::Uuid;

use crate::error::UserApiError;
use crate::models::{CreateUserRequest, UpdateUserRequest, UserProfile};

/// Attribute bag keys as stored by the provider.
pub mod attr {
    pub const JOB_TITLE: &str = "jobTitle";
    pub const DEPARTMENT: &str = "department";
    pub const CUSTOMER_IDS: &str = "customerIds";
    pub const PHONE_CODE: &str = "phoneCode";
    pub const PHONE_NUMBER: &str = "phoneNumber";
    pub const TIMEZONE: &str = "timeZone";
    pub const LOCALE: &str = "locale";
    pub const CITY: &str = "city";
    pub const COUNTRY: &str = "country";
    pub const REGION: &str = "region";
    pub const STATE: &str = "state";
    pub const PROFILE_IMAGE: &str = "profileImageUrl";
    pub const FCM_TOKENS: &str = "fcmTokens";
}

/// Separator between device ID and token in an FCM entry.
const FCM_SEPARATOR: &str = "||";

/// How an incoming value merges into the stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldPolicy {
    /// A blank incoming value keeps the stored entry unchanged; a non-blank
    /// value overwrites it.
    SkipIfBlank,

    /// Any supplied value overwrites, including an explicit empty string;
    /// only an omitted (`None`) value keeps the stored entry.
    SetEmptyAllowed,
}

/// Decode a raw provider record into the typed view model.
///
/// Absent attributes yield `None`/empty results; only a missing or
/// malformed user ID is an error. Role and machine data are filled in by
/// the enrichment pipeline, not here.
pub fn decode(raw: &UserRepresentation) -> Result<UserProfile, UserApiError> {
    let id = raw
        .id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| {
            UserApiError::Internal(format!("Provider user record has no usable ID: {:?}", raw.id))
        })?;

    let customer_ids = raw
        .attribute_values(attr::CUSTOMER_IDS)
        .iter()
        .filter_map(|v| CustomerId::from_str(v).ok())
        .collect();

    Ok(UserProfile {
        id,
        username: raw.username.clone().unwrap_or_default(),
        email: raw.email.clone(),
        enabled: raw.enabled.unwrap_or(false),
        email_verified: raw.email_verified.unwrap_or(false),
        first_name: raw.first_name.clone(),
        last_name: raw.last_name.clone(),
        job_title: raw.attribute(attr::JOB_TITLE).map(str::to_string),
        department: raw.attribute(attr::DEPARTMENT).map(str::to_string),
        role: None,
        role_display_name: None,
        customer_ids,
        machines: Vec::new(),
        profile_image_url: raw.attribute(attr::PROFILE_IMAGE).map(str::to_string),
        phone_code: raw.attribute(attr::PHONE_CODE).map(str::to_string),
        phone_number: raw.attribute(attr::PHONE_NUMBER).map(str::to_string),
        timezone: raw.attribute(attr::TIMEZONE).map(str::to_string),
        locale: raw.attribute(attr::LOCALE).map(str::to_string),
        city: raw.attribute(attr::CITY).map(str::to_string),
        country: raw.attribute(attr::COUNTRY).map(str::to_string),
        region: raw.attribute(attr::REGION).map(str::to_string),
        state: raw.attribute(attr::STATE).map(str::to_string),
        fcm_tokens: raw.attribute_values(attr::FCM_TOKENS).to_vec(),
    })
}

/// Merge a partial update into an existing attribute bag.
///
/// Keys absent from the update keep their stored values; see
/// [`FieldPolicy`] for the per-field semantics.
#[must_use]
pub fn merge_patch(
    existing: Option<&HashMap<String, Vec<String>>>,
    update: &UpdateUserRequest,
    new_image_url: Option<&str>,
) -> HashMap<String, Vec<String>> {
    let mut attrs = existing.cloned().unwrap_or_default();

    let policies: [(&str, Option<&str>, FieldPolicy); 10] = [
        (attr::JOB_TITLE, update.job_title.as_deref(), FieldPolicy::SkipIfBlank),
        (attr::DEPARTMENT, update.department.as_deref(), FieldPolicy::SkipIfBlank),
        (attr::PHONE_CODE, update.phone_code.as_deref(), FieldPolicy::SkipIfBlank),
        (attr::PHONE_NUMBER, update.phone_number.as_deref(), FieldPolicy::SkipIfBlank),
        (attr::TIMEZONE, update.timezone.as_deref(), FieldPolicy::SkipIfBlank),
        (attr::LOCALE, update.locale.as_deref(), FieldPolicy::SkipIfBlank),
        (attr::CITY, update.city.as_deref(), FieldPolicy::SetEmptyAllowed),
        (attr::COUNTRY, update.country.as_deref(), FieldPolicy::SetEmptyAllowed),
        (attr::REGION, update.region.as_deref(), FieldPolicy::SetEmptyAllowed),
        (attr::STATE, update.state.as_deref(), FieldPolicy::SetEmptyAllowed),
    ];
    for (key, incoming, policy) in policies {
        apply_policy(&mut attrs, key, incoming, policy);
    }

    if !update.customer_ids.is_empty() {
        attrs.insert(
            attr::CUSTOMER_IDS.to_string(),
            update.customer_ids.iter().map(ToString::to_string).collect(),
        );
    }

    if let Some(url) = new_image_url {
        attrs.insert(attr::PROFILE_IMAGE.to_string(), vec![url.to_string()]);
    }

    if !update.fcm_tokens.is_empty() {
        let merged = {
            let existing_tokens = attrs
                .get(attr::FCM_TOKENS)
                .map_or(&[][..], Vec::as_slice);
            merge_fcm_tokens(existing_tokens, &update.fcm_tokens)
        };
        attrs.insert(attr::FCM_TOKENS.to_string(), merged);
    }

    attrs
}

/// Build the attribute bag for a brand-new user.
#[must_use]
pub fn build_create_attributes(
    request: &CreateUserRequest,
    image_url: Option<&str>,
) -> HashMap<String, Vec<String>> {
    let mut attrs = HashMap::new();

    let fields: [(&str, Option<&str>); 10] = [
        (attr::JOB_TITLE, request.job_title.as_deref()),
        (attr::DEPARTMENT, request.department.as_deref()),
        (attr::PHONE_CODE, request.phone_code.as_deref()),
        (attr::PHONE_NUMBER, request.phone_number.as_deref()),
        (attr::TIMEZONE, request.timezone.as_deref()),
        (attr::LOCALE, request.locale.as_deref()),
        (attr::CITY, request.city.as_deref()),
        (attr::COUNTRY, request.country.as_deref()),
        (attr::REGION, request.region.as_deref()),
        (attr::STATE, request.state.as_deref()),
    ];
    for (key, value) in fields {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            attrs.insert(key.to_string(), vec![value.to_string()]);
        }
    }

    if !request.customer_ids.is_empty() {
        attrs.insert(
            attr::CUSTOMER_IDS.to_string(),
            request.customer_ids.iter().map(ToString::to_string).collect(),
        );
    }

    if let Some(url) = image_url {
        attrs.insert(attr::PROFILE_IMAGE.to_string(), vec![url.to_string()]);
    }

    if !request.fcm_tokens.is_empty() {
        attrs.insert(
            attr::FCM_TOKENS.to_string(),
            merge_fcm_tokens(&[], &request.fcm_tokens),
        );
    }

    attrs
}

fn apply_policy(
    attrs: &mut HashMap<String, Vec<String>>,
    key: &str,
    incoming: Option<&str>,
    policy: FieldPolicy,
) {
    match policy {
        FieldPolicy::SkipIfBlank => {
            if let Some(value) = incoming.filter(|v| !v.trim().is_empty()) {
                attrs.insert(key.to_string(), vec![value.to_string()]);
            }
        }
        FieldPolicy::SetEmptyAllowed => {
            if let Some(value) = incoming {
                attrs.insert(key.to_string(), vec![value.to_string()]);
            }
        }
    }
}

/// Merge new FCM token entries into an existing list.
///
/// Entries are `"<deviceId>||<token>"`. The result holds at most one entry
/// per device; the last write for a device wins. Malformed entries are
/// dropped silently.
#[must_use]
pub fn merge_fcm_tokens(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut devices: Vec<String> = Vec::new();
    let mut tokens: HashMap<String, String> = HashMap::new();

    for entry in existing.iter().chain(incoming) {
        let Some((device, token)) = entry.split_once(FCM_SEPARATOR) else {
            continue;
        };
        if !tokens.contains_key(device) {
            devices.push(device.to_string());
        }
        tokens.insert(device.to_string(), token.to_string());
    }

    devices
        .into_iter()
        .map(|device| {
            let token = &tokens[&device];
            format!("{device}{FCM_SEPARATOR}{token}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, vs)| {
                (
                    (*k).to_string(),
                    vs.iter().map(|v| (*v).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_decode_absent_attributes_yield_none() {
        let raw = UserRepresentation {
            id: Some(Uuid::new_v4().to_string()),
            username: Some("ada".to_string()),
            enabled: Some(true),
            ..Default::default()
        };
        let profile = decode(&raw).unwrap();
        assert_eq!(profile.username, "ada");
        assert!(profile.enabled);
        assert_eq!(profile.job_title, None);
        assert_eq!(profile.city, None);
        assert!(profile.customer_ids.is_empty());
        assert!(profile.fcm_tokens.is_empty());
    }

    #[test]
    fn test_decode_reads_attribute_bag() {
        let customer = CustomerId::new();
        let raw = UserRepresentation {
            id: Some(Uuid::new_v4().to_string()),
            attributes: Some(bag(&[
                (attr::JOB_TITLE, &["Technician"]),
                (attr::CUSTOMER_IDS, &[&customer.to_string()]),
                (attr::FCM_TOKENS, &["d1||tA"]),
            ])),
            ..Default::default()
        };
        let profile = decode(&raw).unwrap();
        assert_eq!(profile.job_title.as_deref(), Some("Technician"));
        assert_eq!(profile.customer_ids, vec![customer]);
        assert_eq!(profile.fcm_tokens, vec!["d1||tA".to_string()]);
    }

    #[test]
    fn test_decode_rejects_missing_id() {
        let raw = UserRepresentation::default();
        assert!(decode(&raw).is_err());
    }

    #[test]
    fn test_skip_if_blank_keeps_stored_value() {
        let existing = bag(&[(attr::JOB_TITLE, &["Technician"])]);
        let update = UpdateUserRequest {
            job_title: Some("   ".to_string()),
            ..Default::default()
        };
        let merged = merge_patch(Some(&existing), &update, None);
        assert_eq!(merged[attr::JOB_TITLE], vec!["Technician".to_string()]);
    }

    #[test]
    fn test_skip_if_blank_overwrites_with_value() {
        let existing = bag(&[(attr::DEPARTMENT, &["Service"])]);
        let update = UpdateUserRequest {
            department: Some("Sales".to_string()),
            ..Default::default()
        };
        let merged = merge_patch(Some(&existing), &update, None);
        assert_eq!(merged[attr::DEPARTMENT], vec!["Sales".to_string()]);
    }

    #[test]
    fn test_set_empty_allowed_overwrites_with_empty_string() {
        let existing = bag(&[(attr::CITY, &["Oslo"])]);
        let update = UpdateUserRequest {
            city: Some(String::new()),
            ..Default::default()
        };
        let merged = merge_patch(Some(&existing), &update, None);
        assert_eq!(merged[attr::CITY], vec![String::new()]);
    }

    #[test]
    fn test_omitted_field_never_overwrites_either_group() {
        let existing = bag(&[(attr::CITY, &["Oslo"]), (attr::JOB_TITLE, &["Technician"])]);
        let update = UpdateUserRequest::default();
        let merged = merge_patch(Some(&existing), &update, None);
        assert_eq!(merged[attr::CITY], vec!["Oslo".to_string()]);
        assert_eq!(merged[attr::JOB_TITLE], vec!["Technician".to_string()]);
    }

    #[test]
    fn test_customer_ids_overwritten_only_when_non_empty() {
        let stored = CustomerId::new();
        let existing = bag(&[(attr::CUSTOMER_IDS, &[&stored.to_string()])]);

        let merged = merge_patch(Some(&existing), &UpdateUserRequest::default(), None);
        assert_eq!(merged[attr::CUSTOMER_IDS], vec![stored.to_string()]);

        let replacement = CustomerId::new();
        let update = UpdateUserRequest {
            customer_ids: vec![replacement],
            ..Default::default()
        };
        let merged = merge_patch(Some(&existing), &update, None);
        assert_eq!(merged[attr::CUSTOMER_IDS], vec![replacement.to_string()]);
    }

    #[test]
    fn test_new_image_replaces_and_absence_retains() {
        let existing = bag(&[(attr::PROFILE_IMAGE, &["http://blobs/old"])]);

        let merged = merge_patch(Some(&existing), &UpdateUserRequest::default(), None);
        assert_eq!(merged[attr::PROFILE_IMAGE], vec!["http://blobs/old".to_string()]);

        let merged = merge_patch(
            Some(&existing),
            &UpdateUserRequest::default(),
            Some("http://blobs/new"),
        );
        assert_eq!(merged[attr::PROFILE_IMAGE], vec!["http://blobs/new".to_string()]);
    }

    #[test]
    fn test_fcm_dedup_last_write_per_device_wins() {
        let merged = merge_fcm_tokens(
            &[],
            &[
                "d1||tA".to_string(),
                "d2||tB".to_string(),
                "d1||tC".to_string(),
            ],
        );
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&"d1||tC".to_string()));
        assert!(merged.contains(&"d2||tB".to_string()));
    }

    #[test]
    fn test_fcm_incoming_overrides_existing_device() {
        let merged = merge_fcm_tokens(
            &["d1||old".to_string(), "d3||kept".to_string()],
            &["d1||new".to_string()],
        );
        assert!(merged.contains(&"d1||new".to_string()));
        assert!(merged.contains(&"d3||kept".to_string()));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_fcm_empty_incoming_keeps_existing_verbatim() {
        let existing = bag(&[(attr::FCM_TOKENS, &["d1||tA", "d2||tB"])]);
        let merged = merge_patch(Some(&existing), &UpdateUserRequest::default(), None);
        assert_eq!(
            merged[attr::FCM_TOKENS],
            vec!["d1||tA".to_string(), "d2||tB".to_string()]
        );
    }

    #[test]
    fn test_fcm_malformed_entries_dropped() {
        let merged = merge_fcm_tokens(&[], &["no-separator".to_string(), "d1||t".to_string()]);
        assert_eq!(merged, vec!["d1||t".to_string()]);
    }

    #[test]
    fn test_build_create_attributes_skips_blanks() {
        let request = CreateUserRequest {
            job_title: Some("Technician".to_string()),
            department: Some("  ".to_string()),
            ..Default::default()
        };
        let attrs = build_create_attributes(&request, Some("http://blobs/img"));
        assert_eq!(attrs[attr::JOB_TITLE], vec!["Technician".to_string()]);
        assert!(!attrs.contains_key(attr::DEPARTMENT));
        assert_eq!(attrs[attr::PROFILE_IMAGE], vec!["http://blobs/img".to_string()]);
    }
}
