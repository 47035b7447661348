//! Role catalog and role-transition reconciliation.
//!
//! The provider supports multiple realm roles per user, but fleethub treats
//! each user as holding at most one application role. The reconciler turns a
//! (current, desired) pair into the minimal set of provider-side mutations,
//! guarding the protected platform roles throughout. Role-name comparison is
//! case-insensitive everywhere.

use tracing::{info, warn};
use uuid::Uuid;

use fleethub_keycloak::{IdentityProvider, KeycloakError, RoleRepresentation};

use crate::error::UserApiError;

/// Roles only privileged flows may assign or remove.
pub const PROTECTED_ROLES: &[&str] = &["SystemAdmin", "PlatformAdmin"];

/// Roles that mark a user as administrative for visibility filtering.
pub const ADMIN_ROLES: &[&str] = &["SystemAdmin", "PlatformAdmin", "BridgeIntegration"];

/// The realm's intrinsic composite role is named `default-roles-<realm>`.
const DEFAULT_ROLE_PREFIX: &str = "default-roles-";

/// Provider-internal roles that are never an application role.
const BUILT_IN_ROLES: &[&str] = &["offline_access", "uma_authorization"];

/// Whether `name` is a protected platform role.
#[must_use]
pub fn is_protected(name: &str) -> bool {
    PROTECTED_ROLES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Whether `name` marks its holder as administrative.
#[must_use]
pub fn is_admin_role(name: &str) -> bool {
    ADMIN_ROLES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Whether `name` is a provider-intrinsic role that is never removed.
#[must_use]
pub fn is_intrinsic(name: &str) -> bool {
    name.to_ascii_lowercase().starts_with(DEFAULT_ROLE_PREFIX)
        || BUILT_IN_ROLES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// The single application role a user holds, derived by filtering the
/// provider's intrinsic roles out of the user's realm role mappings.
#[must_use]
pub fn current_application_role(roles: &[RoleRepresentation]) -> Option<&RoleRepresentation> {
    roles.iter().find(|role| !is_intrinsic(&role.name))
}

/// Display name for a role: its provider description when set, else the name.
#[must_use]
pub fn display_name(role: &RoleRepresentation) -> String {
    role.description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(&role.name)
        .to_string()
}

/// Outcome of a role reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    /// The desired role was mapped onto the user.
    Assigned,

    /// The user already held the desired role; no provider calls were made.
    AlreadyAssigned,
}

/// The provider's realm role catalog.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<RoleRepresentation>,
}

impl RoleCatalog {
    /// Fetch the realm role list from the provider.
    pub async fn load(provider: &dyn IdentityProvider) -> Result<Self, UserApiError> {
        let roles = provider.list_realm_roles().await?;
        Ok(Self { roles })
    }

    /// Build a catalog from an already-fetched role list.
    #[must_use]
    pub fn from_roles(roles: Vec<RoleRepresentation>) -> Self {
        Self { roles }
    }

    /// Look up a role by name, case-insensitively.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RoleRepresentation> {
        self.roles.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

/// Check that `role` may be assigned through the public path: it must exist
/// in the catalog and must not be protected.
pub fn validate_assignable(role: &str, catalog: &RoleCatalog) -> Result<(), UserApiError> {
    if is_protected(role) {
        return Err(UserApiError::RoleProtected(role.to_string()));
    }
    if catalog.find(role).is_none() {
        return Err(UserApiError::UnknownRole(role.to_string()));
    }
    Ok(())
}

/// Reconcile a user's application role towards `desired`.
///
/// Terminal states, in evaluation order:
/// 1. current equals desired (case-insensitive): no provider calls.
/// 2. current is protected: [`UserApiError::RoleProtected`].
/// 3. desired is protected: [`UserApiError::RoleProtected`].
/// 4. desired absent from the catalog: [`UserApiError::UnknownRole`].
/// 5. removal of the prior role is best-effort; its failure is logged and
///    never rolls back. If the subsequent addition fails the user may be
///    left with no application role until the caller retries — an accepted
///    inconsistency window, since the provider offers no transactions.
pub async fn reconcile(
    provider: &dyn IdentityProvider,
    user_id: Uuid,
    current: Option<&str>,
    desired: &str,
    catalog: &RoleCatalog,
) -> Result<RoleOutcome, UserApiError> {
    if let Some(current) = current {
        if current.eq_ignore_ascii_case(desired) {
            return Ok(RoleOutcome::AlreadyAssigned);
        }
        if is_protected(current) {
            return Err(UserApiError::RoleProtected(current.to_string()));
        }
    }

    if is_protected(desired) {
        return Err(UserApiError::RoleProtected(desired.to_string()));
    }

    let Some(desired_role) = catalog.find(desired) else {
        return Err(UserApiError::UnknownRole(desired.to_string()));
    };

    if let Some(current) = current.filter(|c| !c.trim().is_empty() && !is_intrinsic(c)) {
        match catalog.find(current) {
            Some(current_role) => {
                if let Err(e) = provider.remove_role_mapping(user_id, current_role).await {
                    warn!(
                        user_id = %user_id,
                        role = %current,
                        error = %e,
                        "Failed to remove prior role mapping; continuing with assignment"
                    );
                }
            }
            None => {
                warn!(
                    user_id = %user_id,
                    role = %current,
                    "Prior role no longer exists in the catalog; skipping removal"
                );
            }
        }
    }

    if let Err(e) = provider.add_role_mapping(user_id, desired_role).await {
        let (status, message) = match e {
            KeycloakError::Upstream { status, message } => (status, message),
            other => (502, other.to_string()),
        };
        return Err(UserApiError::RoleAssignmentFailed { status, message });
    }

    info!(user_id = %user_id, role = %desired, "Assigned application role");
    Ok(RoleOutcome::Assigned)
}
