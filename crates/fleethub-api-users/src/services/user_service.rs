//! User lifecycle sagas.
//!
//! Create, update and delete each span the identity provider, the local
//! store and the blob store. The provider offers no transactions, so each
//! saga runs its steps in a fixed order with explicit, idempotent
//! compensations instead of atomic rollback. Local validations always run
//! before the first provider mutation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use fleethub_blob::BlobStore;
use fleethub_db::FleetStore;
use fleethub_keycloak::{
    CredentialRepresentation, IdentityProvider, KeycloakError, UserRepresentation,
};

use crate::error::UserApiError;
use crate::models::{CreateUserRequest, ListUsersQuery, UpdateUserRequest, UserProfile};
use crate::services::enrichment::{Enricher, EnrichmentOptions};
use crate::services::{attributes, machines, roles};
use crate::services::roles::{RoleCatalog, RoleOutcome};

/// Blob folder holding profile images.
const PROFILE_IMAGE_FOLDER: &str = "profile-images";

/// Orchestrates the user lifecycle across provider, store and blobs.
pub struct UserService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn FleetStore>,
    blob: Arc<dyn BlobStore>,
    enricher: Enricher,
}

impl UserService {
    /// Create a service over the given collaborators.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn FleetStore>,
        blob: Arc<dyn BlobStore>,
    ) -> Self {
        let enricher = Enricher::new(Arc::clone(&provider), Arc::clone(&store));
        Self {
            provider,
            store,
            blob,
            enricher,
        }
    }

    /// Create a user.
    ///
    /// Saga order: local guards and store validations, image upload,
    /// provider create (on failure the uploaded image is deleted), role
    /// assignment, machine assignment, then the self-signup verification
    /// email. A failed step short-circuits; later steps do not run.
    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
        self_signup: bool,
    ) -> Result<Uuid, UserApiError> {
        if request.username.trim().is_empty() {
            return Err(UserApiError::Validation("Username is required".into()));
        }
        if request.email.trim().is_empty() {
            return Err(UserApiError::Validation("Email is required".into()));
        }

        // Local role guards first; the catalog lookup happens after the
        // store validations so a bad machine list never reaches the wire.
        let role = if self_signup {
            None
        } else {
            let role = request
                .role
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .ok_or_else(|| UserApiError::Validation("A role is required".into()))?;
            if roles::is_protected(role) {
                return Err(UserApiError::RoleProtected(role.to_string()));
            }
            Some(role)
        };

        machines::validate_machine_ids(self.store.as_ref(), &request.machine_ids).await?;
        machines::validate_customer_ids(self.store.as_ref(), &request.customer_ids).await?;

        let catalog = match role {
            Some(role) => {
                let catalog = RoleCatalog::load(self.provider.as_ref()).await?;
                roles::validate_assignable(role, &catalog)?;
                Some(catalog)
            }
            None => None,
        };

        let uploaded = match &request.profile_image_base64 {
            Some(data) => Some(self.blob.upload_base64(data, PROFILE_IMAGE_FOLDER).await?),
            None => None,
        };

        let payload = UserRepresentation {
            id: None,
            username: Some(request.username.clone()),
            email: Some(request.email.clone()),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            enabled: Some(true),
            email_verified: Some(false),
            attributes: Some(attributes::build_create_attributes(
                request,
                uploaded.as_deref(),
            )),
            credentials: request
                .password
                .as_ref()
                .map(|p| vec![CredentialRepresentation::password(p.clone())]),
            required_actions: None,
        };

        let new_id = match self.provider.create_user(&payload).await {
            Ok(id) => id,
            Err(e) => {
                if let Some(url) = &uploaded {
                    self.delete_image_best_effort(url).await;
                }
                return Err(e.into());
            }
        };

        if let (Some(role), Some(catalog)) = (role, &catalog) {
            roles::reconcile(self.provider.as_ref(), new_id, None, role, catalog).await?;
        }

        if !request.machine_ids.is_empty() {
            machines::replace_assignments(self.store.as_ref(), new_id, &request.machine_ids)
                .await?;
        }

        if self_signup {
            self.provider.send_verification_email(new_id).await?;
        }

        info!(user_id = %new_id, self_signup, "Created user");
        Ok(new_id)
    }

    /// Update a user.
    ///
    /// The attribute push is the pivot: if it fails, a freshly uploaded
    /// image is deleted and the saga aborts. After a confirmed push, a
    /// failed role reconciliation is surfaced to the caller but the profile
    /// update is kept, and the old image is deleted only once the push has
    /// succeeded so a failure never loses the only copy.
    pub async fn update_user(
        &self,
        id: Uuid,
        request: &UpdateUserRequest,
    ) -> Result<UserProfile, UserApiError> {
        let desired_role = request
            .role
            .as_deref()
            .filter(|r| !r.trim().is_empty());
        if let Some(role) = desired_role {
            if roles::is_protected(role) {
                return Err(UserApiError::RoleProtected(role.to_string()));
            }
        }

        if let Some(ids) = &request.machine_ids {
            machines::validate_machine_ids(self.store.as_ref(), ids).await?;
        }
        machines::validate_customer_ids(self.store.as_ref(), &request.customer_ids).await?;

        let catalog = match desired_role {
            Some(role) => {
                let catalog = RoleCatalog::load(self.provider.as_ref()).await?;
                roles::validate_assignable(role, &catalog)?;
                Some(catalog)
            }
            None => None,
        };

        let current = self
            .provider
            .get_user(id)
            .await
            .map_err(map_fetch_error)?;
        let old_image = current
            .attribute(attributes::attr::PROFILE_IMAGE)
            .map(str::to_string);

        let uploaded = match &request.profile_image_base64 {
            Some(data) => Some(self.blob.upload_base64(data, PROFILE_IMAGE_FOLDER).await?),
            None => None,
        };

        let merged = attributes::merge_patch(
            current.attributes.as_ref(),
            request,
            uploaded.as_deref(),
        );

        let mut updated = current.clone();
        if let Some(first_name) = non_blank(&request.first_name) {
            updated.first_name = Some(first_name.to_string());
        }
        if let Some(last_name) = non_blank(&request.last_name) {
            updated.last_name = Some(last_name.to_string());
        }
        if let Some(enabled) = request.enabled {
            updated.enabled = Some(enabled);
        }
        updated.attributes = Some(merged);
        updated.credentials = None;

        if let Err(e) = self.provider.update_user(id, &updated).await {
            if let Some(url) = &uploaded {
                self.delete_image_best_effort(url).await;
            }
            return Err(map_fetch_error(e));
        }

        if let (Some(role), Some(catalog)) = (desired_role, &catalog) {
            let user_roles = self.provider.get_user_roles(id).await?;
            let current_role =
                roles::current_application_role(&user_roles).map(|r| r.name.clone());
            // A failure here is reported to the caller, but the pushed
            // profile update is deliberately kept (see the module docs).
            roles::reconcile(
                self.provider.as_ref(),
                id,
                current_role.as_deref(),
                role,
                catalog,
            )
            .await?;
        }

        if uploaded.is_some() {
            if let Some(old) = old_image.filter(|old| Some(old.as_str()) != uploaded.as_deref()) {
                self.delete_image_best_effort(&old).await;
            }
        }

        if let Some(ids) = &request.machine_ids {
            machines::replace_assignments(self.store.as_ref(), id, ids).await?;
        }

        info!(user_id = %id, "Updated user");
        self.load_profile(id).await
    }

    /// Delete a user.
    ///
    /// Holders of a protected role are rejected. The profile image delete
    /// is best-effort; the provider delete decides the outcome.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UserApiError> {
        let user = self.provider.get_user(id).await.map_err(map_fetch_error)?;

        let user_roles = self.provider.get_user_roles(id).await?;
        if let Some(protected) = user_roles.iter().find(|r| roles::is_protected(&r.name)) {
            return Err(UserApiError::RoleProtected(protected.name.clone()));
        }

        if let Some(url) = user.attribute(attributes::attr::PROFILE_IMAGE) {
            self.delete_image_best_effort(url).await;
        }

        self.provider.delete_user(id).await?;

        if let Err(e) = self.store.delete_user_machines(id).await {
            warn!(user_id = %id, error = %e, "Failed to remove machine assignments for deleted user");
        }

        info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// Fetch one user as a fully enriched profile.
    pub async fn get_user(&self, id: Uuid) -> Result<UserProfile, UserApiError> {
        self.load_profile(id).await
    }

    /// List users with enrichment and visibility filtering.
    ///
    /// The customer-scope restriction is enforced here by post-filtering
    /// the enriched profiles; the provider's own filtering is not trusted
    /// with it.
    pub async fn list_users(
        &self,
        query: &ListUsersQuery,
        acting_user_id: Uuid,
    ) -> Result<Vec<UserProfile>, UserApiError> {
        let records = self
            .provider
            .list_users(&query.to_provider_query())
            .await?;

        let options = EnrichmentOptions {
            detailed: query.detailed.unwrap_or(true),
            include_admins_and_self: query.include_admins_and_self.unwrap_or(false),
            acting_user_id,
        };
        let mut profiles = self.enricher.enrich_page(records, options).await;

        if let Some(customer) = query.customer_id {
            profiles.retain(|p| p.customer_ids.contains(&customer));
        }

        Ok(profiles)
    }

    /// Assign an application role, reconciling away the prior one.
    pub async fn assign_role(
        &self,
        user_id: Uuid,
        desired: &str,
    ) -> Result<RoleOutcome, UserApiError> {
        let user_roles = self
            .provider
            .get_user_roles(user_id)
            .await
            .map_err(map_fetch_error)?;
        let current = roles::current_application_role(&user_roles).map(|r| r.name.clone());
        let catalog = RoleCatalog::load(self.provider.as_ref()).await?;
        roles::reconcile(
            self.provider.as_ref(),
            user_id,
            current.as_deref(),
            desired,
            &catalog,
        )
        .await
    }

    async fn load_profile(&self, id: Uuid) -> Result<UserProfile, UserApiError> {
        let record = self.provider.get_user(id).await.map_err(map_fetch_error)?;
        self.enricher
            .enrich_user(record)
            .await
            .ok_or_else(|| UserApiError::Internal(format!("Failed to enrich user {id}")))
    }

    /// Compensation helper: image deletes must survive being retried and
    /// must never fail the surrounding saga.
    async fn delete_image_best_effort(&self, url: &str) {
        if let Err(e) = self.blob.delete_by_url(url).await {
            warn!(url = %url, error = %e, "Failed to delete profile image");
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn map_fetch_error(e: KeycloakError) -> UserApiError {
    match e {
        KeycloakError::Upstream { status: 404, .. } => UserApiError::NotFound,
        other => other.into(),
    }
}
