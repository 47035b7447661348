//! Concurrent user enrichment pipeline.
//!
//! Turns a page of raw provider records into fully populated, visibility
//! filtered [`UserProfile`]s. In detailed mode the per-user role and machine
//! lookups fan out concurrently, one task per record; parallelism is bounded
//! implicitly by the page size. Output order in detailed mode is
//! unspecified — callers that need paging stability re-sort downstream.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, warn};
use uuid::Uuid;

use fleethub_db::FleetStore;
use fleethub_keycloak::{IdentityProvider, UserRepresentation};

use crate::models::{MachineAssignmentView, UserProfile};
use crate::services::{attributes, roles};

/// Controls for one enrichment pass.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentOptions {
    /// Whether to fetch roles and machine assignments per record.
    pub detailed: bool,

    /// Whether administrative users and the acting user stay in the result.
    pub include_admins_and_self: bool,

    /// The viewer on whose behalf the page is being read.
    pub acting_user_id: Uuid,
}

/// Enrichment pipeline over the provider and local store seams.
#[derive(Clone)]
pub struct Enricher {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn FleetStore>,
}

impl Enricher {
    /// Create a pipeline over the given collaborators.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn FleetStore>) -> Self {
        Self { provider, store }
    }

    /// Enrich one provider page.
    ///
    /// A record that cannot be enriched (malformed ID, failed lookup) is
    /// dropped from the result; it never aborts the page.
    pub async fn enrich_page(
        &self,
        records: Vec<UserRepresentation>,
        options: EnrichmentOptions,
    ) -> Vec<UserProfile> {
        if !options.detailed {
            return records
                .iter()
                .filter(|record| options.include_admins_and_self || !is_self(record, options))
                .filter_map(|record| match attributes::decode(record) {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        warn!(error = %e, "Dropping undecodable user record");
                        None
                    }
                })
                .collect();
        }

        let mut join_set = JoinSet::new();
        for record in records {
            if !options.include_admins_and_self && is_self(&record, options) {
                continue;
            }
            let provider = Arc::clone(&self.provider);
            let store = Arc::clone(&self.store);
            join_set.spawn(async move {
                enrich_one(provider, store, record, options.include_admins_and_self).await
            });
        }

        let mut profiles = Vec::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(Some(profile)) => profiles.push(profile),
                Ok(None) => {}
                Err(e) => error!(error = %e, "Enrichment task panicked"),
            }
        }
        profiles
    }

    /// Enrich a single already-fetched record with roles and machines.
    pub async fn enrich_user(&self, record: UserRepresentation) -> Option<UserProfile> {
        enrich_one(Arc::clone(&self.provider), Arc::clone(&self.store), record, true).await
    }
}

fn is_self(record: &UserRepresentation, options: EnrichmentOptions) -> bool {
    record.id.as_deref() == Some(options.acting_user_id.to_string().as_str())
}

async fn enrich_one(
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn FleetStore>,
    record: UserRepresentation,
    include_admins: bool,
) -> Option<UserProfile> {
    let mut profile = match attributes::decode(&record) {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "Dropping undecodable user record");
            return None;
        }
    };

    let user_roles = match provider.get_user_roles(profile.id).await {
        Ok(user_roles) => user_roles,
        Err(e) => {
            warn!(user_id = %profile.id, error = %e, "Dropping user record: role fetch failed");
            return None;
        }
    };

    if !include_admins && user_roles.iter().any(|r| roles::is_admin_role(&r.name)) {
        return None;
    }

    if let Some(role) = roles::current_application_role(&user_roles) {
        profile.role = Some(role.name.clone());
        profile.role_display_name = Some(roles::display_name(role));
    }

    let assignments = match store.machines_for_user(profile.id).await {
        Ok(assignments) => assignments,
        Err(e) => {
            warn!(user_id = %profile.id, error = %e, "Dropping user record: machine fetch failed");
            return None;
        }
    };
    profile.machines = assignments
        .into_iter()
        .map(|a| MachineAssignmentView {
            id: a.id,
            machine_id: a.machine_id.into(),
        })
        .collect();

    Some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fakes::{FakeProvider, FakeStore};
    use fleethub_core::MachineId;
    use fleethub_keycloak::RoleRepresentation;

    fn record(id: Uuid, username: &str) -> UserRepresentation {
        UserRepresentation {
            id: Some(id.to_string()),
            username: Some(username.to_string()),
            enabled: Some(true),
            ..Default::default()
        }
    }

    fn role(name: &str) -> RoleRepresentation {
        RoleRepresentation {
            id: Some(Uuid::new_v4().to_string()),
            name: name.to_string(),
            description: None,
        }
    }

    fn enricher(provider: FakeProvider, store: FakeStore) -> Enricher {
        Enricher::new(Arc::new(provider), Arc::new(store))
    }

    #[tokio::test]
    async fn test_visibility_excludes_self_and_admins() {
        let acting = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let regular = Uuid::new_v4();

        let provider = FakeProvider::new()
            .with_user_roles(acting, vec![role("Viewer")])
            .with_user_roles(admin, vec![role("SystemAdmin")])
            .with_user_roles(regular, vec![role("Viewer")]);
        let pipeline = enricher(provider, FakeStore::new());

        let records = vec![
            record(acting, "me"),
            record(admin, "admin"),
            record(regular, "worker"),
        ];
        let profiles = pipeline
            .enrich_page(
                records,
                EnrichmentOptions {
                    detailed: true,
                    include_admins_and_self: false,
                    acting_user_id: acting,
                },
            )
            .await;

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].username, "worker");
    }

    #[tokio::test]
    async fn test_visibility_includes_self_and_admins_when_requested() {
        let acting = Uuid::new_v4();
        let admin = Uuid::new_v4();

        let provider = FakeProvider::new()
            .with_user_roles(acting, vec![role("Viewer")])
            .with_user_roles(admin, vec![role("PlatformAdmin")]);
        let pipeline = enricher(provider, FakeStore::new());

        let records = vec![record(acting, "me"), record(admin, "admin")];
        let profiles = pipeline
            .enrich_page(
                records,
                EnrichmentOptions {
                    detailed: true,
                    include_admins_and_self: true,
                    acting_user_id: acting,
                },
            )
            .await;

        assert_eq!(profiles.len(), 2);
    }

    #[tokio::test]
    async fn test_non_detailed_mode_skips_lookups_and_preserves_order() {
        let acting = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let provider = FakeProvider::new();
        let pipeline = Enricher::new(Arc::new(provider), Arc::new(FakeStore::new()));

        let records = vec![
            record(first, "alpha"),
            record(acting, "me"),
            record(second, "beta"),
        ];
        let profiles = pipeline
            .enrich_page(
                records,
                EnrichmentOptions {
                    detailed: false,
                    include_admins_and_self: false,
                    acting_user_id: acting,
                },
            )
            .await;

        let names: Vec<&str> = profiles.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert!(profiles.iter().all(|p| p.role.is_none()));
        assert!(profiles.iter().all(|p| p.machines.is_empty()));
    }

    #[tokio::test]
    async fn test_malformed_record_dropped_without_aborting_page() {
        let acting = Uuid::new_v4();
        let good = Uuid::new_v4();

        let provider = FakeProvider::new().with_user_roles(good, vec![role("Viewer")]);
        let pipeline = enricher(provider, FakeStore::new());

        let broken = UserRepresentation {
            id: Some("not-a-uuid".to_string()),
            username: Some("broken".to_string()),
            ..Default::default()
        };
        let profiles = pipeline
            .enrich_page(
                vec![broken, record(good, "fine")],
                EnrichmentOptions {
                    detailed: true,
                    include_admins_and_self: true,
                    acting_user_id: acting,
                },
            )
            .await;

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].username, "fine");
    }

    #[tokio::test]
    async fn test_detailed_mode_fills_roles_and_machines() {
        let acting = Uuid::new_v4();
        let user = Uuid::new_v4();
        let machine = MachineId::new();

        let provider = FakeProvider::new().with_user_roles(
            user,
            vec![
                RoleRepresentation {
                    id: None,
                    name: "default-roles-fleet".to_string(),
                    description: None,
                },
                RoleRepresentation {
                    id: None,
                    name: "CustomerAdmin".to_string(),
                    description: Some("Customer administrator".to_string()),
                },
            ],
        );
        let store = FakeStore::new().with_assignment(user, machine);
        let pipeline = enricher(provider, store);

        let profiles = pipeline
            .enrich_page(
                vec![record(user, "worker")],
                EnrichmentOptions {
                    detailed: true,
                    include_admins_and_self: true,
                    acting_user_id: acting,
                },
            )
            .await;

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].role.as_deref(), Some("CustomerAdmin"));
        assert_eq!(
            profiles[0].role_display_name.as_deref(),
            Some("Customer administrator")
        );
        assert_eq!(profiles[0].machines.len(), 1);
        assert_eq!(profiles[0].machines[0].machine_id, machine);
    }
}
