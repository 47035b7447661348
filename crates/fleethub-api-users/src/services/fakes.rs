//! In-memory fakes for the provider, store and blob seams.
//!
//! Each fake records the operations invoked on it so tests can assert on
//! call sequences (e.g. "zero provider calls before validation passed").

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use fleethub_blob::{BlobResult, BlobStore};
use fleethub_core::{CustomerId, MachineId};
use fleethub_db::{Customer, FleetStore, Machine, UserMachine};
use fleethub_keycloak::{
    IdentityProvider, KeycloakError, KeycloakResult, RoleRepresentation, UserQuery,
    UserRepresentation,
};

fn upstream(status: u16, message: &str) -> KeycloakError {
    KeycloakError::Upstream {
        status,
        message: message.to_string(),
    }
}

/// Identity provider fake backed by vectors and maps.
#[derive(Default)]
pub(crate) struct FakeProvider {
    users: Mutex<Vec<UserRepresentation>>,
    user_roles: Mutex<HashMap<Uuid, Vec<RoleRepresentation>>>,
    realm_roles: Mutex<Vec<RoleRepresentation>>,
    calls: Mutex<Vec<&'static str>>,
    fail_create: Option<(u16, String)>,
    fail_update: Option<(u16, String)>,
    fail_add_role: Option<(u16, String)>,
    fail_remove_role: Option<(u16, String)>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: UserRepresentation) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }

    pub fn with_user_roles(self, user_id: Uuid, roles: Vec<RoleRepresentation>) -> Self {
        self.user_roles.lock().unwrap().insert(user_id, roles);
        self
    }

    pub fn with_realm_roles(self, roles: Vec<RoleRepresentation>) -> Self {
        *self.realm_roles.lock().unwrap() = roles;
        self
    }

    pub fn failing_create(mut self, status: u16, message: &str) -> Self {
        self.fail_create = Some((status, message.to_string()));
        self
    }

    pub fn failing_update(mut self, status: u16, message: &str) -> Self {
        self.fail_update = Some((status, message.to_string()));
        self
    }

    pub fn failing_add_role(mut self, status: u16, message: &str) -> Self {
        self.fail_add_role = Some((status, message.to_string()));
        self
    }

    pub fn failing_remove_role(mut self, status: u16, message: &str) -> Self {
        self.fail_remove_role = Some((status, message.to_string()));
        self
    }

    /// Names of the provider operations invoked, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored_user(&self, id: Uuid) -> Option<UserRepresentation> {
        let id = id.to_string();
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id.as_deref() == Some(id.as_str()))
            .cloned()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn get_user(&self, id: Uuid) -> KeycloakResult<UserRepresentation> {
        self.record("get_user");
        self.stored_user(id)
            .ok_or_else(|| upstream(404, "User not found"))
    }

    async fn list_users(&self, _query: &UserQuery) -> KeycloakResult<Vec<UserRepresentation>> {
        self.record("list_users");
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, user: &UserRepresentation) -> KeycloakResult<Uuid> {
        self.record("create_user");
        if let Some((status, message)) = &self.fail_create {
            return Err(upstream(*status, message));
        }
        let id = Uuid::new_v4();
        let mut stored = user.clone();
        stored.id = Some(id.to_string());
        self.users.lock().unwrap().push(stored);
        Ok(id)
    }

    async fn update_user(&self, id: Uuid, user: &UserRepresentation) -> KeycloakResult<()> {
        self.record("update_user");
        if let Some((status, message)) = &self.fail_update {
            return Err(upstream(*status, message));
        }
        let id_str = id.to_string();
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id.as_deref() == Some(&id_str)) {
            Some(slot) => {
                *slot = user.clone();
                slot.id = Some(id_str);
                Ok(())
            }
            None => Err(upstream(404, "User not found")),
        }
    }

    async fn delete_user(&self, id: Uuid) -> KeycloakResult<()> {
        self.record("delete_user");
        let id_str = id.to_string();
        self.users
            .lock()
            .unwrap()
            .retain(|u| u.id.as_deref() != Some(id_str.as_str()));
        Ok(())
    }

    async fn get_user_roles(&self, id: Uuid) -> KeycloakResult<Vec<RoleRepresentation>> {
        self.record("get_user_roles");
        Ok(self
            .user_roles
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_realm_roles(&self) -> KeycloakResult<Vec<RoleRepresentation>> {
        self.record("list_realm_roles");
        Ok(self.realm_roles.lock().unwrap().clone())
    }

    async fn add_role_mapping(&self, id: Uuid, role: &RoleRepresentation) -> KeycloakResult<()> {
        self.record("add_role_mapping");
        if let Some((status, message)) = &self.fail_add_role {
            return Err(upstream(*status, message));
        }
        self.user_roles
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push(role.clone());
        Ok(())
    }

    async fn remove_role_mapping(&self, id: Uuid, role: &RoleRepresentation) -> KeycloakResult<()> {
        self.record("remove_role_mapping");
        if let Some((status, message)) = &self.fail_remove_role {
            return Err(upstream(*status, message));
        }
        if let Some(roles) = self.user_roles.lock().unwrap().get_mut(&id) {
            roles.retain(|r| !r.name.eq_ignore_ascii_case(&role.name));
        }
        Ok(())
    }

    async fn send_verification_email(&self, id: Uuid) -> KeycloakResult<()> {
        let _ = id;
        self.record("send_verification_email");
        Ok(())
    }
}

/// Fleet store fake over vectors.
#[derive(Default)]
pub(crate) struct FakeStore {
    machines: Mutex<Vec<Machine>>,
    customers: Mutex<Vec<Customer>>,
    assignments: Mutex<HashMap<Uuid, Vec<UserMachine>>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_machine(self, id: MachineId) -> Self {
        self.machines.lock().unwrap().push(Machine {
            id: id.into_uuid(),
            customer_id: Uuid::new_v4(),
            name: format!("machine-{id}"),
            serial_number: id.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        self
    }

    pub fn with_customer(self, id: CustomerId) -> Self {
        self.customers.lock().unwrap().push(Customer {
            id: id.into_uuid(),
            name: format!("customer-{id}"),
            is_active: true,
            created_at: Utc::now(),
        });
        self
    }

    pub fn with_assignment(self, user_id: Uuid, machine_id: MachineId) -> Self {
        self.assignments
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .push(UserMachine {
                id: Uuid::new_v4(),
                user_id,
                machine_id: machine_id.into_uuid(),
                created_at: Utc::now(),
            });
        self
    }

    pub fn assignments_for(&self, user_id: Uuid) -> Vec<UserMachine> {
        self.assignments
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl FleetStore for FakeStore {
    async fn machines_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Machine>, sqlx::Error> {
        Ok(self
            .machines
            .lock()
            .unwrap()
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn customers_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, sqlx::Error> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn machines_for_user(&self, user_id: Uuid) -> Result<Vec<UserMachine>, sqlx::Error> {
        Ok(self.assignments_for(user_id))
    }

    async fn replace_user_machines(
        &self,
        user_id: Uuid,
        machine_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let rows = machine_ids
            .iter()
            .map(|machine_id| UserMachine {
                id: Uuid::new_v4(),
                user_id,
                machine_id: *machine_id,
                created_at: Utc::now(),
            })
            .collect();
        self.assignments.lock().unwrap().insert(user_id, rows);
        Ok(())
    }

    async fn delete_user_machines(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let removed = self.assignments.lock().unwrap().remove(&user_id);
        Ok(removed.map_or(0, |rows| rows.len() as u64))
    }
}

/// Blob store fake that counts uploads and deletes.
#[derive(Default)]
pub(crate) struct FakeBlob {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    counter: AtomicUsize,
    fail_upload: bool,
}

impl FakeBlob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeBlob {
    async fn upload_base64(&self, _data: &str, folder: &str) -> BlobResult<String> {
        if self.fail_upload {
            return Err(fleethub_blob::BlobError::InvalidData(
                "upload rejected".to_string(),
            ));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let url = format!("http://blobs.test/{folder}/{n}");
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn delete_by_url(&self, url: &str) -> BlobResult<()> {
        self.deletes.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
