//! The `FleetStore` contract.
//!
//! Services depend on this trait rather than on `PgPool` directly so the
//! saga and enrichment logic can be exercised against in-memory fakes.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::customer::Customer;
use crate::models::machine::Machine;
use crate::models::user_machine::UserMachine;

/// Read/write contract over the locally owned fleet data.
#[async_trait]
pub trait FleetStore: Send + Sync {
    /// Fetch the machines matching `ids` (missing IDs are simply absent).
    async fn machines_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Machine>, sqlx::Error>;

    /// Fetch the customers matching `ids`.
    async fn customers_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, sqlx::Error>;

    /// List a user's machine assignments.
    async fn machines_for_user(&self, user_id: Uuid) -> Result<Vec<UserMachine>, sqlx::Error>;

    /// Atomically replace a user's machine assignments.
    async fn replace_user_machines(
        &self,
        user_id: Uuid,
        machine_ids: &[Uuid],
    ) -> Result<(), sqlx::Error>;

    /// Remove every machine assignment for a user.
    async fn delete_user_machines(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;
}

/// Postgres-backed [`FleetStore`].
#[derive(Debug, Clone)]
pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FleetStore for PgFleetStore {
    async fn machines_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Machine>, sqlx::Error> {
        Machine::find_by_ids(&self.pool, ids).await
    }

    async fn customers_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, sqlx::Error> {
        Customer::find_by_ids(&self.pool, ids).await
    }

    async fn machines_for_user(&self, user_id: Uuid) -> Result<Vec<UserMachine>, sqlx::Error> {
        UserMachine::list_for_user(&self.pool, user_id).await
    }

    async fn replace_user_machines(
        &self,
        user_id: Uuid,
        machine_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        UserMachine::replace_for_user(&self.pool, user_id, machine_ids).await
    }

    async fn delete_user_machines(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        UserMachine::delete_for_user(&self.pool, user_id).await
    }
}
