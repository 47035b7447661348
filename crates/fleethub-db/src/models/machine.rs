//! Machine model.
//!
//! A machine is a physical unit in the fleet, owned by a customer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A machine record in the local store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Machine {
    /// Unique identifier for the machine.
    pub id: Uuid,

    /// The customer this machine belongs to.
    pub customer_id: Uuid,

    /// Display name of the machine.
    pub name: String,

    /// Manufacturer serial number.
    pub serial_number: String,

    /// When the machine was registered.
    pub created_at: DateTime<Utc>,

    /// When the machine was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Machine {
    /// Find all machines whose IDs are in `ids`.
    ///
    /// Returns only the machines that exist; callers compare against the
    /// requested set to detect unknown IDs.
    pub async fn find_by_ids(pool: &sqlx::PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM machines
            WHERE id = ANY($1)
            ORDER BY name
            ",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
