//! Customer model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A customer (tenant scope for machines and user visibility).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier for the customer.
    pub id: Uuid,

    /// Customer display name.
    pub name: String,

    /// Whether the customer's subscription is active.
    pub is_active: bool,

    /// When the customer was created.
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Find all customers whose IDs are in `ids`.
    pub async fn find_by_ids(pool: &sqlx::PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM customers
            WHERE id = ANY($1)
            ORDER BY name
            ",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
