//! User-machine assignment model.
//!
//! Links a provider-owned user account to a locally owned machine. A given
//! (user, machine) pair appears at most once; the whole set for a user is
//! replaced in one transaction whenever the user's machine list changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's access grant to a single machine.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserMachine {
    /// Unique identifier for the assignment row.
    pub id: Uuid,

    /// The provider-side user the grant belongs to.
    pub user_id: Uuid,

    /// The machine the user may access.
    pub machine_id: Uuid,

    /// When the grant was created.
    pub created_at: DateTime<Utc>,
}

impl UserMachine {
    /// List all machine assignments for a user.
    pub async fn list_for_user(
        pool: &sqlx::PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM user_machines
            WHERE user_id = $1
            ORDER BY created_at
            ",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Replace every assignment for `user_id` with one row per ID in
    /// `machine_ids`, in a single transaction.
    ///
    /// Intentionally a full delete-then-insert rather than a diff: the
    /// operation is idempotent by content and a reader can never observe a
    /// transiently empty set.
    pub async fn replace_for_user(
        pool: &sqlx::PgPool,
        user_id: Uuid,
        machine_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
            DELETE FROM user_machines
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        for machine_id in machine_ids {
            sqlx::query(
                r"
                INSERT INTO user_machines (id, user_id, machine_id, created_at)
                VALUES ($1, $2, $3, NOW())
                ",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(machine_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Delete all assignments for a user (used when the user is removed).
    pub async fn delete_for_user(pool: &sqlx::PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            DELETE FROM user_machines
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
