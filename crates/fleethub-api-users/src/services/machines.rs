//! Machine access validation and assignment.
//!
//! Validation runs before any provider mutation so a bad machine list can
//! never leave a half-applied saga behind.

use std::collections::HashSet;

use fleethub_core::{CustomerId, MachineId};
use fleethub_db::FleetStore;
use tracing::debug;
use uuid::Uuid;

use crate::error::UserApiError;

/// Check that every requested machine ID exists in the local store.
///
/// An empty list is valid (a user may have no machines). On failure the
/// error lists exactly the offending IDs.
pub async fn validate_machine_ids(
    store: &dyn FleetStore,
    ids: &[MachineId],
) -> Result<(), UserApiError> {
    if ids.is_empty() {
        return Ok(());
    }

    let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
    let found: HashSet<Uuid> = store
        .machines_by_ids(&uuids)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();

    let missing: Vec<MachineId> = ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id.as_uuid()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(UserApiError::InvalidMachines(missing))
    }
}

/// Check that every requested customer ID exists in the local store.
pub async fn validate_customer_ids(
    store: &dyn FleetStore,
    ids: &[CustomerId],
) -> Result<(), UserApiError> {
    if ids.is_empty() {
        return Ok(());
    }

    let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
    let found: HashSet<Uuid> = store
        .customers_by_ids(&uuids)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    let missing: Vec<CustomerId> = ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id.as_uuid()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(UserApiError::InvalidCustomers(missing))
    }
}

/// Replace a user's machine assignments with exactly the set of `ids`.
///
/// Full replace, not a diff: the store deletes every existing row and
/// inserts the new set in one transaction, so the operation is idempotent
/// under retry. Duplicated input IDs collapse to one row; a (user, machine)
/// pair appears at most once.
pub async fn replace_assignments(
    store: &dyn FleetStore,
    user_id: Uuid,
    ids: &[MachineId],
) -> Result<(), UserApiError> {
    let mut seen = HashSet::new();
    let uuids: Vec<Uuid> = ids
        .iter()
        .map(|id| *id.as_uuid())
        .filter(|id| seen.insert(*id))
        .collect();
    store.replace_user_machines(user_id, &uuids).await?;
    debug!(user_id = %user_id, count = uuids.len(), "Replaced machine assignments");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fakes::FakeStore;

    #[tokio::test]
    async fn test_empty_machine_list_is_valid() {
        let store = FakeStore::new();
        assert!(validate_machine_ids(&store, &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_machine_ids_listed_in_error() {
        let known = MachineId::new();
        let unknown = MachineId::new();
        let store = FakeStore::new().with_machine(known);

        let err = validate_machine_ids(&store, &[known, unknown])
            .await
            .unwrap_err();
        match err {
            UserApiError::InvalidMachines(missing) => assert_eq!(missing, vec![unknown]),
            other => panic!("expected InvalidMachines, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_customer_ids_listed_in_error() {
        let known = CustomerId::new();
        let unknown = CustomerId::new();
        let store = FakeStore::new().with_customer(known);

        assert!(validate_customer_ids(&store, &[known]).await.is_ok());

        let err = validate_customer_ids(&store, &[known, unknown])
            .await
            .unwrap_err();
        assert!(matches!(err, UserApiError::InvalidCustomers(m) if m == vec![unknown]));
    }

    #[tokio::test]
    async fn test_duplicate_machine_ids_collapse_to_one_row() {
        let user_id = Uuid::new_v4();
        let machine = MachineId::new();
        let store = FakeStore::new().with_machine(machine);

        assert!(validate_machine_ids(&store, &[machine, machine]).await.is_ok());

        replace_assignments(&store, user_id, &[machine, machine])
            .await
            .unwrap();

        let rows = store.assignments_for(user_id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].machine_id, machine.into_uuid());
    }

    #[tokio::test]
    async fn test_replace_assignments_is_idempotent_by_content() {
        let user_id = Uuid::new_v4();
        let machines = [MachineId::new(), MachineId::new()];
        let store = FakeStore::new()
            .with_machine(machines[0])
            .with_machine(machines[1]);

        replace_assignments(&store, user_id, &machines).await.unwrap();
        let first: Vec<Uuid> = store
            .assignments_for(user_id)
            .iter()
            .map(|a| a.machine_id)
            .collect();

        replace_assignments(&store, user_id, &machines).await.unwrap();
        let second: Vec<Uuid> = store
            .assignments_for(user_id)
            .iter()
            .map(|a| a.machine_id)
            .collect();

        // Same content either way, and no duplicated rows.
        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
    }
}
