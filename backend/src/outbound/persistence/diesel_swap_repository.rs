//! PostgreSQL-backed `SwapRepository` implementation using Diesel ORM.
//!
//! Every pending swap holds one `pending_swap_items` row per item. The claim
//! table's primary key makes concurrent proposals over the same item
//! mutually exclusive: the loser's insert fails with a unique violation and
//! its transaction rolls back.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{SwapRepository, SwapRepositoryError};
use crate::domain::{Item, ItemId, Swap, SwapDraft, SwapId, SwapStatus, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{
    ItemOwnerChanges, NewSwapRow, PendingClaimRow, SwapOutcomeChanges, SwapRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{items, pending_swap_items, swaps};

/// Diesel-backed implementation of the swap repository port.
#[derive(Clone)]
pub struct DieselSwapRepository {
    pool: DbPool,
}

impl DieselSwapRepository {
    /// Build the repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SwapRepositoryError {
    map_basic_pool_error(error, SwapRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SwapRepositoryError {
    if is_unique_violation(&error) {
        return SwapRepositoryError::conflict();
    }
    map_basic_diesel_error(
        error,
        SwapRepositoryError::query,
        SwapRepositoryError::connection,
    )
}

/// Failure inside a ledger transaction. Either variant rolls back.
#[derive(Debug)]
enum LedgerTxError {
    Database(diesel::result::Error),
    Rejected(SwapRepositoryError),
}

impl From<diesel::result::Error> for LedgerTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl From<LedgerTxError> for SwapRepositoryError {
    fn from(error: LedgerTxError) -> Self {
        match error {
            LedgerTxError::Database(err) => map_diesel_error(err),
            LedgerTxError::Rejected(err) => err,
        }
    }
}

fn row_to_swap(row: SwapRow) -> Result<Swap, SwapRepositoryError> {
    let SwapRow {
        id,
        item1,
        item2,
        item1_user,
        item2_user,
        status,
        created_at,
    } = row;
    let status = SwapStatus::from_str(&status)
        .map_err(|err| SwapRepositoryError::query(format!("stored swap {id}: {err}")))?;

    Ok(Swap::new(SwapDraft {
        id: SwapId::from_uuid(id),
        item1: ItemId::from_uuid(item1),
        item2: ItemId::from_uuid(item2),
        item1_user: UserId::from_uuid(item1_user),
        item2_user: UserId::from_uuid(item2_user),
        status,
        created_at,
    }))
}

fn rows_to_swaps(rows: Vec<SwapRow>) -> Result<Vec<Swap>, SwapRepositoryError> {
    rows.into_iter().map(row_to_swap).collect()
}

#[async_trait]
impl SwapRepository for DieselSwapRepository {
    async fn create_pending(&self, swap: &Swap) -> Result<(), SwapRepositoryError> {
        let swap_id = *swap.id().as_uuid();
        let expected = [
            (*swap.item1().as_uuid(), *swap.item1_user().as_uuid()),
            (*swap.item2().as_uuid(), *swap.item2_user().as_uuid()),
        ];
        let [(item1, item1_user), (item2, item2_user)] = expected;
        let row = NewSwapRow {
            id: swap_id,
            item1,
            item2,
            item1_user,
            item2_user,
            status: swap.status().as_str(),
            created_at: swap.created_at(),
        };
        let claims: Vec<PendingClaimRow> = expected
            .iter()
            .map(|&(item_id, _)| PendingClaimRow { item_id, swap_id })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let item_ids: Vec<Uuid> = expected.iter().map(|&(item_id, _)| item_id).collect();
                // Lock in id order so opposing proposals cannot deadlock.
                let owners: Vec<(Uuid, Uuid)> = items::table
                    .filter(items::id.eq_any(item_ids))
                    .order(items::id.asc())
                    .select((items::id, items::owner_id))
                    .for_update()
                    .load(conn)
                    .await?;
                if owners.len() != expected.len() {
                    return Err(LedgerTxError::Rejected(SwapRepositoryError::item_missing()));
                }
                if !expected.iter().all(|pair| owners.contains(pair)) {
                    return Err(LedgerTxError::Rejected(
                        SwapRepositoryError::owner_changed(),
                    ));
                }

                diesel::insert_into(swaps::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(pending_swap_items::table)
                    .values(&claims)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(SwapRepositoryError::from)
    }

    async fn find_by_id(&self, id: &SwapId) -> Result<Option<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = swaps::table
            .filter(swaps::id.eq(id.as_uuid()))
            .select(SwapRow::as_select())
            .first::<SwapRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_swap).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = swaps::table
            .filter(swaps::status.eq(SwapStatus::Pending.as_str()))
            .order(swaps::created_at.asc())
            .select(SwapRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_swaps(rows)
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = swaps::table
            .filter(
                swaps::item1_user
                    .eq(user.as_uuid())
                    .or(swaps::item2_user.eq(user.as_uuid())),
            )
            .order((swaps::created_at.desc(), swaps::id.desc()))
            .select(SwapRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_swaps(rows)
    }

    async fn close(&self, swap: &Swap, transferred: &[Item]) -> Result<(), SwapRepositoryError> {
        let swap_id = *swap.id().as_uuid();
        let outcome = SwapOutcomeChanges {
            item1_user: *swap.item1_user().as_uuid(),
            item2_user: *swap.item2_user().as_uuid(),
            status: swap.status().as_str(),
        };
        let ownership: Vec<(Uuid, ItemOwnerChanges<'_>)> = transferred
            .iter()
            .map(|item| {
                let snapshot = item.owner_snapshot();
                (
                    *item.id().as_uuid(),
                    ItemOwnerChanges {
                        owner_id: *item.owner_id().as_uuid(),
                        owner_display_name: snapshot.map(|s| s.display_name.as_ref()),
                        owner_location: snapshot.map(|s| s.location.as_ref()),
                    },
                )
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let closed = diesel::update(
                    swaps::table.filter(
                        swaps::id
                            .eq(swap_id)
                            .and(swaps::status.eq(SwapStatus::Pending.as_str())),
                    ),
                )
                .set(&outcome)
                .execute(conn)
                .await?;
                if closed == 0 {
                    return Err(LedgerTxError::Rejected(SwapRepositoryError::not_pending()));
                }

                for (item_id, changes) in &ownership {
                    let moved = diesel::update(items::table.filter(items::id.eq(item_id)))
                        .set(changes)
                        .execute(conn)
                        .await?;
                    if moved == 0 {
                        return Err(LedgerTxError::Rejected(SwapRepositoryError::item_missing()));
                    }
                }

                diesel::delete(
                    pending_swap_items::table.filter(pending_swap_items::swap_id.eq(swap_id)),
                )
                .execute(conn)
                .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(SwapRepositoryError::from)
    }

    async fn withdraw(&self, id: &SwapId) -> Result<(), SwapRepositoryError> {
        let swap_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    pending_swap_items::table.filter(pending_swap_items::swap_id.eq(swap_id)),
                )
                .execute(conn)
                .await?;
                let removed = diesel::delete(
                    swaps::table.filter(
                        swaps::id
                            .eq(swap_id)
                            .and(swaps::status.eq(SwapStatus::Pending.as_str())),
                    ),
                )
                .execute(conn)
                .await?;
                if removed == 0 {
                    return Err(LedgerTxError::Rejected(SwapRepositoryError::not_pending()));
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(SwapRepositoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    fn row(status: &str) -> SwapRow {
        SwapRow {
            id: Uuid::new_v4(),
            item1: Uuid::new_v4(),
            item2: Uuid::new_v4(),
            item1_user: Uuid::new_v4(),
            item2_user: Uuid::new_v4(),
            status: status.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("pending", SwapStatus::Pending)]
    #[case("approved", SwapStatus::Approved)]
    #[case("rejected", SwapStatus::Rejected)]
    fn stored_statuses_decode(#[case] stored: &str, #[case] expected: SwapStatus) {
        let swap = row_to_swap(row(stored)).expect("decodes");
        assert_eq!(swap.status(), expected);
    }

    #[rstest]
    fn unknown_status_is_a_query_error() {
        let err = row_to_swap(row("cancelled")).expect_err("rejects");
        assert!(matches!(err, SwapRepositoryError::Query { .. }));
    }

    #[rstest]
    fn lost_claim_race_maps_to_conflict() {
        let error = LedgerTxError::Database(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(String::from("duplicate key value")),
        ));
        assert_eq!(SwapRepositoryError::from(error), SwapRepositoryError::Conflict);
    }

    #[rstest]
    fn rejections_pass_through() {
        let error = LedgerTxError::Rejected(SwapRepositoryError::not_pending());
        assert_eq!(
            SwapRepositoryError::from(error),
            SwapRepositoryError::NotPending
        );
    }
}
