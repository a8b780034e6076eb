//! PostgreSQL-backed `ItemRepository` implementation using Diesel ORM.
//!
//! Deletion runs in a transaction that locks the item row, refuses while a
//! pending swap holds a claim on it, and removes closed swaps that still
//! reference it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ItemRepository, ItemRepositoryError};
use crate::domain::{
    Category, DisplayName, Item, ItemDescription, ItemDraft, ItemId, ItemName, Location,
    OwnerSnapshot, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ItemDetailsChanges, ItemRow, NewItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::{items, pending_swap_items, swaps};

/// Diesel-backed implementation of the item repository port.
#[derive(Clone)]
pub struct DieselItemRepository {
    pool: DbPool,
}

impl DieselItemRepository {
    /// Build the repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ItemRepositoryError {
    map_basic_pool_error(error, ItemRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ItemRepositoryError {
    map_basic_diesel_error(
        error,
        ItemRepositoryError::query,
        ItemRepositoryError::connection,
    )
}

fn invalid_row(id: uuid::Uuid, err: impl std::fmt::Display) -> ItemRepositoryError {
    ItemRepositoryError::query(format!("stored item {id} is invalid: {err}"))
}

/// Convert a stored row into a validated domain item.
fn row_to_item(row: ItemRow) -> Result<Item, ItemRepositoryError> {
    let ItemRow {
        id,
        owner_id,
        name,
        description,
        category,
        location,
        owner_display_name,
        owner_location,
        created_at,
    } = row;

    let location = location
        .map(Location::new)
        .transpose()
        .map_err(|err| invalid_row(id, err))?;
    let owner_snapshot = match (owner_display_name, owner_location) {
        (Some(display_name), Some(location)) => Some(OwnerSnapshot {
            display_name: DisplayName::new(display_name).map_err(|err| invalid_row(id, err))?,
            location: Location::new(location).map_err(|err| invalid_row(id, err))?,
        }),
        _ => None,
    };

    Ok(Item::new(ItemDraft {
        id: ItemId::from_uuid(id),
        owner_id: UserId::from_uuid(owner_id),
        name: ItemName::new(name).map_err(|err| invalid_row(id, err))?,
        description: ItemDescription::new(description).map_err(|err| invalid_row(id, err))?,
        category: Category::new(category).map_err(|err| invalid_row(id, err))?,
        location,
        owner_snapshot,
        created_at,
    }))
}

fn rows_to_items(rows: Vec<ItemRow>) -> Result<Vec<Item>, ItemRepositoryError> {
    rows.into_iter().map(row_to_item).collect()
}

enum DeleteOutcome {
    NotOwned,
    Claimed,
    Deleted,
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let snapshot = item.owner_snapshot();
        let row = NewItemRow {
            id: *item.id().as_uuid(),
            owner_id: *item.owner_id().as_uuid(),
            name: item.name().as_ref(),
            description: item.description().as_ref(),
            category: item.category().as_ref(),
            location: item.location().map(AsRef::as_ref),
            owner_display_name: snapshot.map(|s| s.display_name.as_ref()),
            owner_location: snapshot.map(|s| s.location.as_ref()),
            created_at: item.created_at(),
        };

        diesel::insert_into(items::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = items::table
            .filter(items::id.eq(id.as_uuid()))
            .select(ItemRow::as_select())
            .first::<ItemRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_item).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = items::table
            .order((items::created_at.desc(), items::id.desc()))
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_items(rows)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = items::table
            .filter(items::owner_id.eq(owner.as_uuid()))
            .order((items::created_at.desc(), items::id.desc()))
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_items(rows)
    }

    async fn update_details(&self, item: &Item) -> Result<bool, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ItemDetailsChanges {
            name: item.name().as_ref(),
            description: item.description().as_ref(),
            category: item.category().as_ref(),
        };

        let updated = diesel::update(
            items::table.filter(
                items::id
                    .eq(item.id().as_uuid())
                    .and(items::owner_id.eq(item.owner_id().as_uuid())),
            ),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &ItemId, owner: &UserId) -> Result<bool, ItemRepositoryError> {
        let item_id = *id.as_uuid();
        let owner_id = *owner.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    let locked = items::table
                        .filter(items::id.eq(item_id).and(items::owner_id.eq(owner_id)))
                        .select(items::id)
                        .for_update()
                        .first::<uuid::Uuid>(conn)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Ok(DeleteOutcome::NotOwned);
                    }

                    let claims: i64 = pending_swap_items::table
                        .filter(pending_swap_items::item_id.eq(item_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if claims > 0 {
                        return Ok(DeleteOutcome::Claimed);
                    }

                    diesel::delete(
                        swaps::table.filter(swaps::item1.eq(item_id).or(swaps::item2.eq(item_id))),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(items::table.filter(items::id.eq(item_id)))
                        .execute(conn)
                        .await?;

                    Ok(DeleteOutcome::Deleted)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            DeleteOutcome::NotOwned => Ok(false),
            DeleteOutcome::Claimed => Err(ItemRepositoryError::in_pending_swap()),
            DeleteOutcome::Deleted => Ok(true),
        }
    }
}
