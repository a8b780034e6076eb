//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer; repositories convert them
//! into validated domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{items, pending_swap_items, swaps, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub location: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub location: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Profile fields an account holder may change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChanges<'a> {
    pub display_name: &'a str,
    pub location: &'a str,
}

/// Row read from `items`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: Option<String>,
    pub owner_display_name: Option<String>,
    pub owner_location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub location: Option<&'a str>,
    pub owner_display_name: Option<&'a str>,
    pub owner_location: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Owner-editable listing fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = items)]
pub(crate) struct ItemDetailsChanges<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
}

/// Ownership fields rewritten when a swap is approved.
///
/// `treat_none_as_null` so a transfer to an owner without a snapshot clears
/// the previous owner's copy.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = items, treat_none_as_null = true)]
pub(crate) struct ItemOwnerChanges<'a> {
    pub owner_id: Uuid,
    pub owner_display_name: Option<&'a str>,
    pub owner_location: Option<&'a str>,
}

/// Row read from `swaps`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = swaps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SwapRow {
    pub id: Uuid,
    pub item1: Uuid,
    pub item2: Uuid,
    pub item1_user: Uuid,
    pub item2_user: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = swaps)]
pub(crate) struct NewSwapRow<'a> {
    pub id: Uuid,
    pub item1: Uuid,
    pub item2: Uuid,
    pub item1_user: Uuid,
    pub item2_user: Uuid,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Party and status columns written when a swap closes.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = swaps)]
pub(crate) struct SwapOutcomeChanges<'a> {
    pub item1_user: Uuid,
    pub item2_user: Uuid,
    pub status: &'a str,
}

/// Claim on an item held by a pending swap.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = pending_swap_items)]
pub(crate) struct PendingClaimRow {
    pub item_id: Uuid,
    pub swap_id: Uuid,
}
