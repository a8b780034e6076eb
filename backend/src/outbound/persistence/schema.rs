//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the embedded migrations exactly. When a
//! migration changes a table, update the matching block here; `diesel
//! print-schema` against a migrated database produces the same output.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Public display name.
        display_name -> Varchar,
        /// Lower-cased login email; unique across accounts.
        email -> Varchar,
        /// Free-text home location.
        location -> Varchar,
        /// Encoded salted password hash.
        password_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Listed items.
    items (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Current owner; changes hands when a swap is approved.
        owner_id -> Uuid,
        name -> Varchar,
        description -> Text,
        category -> Varchar,
        /// Item location; `NULL` when neither the lister nor the owner gave one.
        location -> Nullable<Varchar>,
        /// Owner display name captured at listing or transfer time.
        owner_display_name -> Nullable<Varchar>,
        /// Owner location captured at listing or transfer time.
        owner_location -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Swap proposals and their outcomes.
    swaps (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Requested item.
        item1 -> Uuid,
        /// Offered item.
        item2 -> Uuid,
        /// Party holding the requested item.
        item1_user -> Uuid,
        /// Party holding the offered item.
        item2_user -> Uuid,
        /// One of `pending`, `approved`, `rejected`.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per item currently claimed by a pending swap.
    ///
    /// The primary key on `item_id` is what serialises concurrent proposals.
    pending_swap_items (item_id) {
        item_id -> Uuid,
        swap_id -> Uuid,
    }
}

diesel::joinable!(items -> users (owner_id));
diesel::joinable!(pending_swap_items -> swaps (swap_id));

diesel::allow_tables_to_appear_in_same_query!(users, items, swaps, pending_swap_items);
