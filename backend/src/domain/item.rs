//! Listed items and their owner snapshots.
//!
//! Every item has exactly one owner. The owner's display name and location
//! are copied into an [`OwnerSnapshot`] when the item is listed and again
//! when a swap hands the item to a new owner. The snapshot never follows
//! later profile edits; readers wanting live profile data must look the
//! owner up.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DisplayName, Location, User, UserId};

/// Maximum length of an item name.
pub const ITEM_NAME_MAX: usize = 100;
/// Maximum length of an item description.
pub const ITEM_DESCRIPTION_MAX: usize = 2000;
/// Maximum length of an item category.
pub const CATEGORY_MAX: usize = 50;

/// Validation errors raised by item value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
    EmptyDescription,
    DescriptionTooLong { max: usize },
    EmptyCategory,
    CategoryTooLong { max: usize },
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "item id must be a valid UUID"),
            Self::EmptyName => write!(f, "name is required"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyDescription => write!(f, "description is required"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::EmptyCategory => write!(f, "category is required"),
            Self::CategoryTooLong { max } => {
                write!(f, "category must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ItemValidationError {}

/// Stable item identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(Uuid);

impl ItemId {
    /// Validate and construct an [`ItemId`] from textual input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ItemValidationError::InvalidId)
    }

    /// Wrap a UUID loaded from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`ItemId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Declares a trimmed, length-bounded text newtype.
macro_rules! bounded_text {
    ($(#[$meta:meta])* $name:ident, $max:expr, $empty:ident, $too_long:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the value; surrounding whitespace is
            /// trimmed.
            pub fn new(value: impl AsRef<str>) -> Result<Self, ItemValidationError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(ItemValidationError::$empty);
                }
                if trimmed.chars().count() > $max {
                    return Err(ItemValidationError::$too_long { max: $max });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }
    };
}

bounded_text!(
    /// Short title of a listed item.
    ItemName,
    ITEM_NAME_MAX,
    EmptyName,
    NameTooLong
);
bounded_text!(
    /// Free-text description of a listed item.
    ItemDescription,
    ITEM_DESCRIPTION_MAX,
    EmptyDescription,
    DescriptionTooLong
);
bounded_text!(
    /// Category label, e.g. "books" or "tools".
    Category,
    CATEGORY_MAX,
    EmptyCategory,
    CategoryTooLong
);

/// Copy of the owner's public profile taken when the item changed hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSnapshot {
    /// Owner's display name at snapshot time.
    pub display_name: DisplayName,
    /// Owner's location at snapshot time.
    pub location: Location,
}

impl OwnerSnapshot {
    /// Capture the current public profile of `owner`.
    pub fn of(owner: &User) -> Self {
        Self {
            display_name: owner.display_name().clone(),
            location: owner.location().clone(),
        }
    }
}

/// Owner-submitted fields for a new listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Listing title.
    pub name: ItemName,
    /// Free-text description.
    pub description: ItemDescription,
    /// Category label.
    pub category: Category,
    /// Pickup location; the owner's location when absent.
    pub location: Option<Location>,
}

/// Whitelisted fields an owner may edit after listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemUpdate {
    /// Replacement title.
    pub name: Option<ItemName>,
    /// Replacement description.
    pub description: Option<ItemDescription>,
    /// Replacement category.
    pub category: Option<Category>,
}

impl ItemUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.category.is_none()
    }
}

/// Input payload for [`Item::new`].
#[derive(Debug, Clone)]
pub struct ItemDraft {
    /// Item identifier.
    pub id: ItemId,
    /// Current owner.
    pub owner_id: UserId,
    /// Listing title.
    pub name: ItemName,
    /// Free-text description.
    pub description: ItemDescription,
    /// Category label.
    pub category: Category,
    /// Pickup location.
    pub location: Option<Location>,
    /// Owner profile captured at the last ownership change.
    pub owner_snapshot: Option<OwnerSnapshot>,
    /// Listing time.
    pub created_at: DateTime<Utc>,
}

/// A listed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    owner_id: UserId,
    name: ItemName,
    description: ItemDescription,
    category: Category,
    location: Option<Location>,
    owner_snapshot: Option<OwnerSnapshot>,
    created_at: DateTime<Utc>,
}

impl Item {
    /// Assemble an item from validated parts.
    pub fn new(draft: ItemDraft) -> Self {
        let ItemDraft {
            id,
            owner_id,
            name,
            description,
            category,
            location,
            owner_snapshot,
            created_at,
        } = draft;
        Self {
            id,
            owner_id,
            name,
            description,
            category,
            location,
            owner_snapshot,
            created_at,
        }
    }

    /// List `new_item` on behalf of `owner`.
    ///
    /// The item location falls back to the owner's location when omitted.
    pub fn listed_by(owner: &User, new_item: NewItem, id: ItemId, now: DateTime<Utc>) -> Self {
        let NewItem {
            name,
            description,
            category,
            location,
        } = new_item;
        Self {
            id,
            owner_id: *owner.id(),
            name,
            description,
            category,
            location: location.or_else(|| Some(owner.location().clone())),
            owner_snapshot: Some(OwnerSnapshot::of(owner)),
            created_at: now,
        }
    }

    /// Item identifier.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Current owner.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Listing title.
    pub fn name(&self) -> &ItemName {
        &self.name
    }

    /// Free-text description.
    pub fn description(&self) -> &ItemDescription {
        &self.description
    }

    /// Category label.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Pickup location, if any.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Owner profile as it was when the item last changed hands.
    pub fn owner_snapshot(&self) -> Option<&OwnerSnapshot> {
        self.owner_snapshot.as_ref()
    }

    /// Listing time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `user` currently owns this item.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Apply a whitelisted edit.
    #[must_use]
    pub fn with_update(self, update: ItemUpdate) -> Self {
        let ItemUpdate {
            name,
            description,
            category,
        } = update;
        Self {
            name: name.unwrap_or(self.name),
            description: description.unwrap_or(self.description),
            category: category.unwrap_or(self.category),
            ..self
        }
    }

    /// Copy the editable details of `edited`, keeping this item's owner.
    #[must_use]
    pub fn with_details_of(self, edited: &Item) -> Self {
        Self {
            name: edited.name.clone(),
            description: edited.description.clone(),
            category: edited.category.clone(),
            ..self
        }
    }

    /// Copy the owner and owner snapshot of `moved`, keeping this item's
    /// details.
    #[must_use]
    pub fn with_owner_of(self, moved: &Item) -> Self {
        Self {
            owner_id: moved.owner_id,
            owner_snapshot: moved.owner_snapshot.clone(),
            ..self
        }
    }

    /// Hand the item to `new_owner`, re-capturing the owner snapshot.
    #[must_use]
    pub fn transferred_to(self, new_owner: &User) -> Self {
        Self {
            owner_id: *new_owner.id(),
            owner_snapshot: Some(OwnerSnapshot::of(new_owner)),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::{fixture, rstest};

    fn user(name: &str, location: &str) -> User {
        User::new(
            UserId::random(),
            DisplayName::new(name).expect("name"),
            EmailAddress::new(format!("{}@example.org", name.to_lowercase())).expect("email"),
            Location::new(location).expect("location"),
            Utc::now(),
        )
    }

    #[fixture]
    fn new_item() -> NewItem {
        NewItem {
            name: ItemName::new("Bicycle").expect("name"),
            description: ItemDescription::new("Blue, 21 gears").expect("description"),
            category: Category::new("sport").expect("category"),
            location: None,
        }
    }

    #[rstest]
    #[case(ItemName::new("  ").map(|_| ()), ItemValidationError::EmptyName)]
    #[case(
        ItemName::new("x".repeat(ITEM_NAME_MAX + 1)).map(|_| ()),
        ItemValidationError::NameTooLong { max: ITEM_NAME_MAX }
    )]
    #[case(ItemDescription::new("").map(|_| ()), ItemValidationError::EmptyDescription)]
    #[case(
        Category::new("c".repeat(CATEGORY_MAX + 1)).map(|_| ()),
        ItemValidationError::CategoryTooLong { max: CATEGORY_MAX }
    )]
    fn bounded_text_rejects_invalid_values(
        #[case] result: Result<(), ItemValidationError>,
        #[case] expected: ItemValidationError,
    ) {
        assert_eq!(result.expect_err("invalid value"), expected);
    }

    #[rstest]
    fn listing_snapshots_owner_and_defaults_location(new_item: NewItem) {
        let owner = user("Ada", "London");
        let item = Item::listed_by(&owner, new_item, ItemId::random(), Utc::now());

        assert!(item.is_owned_by(owner.id()));
        assert_eq!(item.location().map(AsRef::as_ref), Some("London"));
        let snapshot = item.owner_snapshot().expect("snapshot taken");
        assert_eq!(snapshot.display_name.as_ref(), "Ada");
    }

    #[rstest]
    fn explicit_location_wins_over_owner_location(mut new_item: NewItem) {
        new_item.location = Some(Location::new("Leeds").expect("location"));
        let owner = user("Ada", "London");
        let item = Item::listed_by(&owner, new_item, ItemId::random(), Utc::now());
        assert_eq!(item.location().map(AsRef::as_ref), Some("Leeds"));
    }

    #[rstest]
    fn snapshot_ignores_later_profile_edits(new_item: NewItem) {
        let owner = user("Ada", "London");
        let item = Item::listed_by(&owner, new_item, ItemId::random(), Utc::now());
        let _edited = owner.with_profile(crate::domain::ProfileUpdate {
            display_name: Some(DisplayName::new("Countess").expect("name")),
            location: None,
        });
        let snapshot = item.owner_snapshot().expect("snapshot taken");
        assert_eq!(snapshot.display_name.as_ref(), "Ada");
    }

    #[rstest]
    fn transfer_updates_owner_and_snapshot(new_item: NewItem) {
        let ada = user("Ada", "London");
        let bob = user("Bob", "Paris");
        let item = Item::listed_by(&ada, new_item, ItemId::random(), Utc::now());
        let location_before = item.location().cloned();

        let moved = item.transferred_to(&bob);

        assert!(moved.is_owned_by(bob.id()));
        assert_eq!(
            moved.owner_snapshot().map(|s| s.display_name.as_ref()),
            Some("Bob")
        );
        assert_eq!(moved.location().cloned(), location_before);
    }

    #[rstest]
    fn update_only_touches_supplied_fields(new_item: NewItem) {
        let owner = user("Ada", "London");
        let item = Item::listed_by(&owner, new_item, ItemId::random(), Utc::now());
        let updated = item.clone().with_update(ItemUpdate {
            category: Some(Category::new("outdoors").expect("category")),
            ..ItemUpdate::default()
        });
        assert_eq!(updated.name(), item.name());
        assert_eq!(updated.category().as_ref(), "outdoors");
        assert!(ItemUpdate::default().is_empty());
    }
}
