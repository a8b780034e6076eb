//! Swap proposals and their lifecycle.
//!
//! A swap offers `item2` (owned by the proposer) in exchange for `item1`
//! (owned by someone else). It starts `pending` and moves exactly once to
//! `approved` or `rejected`. While pending, neither item may take part in
//! any other pending swap.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Item, ItemId, UserId};

/// Stable swap identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SwapId(Uuid);

/// Error raised when a swap id is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("swap id must be a valid UUID")]
pub struct InvalidSwapId;

impl SwapId {
    /// Validate and construct a [`SwapId`] from textual input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, InvalidSwapId> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| InvalidSwapId)
    }

    /// Wrap a UUID loaded from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`SwapId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SwapId> for String {
    fn from(value: SwapId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for SwapId {
    type Error = InvalidSwapId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lifecycle status of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    /// Open and awaiting a decision.
    Pending,
    /// Accepted; the items changed hands.
    Approved,
    /// Declined by the owner of the wanted item.
    Rejected,
}

impl SwapStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the status is terminal.
    pub const fn is_closed(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown swap status: {0}")]
pub struct ParseSwapStatusError(pub String);

impl FromStr for SwapStatus {
    type Err = ParseSwapStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ParseSwapStatusError(other.to_owned())),
        }
    }
}

/// Outcome chosen by the owner of `item1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapDecision {
    Approved,
    Rejected,
}

/// Error raised when a decision cannot be derived from the supplied flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SwapDecisionError {
    #[error("a swap cannot be both approved and rejected")]
    Conflicting,
    #[error("a decision of approved or rejected is required")]
    Missing,
}

impl SwapDecision {
    /// Derive a decision from the legacy `approved`/`rejected` flag pair.
    ///
    /// Exactly one flag must be `true`.
    ///
    /// # Examples
    /// ```
    /// use barter::domain::{SwapDecision, SwapDecisionError};
    ///
    /// assert_eq!(SwapDecision::from_flags(true, false), Ok(SwapDecision::Approved));
    /// assert_eq!(SwapDecision::from_flags(true, true), Err(SwapDecisionError::Conflicting));
    /// ```
    pub fn from_flags(approved: bool, rejected: bool) -> Result<Self, SwapDecisionError> {
        match (approved, rejected) {
            (true, false) => Ok(Self::Approved),
            (false, true) => Ok(Self::Rejected),
            (true, true) => Err(SwapDecisionError::Conflicting),
            (false, false) => Err(SwapDecisionError::Missing),
        }
    }

    /// Terminal status reached by this decision.
    pub const fn status(self) -> SwapStatus {
        match self {
            Self::Approved => SwapStatus::Approved,
            Self::Rejected => SwapStatus::Rejected,
        }
    }
}

/// Error raised by lifecycle transitions on a closed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("swap already closed")]
pub struct SwapClosed;

/// Input payload for [`Swap::new`].
#[derive(Debug, Clone)]
pub struct SwapDraft {
    /// Swap identifier.
    pub id: SwapId,
    /// Wanted item.
    pub item1: ItemId,
    /// Offered item.
    pub item2: ItemId,
    /// Owner of the wanted item.
    pub item1_user: UserId,
    /// Owner of the offered item.
    pub item2_user: UserId,
    /// Lifecycle status.
    pub status: SwapStatus,
    /// Proposal time.
    pub created_at: DateTime<Utc>,
}

/// A swap proposal between two items.
///
/// `item1_user` and `item2_user` name the current parties. They are copied
/// from the item owners at proposal time and exchanged on approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    id: SwapId,
    item1: ItemId,
    item2: ItemId,
    item1_user: UserId,
    item2_user: UserId,
    status: SwapStatus,
    created_at: DateTime<Utc>,
}

impl Swap {
    /// Assemble a swap from stored parts.
    pub fn new(draft: SwapDraft) -> Self {
        let SwapDraft {
            id,
            item1,
            item2,
            item1_user,
            item2_user,
            status,
            created_at,
        } = draft;
        Self {
            id,
            item1,
            item2,
            item1_user,
            item2_user,
            status,
            created_at,
        }
    }

    /// Open a pending swap offering `item2` for `item1`.
    ///
    /// Party fields are taken from the items' current owners.
    pub fn propose(id: SwapId, item1: &Item, item2: &Item, now: DateTime<Utc>) -> Self {
        Self {
            id,
            item1: *item1.id(),
            item2: *item2.id(),
            item1_user: *item1.owner_id(),
            item2_user: *item2.owner_id(),
            status: SwapStatus::Pending,
            created_at: now,
        }
    }

    /// Swap identifier.
    pub fn id(&self) -> &SwapId {
        &self.id
    }

    /// Item the proposer wants to receive.
    pub fn item1(&self) -> &ItemId {
        &self.item1
    }

    /// Item the proposer offers.
    pub fn item2(&self) -> &ItemId {
        &self.item2
    }

    /// Party allowed to approve or reject.
    pub fn item1_user(&self) -> &UserId {
        &self.item1_user
    }

    /// Party allowed to withdraw.
    pub fn item2_user(&self) -> &UserId {
        &self.item2_user
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SwapStatus {
        self.status
    }

    /// When the swap was proposed.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the swap still awaits a decision.
    pub fn is_pending(&self) -> bool {
        self.status == SwapStatus::Pending
    }

    /// Whether `user` is one of the two parties.
    pub fn involves_user(&self, user: &UserId) -> bool {
        &self.item1_user == user || &self.item2_user == user
    }

    /// Whether `item` participates in this swap on either side.
    pub fn involves_item(&self, item: &ItemId) -> bool {
        &self.item1 == item || &self.item2 == item
    }

    /// Whether a new proposal over `item1`/`item2` would overlap this swap.
    ///
    /// Checks all four cross combinations of participants.
    pub fn overlaps(&self, item1: &ItemId, item2: &ItemId) -> bool {
        self.involves_item(item1) || self.involves_item(item2)
    }

    /// Close the swap with `decision`.
    ///
    /// Approval exchanges the party fields so that `item1_user` names the
    /// new owner of `item1`.
    pub fn resolve(self, decision: SwapDecision) -> Result<Self, SwapClosed> {
        if !self.is_pending() {
            return Err(SwapClosed);
        }
        let swap = match decision {
            SwapDecision::Approved => Self {
                item1_user: self.item2_user,
                item2_user: self.item1_user,
                status: SwapStatus::Approved,
                ..self
            },
            SwapDecision::Rejected => Self {
                status: SwapStatus::Rejected,
                ..self
            },
        };
        Ok(swap)
    }
}

/// Find the first pending swap that overlaps a proposal over
/// `item1`/`item2`.
pub fn find_conflict<'a, I>(swaps: I, item1: &ItemId, item2: &ItemId) -> Option<&'a Swap>
where
    I: IntoIterator<Item = &'a Swap>,
{
    swaps
        .into_iter()
        .find(|swap| swap.is_pending() && swap.overlaps(item1, item2))
}
