//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed marketplace entities and the use-cases
//! that operate on them, independent of HTTP or storage. Inbound adapters
//! drive the services through the traits in [`ports`]; outbound adapters
//! implement the repository traits.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport agnostic failure payload.
//! - [`User`], [`Item`], [`Swap`] and their value types.
//! - [`UserAccountService`], [`ItemService`], [`SwapService`]: use-cases.

pub mod access;
pub mod auth;
pub mod error;
pub mod item;
pub mod item_service;
pub mod ports;
pub mod swap;
pub mod swap_service;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::auth::{
    CredentialsValidationError, LoginCredentials, NewPassword, PASSWORD_MIN_LEN, PasswordHash,
    RegistrationDraft, UserAccount,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::item::{
    Category, Item, ItemDescription, ItemDraft, ItemId, ItemName, ItemUpdate,
    ItemValidationError, NewItem, OwnerSnapshot,
};
pub use self::item_service::ItemService;
pub use self::swap::{
    InvalidSwapId, ParseSwapStatusError, Swap, SwapClosed, SwapDecision, SwapDecisionError,
    SwapDraft, SwapId, SwapStatus, find_conflict,
};
pub use self::swap_service::SwapService;
pub use self::trace_id::TraceId;
pub use self::user::{
    DisplayName, EmailAddress, Location, ProfileUpdate, User, UserId, UserValidationError,
};
pub use self::user_account_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use barter::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
