//! Swap negotiation handlers.
//!
//! ```text
//! POST   /api/v1/swaps       {"item1":"<wanted item>","item2":"<offered item>"}
//! GET    /api/v1/swaps
//! PATCH  /api/v1/swaps/{id}  {"status":"approved"}  or  {"approved":true,"rejected":false}
//! DELETE /api/v1/swaps/{id}
//! ```
//!
//! The caller proposes by offering their own `item2` for someone else's
//! `item1`. Only the owner of `item1` may decide; only the proposer may
//! withdraw, and only while the swap is pending.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::ProposeSwapRequest;
use crate::domain::{Error, Swap, SwapDecision, SwapId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::items::parse_item_id;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, missing_field_error, parse_uuid,
};

/// Request body for `POST /api/v1/swaps`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapRequest {
    /// Item the caller wants.
    #[schema(example = "7d5e1c9a-2f4b-4c3d-9e8f-0a1b2c3d4e5f")]
    pub item1: Option<String>,
    /// Item the caller offers; must belong to the caller.
    #[schema(example = "0b9c8d7e-6f5a-4b3c-8d2e-1f0a9b8c7d6e")]
    pub item2: Option<String>,
}

/// Request body for `PATCH /api/v1/swaps/{id}`.
///
/// Either `status` or the `approved`/`rejected` flag pair. When both forms
/// are sent they must agree.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSwapRequest {
    /// `approved` or `rejected`.
    #[schema(example = "approved")]
    pub status: Option<String>,
    /// Approve the swap.
    pub approved: Option<bool>,
    /// Reject the swap.
    pub rejected: Option<bool>,
}

impl TryFrom<ResolveSwapRequest> for SwapDecision {
    type Error = Error;

    fn try_from(value: ResolveSwapRequest) -> Result<Self, Self::Error> {
        let from_status = value.status.as_deref().map(parse_decision).transpose()?;
        let from_flags = if value.approved.is_some() || value.rejected.is_some() {
            let decision = SwapDecision::from_flags(
                value.approved.unwrap_or(false),
                value.rejected.unwrap_or(false),
            )
            .map_err(|err| {
                field_error(FieldName::new("approved"), ErrorCode::InvalidValue, err.to_string())
            })?;
            Some(decision)
        } else {
            None
        };

        match (from_status, from_flags) {
            (Some(status), Some(flags)) if status != flags => Err(field_error(
                FieldName::new("status"),
                ErrorCode::InvalidValue,
                "status disagrees with the approved/rejected flags",
            )),
            (Some(decision), _) | (None, Some(decision)) => Ok(decision),
            (None, None) => Err(missing_field_error(FieldName::new("status"))),
        }
    }
}

fn parse_decision(raw: &str) -> Result<SwapDecision, Error> {
    match raw {
        "approved" => Ok(SwapDecision::Approved),
        "rejected" => Ok(SwapDecision::Rejected),
        _ => Err(field_error(
            FieldName::new("status"),
            ErrorCode::InvalidValue,
            "status must be approved or rejected",
        )),
    }
}

/// A swap record. `item1User`/`item2User` are the current parties; they
/// trade places when the swap is approved.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Swap identifier.
    pub id: String,
    /// Wanted item.
    pub item1: String,
    /// Offered item.
    pub item2: String,
    /// Party holding the wanted item before approval.
    pub item1_user: String,
    /// Party holding the offered item before approval.
    pub item2_user: String,
    /// `pending`, `approved` or `rejected`.
    #[schema(example = "pending")]
    pub status: String,
    /// Proposal time.
    pub created_at: DateTime<Utc>,
}

impl From<Swap> for SwapResponse {
    fn from(swap: Swap) -> Self {
        Self {
            id: swap.id().to_string(),
            item1: swap.item1().to_string(),
            item2: swap.item2().to_string(),
            item1_user: swap.item1_user().to_string(),
            item2_user: swap.item2_user().to_string(),
            status: swap.status().as_str().to_owned(),
            created_at: swap.created_at(),
        }
    }
}

fn parse_swap_id(raw: &str) -> Result<SwapId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(SwapId::from_uuid)
}

fn required_item(raw: Option<String>, field: &'static str) -> Result<String, Error> {
    raw.filter(|value| !value.trim().is_empty())
        .ok_or_else(|| missing_field_error(FieldName::new(field)))
}

/// Offer one of the caller's items for someone else's.
#[utoipa::path(
    post,
    path = "/api/v1/swaps",
    request_body = CreateSwapRequest,
    responses(
        (status = 200, description = "Pending swap", body = SwapResponse),
        (status = 400, description = "Invalid request or item already in a pending swap", body = ErrorSchema),
        (status = 401, description = "Login required or offered item not owned", body = ErrorSchema),
        (status = 404, description = "Unknown item", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "proposeSwap"
)]
#[post("/swaps")]
pub async fn propose_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateSwapRequest>,
) -> ApiResult<web::Json<SwapResponse>> {
    let proposer = session.require_user_id()?;
    let CreateSwapRequest { item1, item2 } = payload.into_inner();
    let item1 = parse_item_id(&required_item(item1, "item1")?, FieldName::new("item1"))?;
    let item2 = parse_item_id(&required_item(item2, "item2")?, FieldName::new("item2"))?;

    let swap = state
        .swaps
        .propose(ProposeSwapRequest {
            proposer,
            item1,
            item2,
        })
        .await?;
    Ok(web::Json(SwapResponse::from(swap)))
}

/// Swaps the caller takes part in, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/swaps",
    responses(
        (status = 200, description = "Swaps", body = [SwapResponse]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "listSwaps"
)]
#[get("/swaps")]
pub async fn list_swaps(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<SwapResponse>>> {
    let user = session.require_user_id()?;
    let swaps = state.swaps_query.list_for_user(&user).await?;
    Ok(web::Json(swaps.into_iter().map(SwapResponse::from).collect()))
}

/// Approve or reject a pending swap. Approval trades the two items.
#[utoipa::path(
    patch,
    path = "/api/v1/swaps/{id}",
    params(("id" = String, Path, description = "Swap identifier")),
    request_body = ResolveSwapRequest,
    responses(
        (status = 200, description = "Resolved swap", body = SwapResponse),
        (status = 400, description = "Invalid update", body = ErrorSchema),
        (status = 401, description = "Not the deciding party or swap already closed", body = ErrorSchema),
        (status = 404, description = "Unknown swap", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "resolveSwap"
)]
#[patch("/swaps/{id}")]
pub async fn resolve_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ResolveSwapRequest>,
) -> ApiResult<web::Json<SwapResponse>> {
    let caller = session.require_user_id()?;
    let id = parse_swap_id(&path.into_inner())?;
    let decision = SwapDecision::try_from(payload.into_inner())?;
    let swap = state.swaps.resolve(&caller, &id, decision).await?;
    Ok(web::Json(SwapResponse::from(swap)))
}

/// Withdraw a pending proposal.
#[utoipa::path(
    delete,
    path = "/api/v1/swaps/{id}",
    params(("id" = String, Path, description = "Swap identifier")),
    responses(
        (status = 200, description = "Swap removed"),
        (status = 401, description = "Not the proposer or swap already closed", body = ErrorSchema),
        (status = 404, description = "Unknown swap", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "withdrawSwap"
)]
#[delete("/swaps/{id}")]
pub async fn withdraw_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_swap_id(&path.into_inner())?;
    state.swaps.withdraw(&caller, &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "msg": "swap removed" })))
}

#[cfg(test)]
#[path = "swaps_tests.rs"]
mod tests;
