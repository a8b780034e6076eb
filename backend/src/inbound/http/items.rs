//! Item listing handlers.
//!
//! ```text
//! POST   /api/v1/items          {"name":"Kettle","description":"Barely used","category":"kitchen"}
//! GET    /api/v1/items
//! GET    /api/v1/items/{id}
//! PATCH  /api/v1/items/{id}     {"category":"appliances"}
//! DELETE /api/v1/items/{id}
//! GET    /api/v1/users/{id}/items
//! ```
//!
//! All routes require a signed-in member; edits are owner-only.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Category, Error, Item, ItemDescription, ItemId, ItemName, ItemUpdate, ItemValidationError,
    Location, NewItem, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::map_user_validation_error;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, nothing_to_update_error, parse_uuid,
};

/// Request body for `POST /api/v1/items`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Defaults to the owner's location.
    pub location: Option<String>,
}

impl TryFrom<CreateItemRequest> for NewItem {
    type Error = Error;

    fn try_from(value: CreateItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: ItemName::new(&value.name).map_err(map_item_validation_error)?,
            description: ItemDescription::new(&value.description)
                .map_err(map_item_validation_error)?,
            category: Category::new(&value.category).map_err(map_item_validation_error)?,
            location: value
                .location
                .map(Location::new)
                .transpose()
                .map_err(map_user_validation_error)?,
        })
    }
}

/// Request body for `PATCH /api/v1/items/{id}`. Only these fields are editable.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    /// New title.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
}

impl TryFrom<UpdateItemRequest> for ItemUpdate {
    type Error = Error;

    fn try_from(value: UpdateItemRequest) -> Result<Self, Self::Error> {
        let update = Self {
            name: value
                .name
                .map(ItemName::new)
                .transpose()
                .map_err(map_item_validation_error)?,
            description: value
                .description
                .map(ItemDescription::new)
                .transpose()
                .map_err(map_item_validation_error)?,
            category: value
                .category
                .map(Category::new)
                .transpose()
                .map_err(map_item_validation_error)?,
        };
        if update.is_empty() {
            return Err(nothing_to_update_error(&["name", "description", "category"]));
        }
        Ok(update)
    }
}

/// A listed item with the owner snapshot taken when it last changed hands.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[schema(example = "7d5e1c9a-2f4b-4c3d-9e8f-0a1b2c3d4e5f")]
    pub id: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub owner_id: String,
    #[schema(example = "Kettle")]
    pub name: String,
    /// Free-text description.
    pub description: String,
    #[schema(example = "kitchen")]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Owner display name at the time of listing or transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// Owner location at the time of listing or transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_location: Option<String>,
    /// Listing time.
    pub created_at: DateTime<Utc>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        let snapshot = item.owner_snapshot();
        Self {
            id: item.id().to_string(),
            owner_id: item.owner_id().to_string(),
            name: item.name().to_string(),
            description: item.description().to_string(),
            category: item.category().to_string(),
            location: item.location().map(ToString::to_string),
            owner_name: snapshot.map(|s| s.display_name.to_string()),
            owner_location: snapshot.map(|s| s.location.to_string()),
            created_at: item.created_at(),
        }
    }
}

fn map_item_validation_error(err: ItemValidationError) -> Error {
    let message = err.to_string();
    let (field, code) = match err {
        ItemValidationError::InvalidId => ("id", ErrorCode::InvalidUuid),
        ItemValidationError::EmptyName => ("name", ErrorCode::MissingField),
        ItemValidationError::NameTooLong { .. } => ("name", ErrorCode::TooLong),
        ItemValidationError::EmptyDescription => ("description", ErrorCode::MissingField),
        ItemValidationError::DescriptionTooLong { .. } => ("description", ErrorCode::TooLong),
        ItemValidationError::EmptyCategory => ("category", ErrorCode::MissingField),
        ItemValidationError::CategoryTooLong { .. } => ("category", ErrorCode::TooLong),
    };
    field_error(FieldName::new(field), code, message)
}

pub(crate) fn parse_item_id(raw: &str, field: FieldName) -> Result<ItemId, Error> {
    parse_uuid(raw, field).map(ItemId::from_uuid)
}

fn items_response(items: Vec<Item>) -> web::Json<Vec<ItemResponse>> {
    web::Json(items.into_iter().map(ItemResponse::from).collect())
}

/// List a new item owned by the signed-in member.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Listed item", body = ItemResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "createItem"
)]
#[post("/items")]
pub async fn create_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateItemRequest>,
) -> ApiResult<web::Json<ItemResponse>> {
    let owner = session.require_user_id()?;
    let new_item = NewItem::try_from(payload.into_inner())?;
    let item = state.items.create_item(&owner, new_item).await?;
    Ok(web::Json(ItemResponse::from(item)))
}

/// Every listed item, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    responses(
        (status = 200, description = "Items", body = [ItemResponse]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "listItems"
)]
#[get("/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    session.require_user_id()?;
    Ok(items_response(state.items_query.list_items().await?))
}

/// A single item.
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item identifier")),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown item", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "getItem"
)]
#[get("/items/{id}")]
pub async fn get_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ItemResponse>> {
    session.require_user_id()?;
    let id = parse_item_id(&path.into_inner(), FieldName::new("id"))?;
    let item = state.items_query.get_item(&id).await?;
    Ok(web::Json(ItemResponse::from(item)))
}

/// Edit an item's name, description or category.
#[utoipa::path(
    patch,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item identifier")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ItemResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required or not the owner", body = ErrorSchema),
        (status = 404, description = "Unknown item", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "updateItem"
)]
#[patch("/items/{id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateItemRequest>,
) -> ApiResult<web::Json<ItemResponse>> {
    let caller = session.require_user_id()?;
    let id = parse_item_id(&path.into_inner(), FieldName::new("id"))?;
    let update = ItemUpdate::try_from(payload.into_inner())?;
    let item = state.items.update_item(&caller, &id, update).await?;
    Ok(web::Json(ItemResponse::from(item)))
}

/// Remove an item. Blocked while the item is part of a pending swap.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item identifier")),
    responses(
        (status = 200, description = "Item removed"),
        (status = 400, description = "Item is in a pending swap", body = ErrorSchema),
        (status = 401, description = "Login required or not the owner", body = ErrorSchema),
        (status = 404, description = "Unknown item", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "deleteItem"
)]
#[delete("/items/{id}")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_item_id(&path.into_inner(), FieldName::new("id"))?;
    state.items.delete_item(&caller, &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "msg": "item removed" })))
}

/// Items currently owned by a member, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/items",
    params(("id" = String, Path, description = "Member identifier")),
    responses(
        (status = 200, description = "Items", body = [ItemResponse]),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "listUserItems"
)]
#[get("/users/{id}/items")]
pub async fn list_user_items(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    session.require_user_id()?;
    let owner = parse_uuid(&path.into_inner(), FieldName::new("id")).map(UserId::from_uuid)?;
    Ok(items_response(
        state.items_query.list_items_for_owner(&owner).await?,
    ))
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
