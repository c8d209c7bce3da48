//! Item-level endpoints: listing, receiving, consuming, editing, deleting.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::str::FromStr;

use crate::errors::ServiceError;
use crate::models::Category;
use crate::queries::{self, ItemFilter, ItemView};
use crate::services::ledger::{
    AddStockRequest, DeletedItem, EditItemRequest, StockLevel, UseStockRequest,
};
use crate::{ApiResponse, ApiResult, AppState};

/// Category path segments arrive as the wire names ("materials",
/// "tools and accessories", "machines"); anything else is a 400.
pub(crate) fn parse_category(raw: &str) -> Result<Category, ServiceError> {
    Category::from_str(raw)
        .map_err(|_| ServiceError::Validation(format!("unknown category '{}'", raw)))
}

/// List item records with optional filtering
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemFilter),
    responses(
        (status = 200, description = "Matching item records",
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<Vec<ItemView>> {
    let store = state.store.read().await;
    let items = queries::filter_items(&store, &filter);
    Ok(Json(ApiResponse::success(items)))
}

/// Receive stock into a site, creating the item when metadata is supplied
#[utoipa::path(
    post,
    path = "/api/v1/inventory/add",
    request_body = AddStockRequest,
    responses(
        (status = 200, description = "Existing item restocked", body = StockLevel),
        (status = 201, description = "New item created", body = StockLevel),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Site or item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn add_stock(
    State(state): State<AppState>,
    Json(payload): Json<AddStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = payload.new_item.is_some();
    let level = state.ledger.add_stock(payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(level))))
}

/// Consume stock against a work area
#[utoipa::path(
    post,
    path = "/api/v1/inventory/use",
    request_body = UseStockRequest,
    responses(
        (status = 200, description = "Stock consumed", body = StockLevel),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Site or item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn use_stock(
    State(state): State<AppState>,
    Json(payload): Json<UseStockRequest>,
) -> ApiResult<StockLevel> {
    let level = state.ledger.use_stock(payload).await?;
    Ok(Json(ApiResponse::success(level)))
}

/// Overwrite an item's fields
#[utoipa::path(
    put,
    path = "/api/v1/sites/{site}/items/{category}/{item}",
    params(
        ("site" = String, Path, description = "Site name"),
        ("category" = String, Path, description = "Category wire name"),
        ("item" = String, Path, description = "Item id")
    ),
    request_body = EditItemRequest,
    responses(
        (status = 200, description = "Item updated", body = StockLevel),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn edit_item(
    State(state): State<AppState>,
    Path((site, category, item)): Path<(String, String, String)>,
    Json(payload): Json<EditItemRequest>,
) -> ApiResult<StockLevel> {
    let category = parse_category(&category)?;
    let level = state.ledger.edit_item(&site, category, &item, payload).await?;
    Ok(Json(ApiResponse::success(level)))
}

/// Delete an item record
#[utoipa::path(
    delete,
    path = "/api/v1/sites/{site}/items/{category}/{item}",
    params(
        ("site" = String, Path, description = "Site name"),
        ("category" = String, Path, description = "Category wire name"),
        ("item" = String, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item deleted", body = DeletedItem),
        (status = 400, description = "Invalid category", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((site, category, item)): Path<(String, String, String)>,
) -> ApiResult<DeletedItem> {
    let category = parse_category(&category)?;
    let deleted = state.ledger.delete_item(&site, category, &item).await?;
    Ok(Json(ApiResponse::success(deleted)))
}
