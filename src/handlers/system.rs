//! Liveness, backup and restore endpoints.

use axum::extract::{Json, State};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use strum::IntoEnumIterator;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::models::{Category, Store};
use crate::{ApiResponse, ApiResult, AppState};

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let store = state.store.read().await;
    Ok(Json(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sites": store.sites.len(),
        "last_updated": store.system_info.last_updated,
    }))))
}

/// Full-store JSON dump, suitable for re-import via restore
#[utoipa::path(
    get,
    path = "/api/v1/backup",
    responses(
        (status = 200, description = "Complete store snapshot", body = Store),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "system"
)]
pub async fn backup(State(state): State<AppState>) -> Result<Json<Store>, ServiceError> {
    let store = state.store.read().await;
    Ok(Json(store.clone()))
}

/// Replace the entire store with an uploaded snapshot
#[utoipa::path(
    post,
    path = "/api/v1/restore",
    request_body = Store,
    responses(
        (status = 200, description = "Store restored"),
        (status = 400, description = "Malformed snapshot", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "system"
)]
#[instrument(skip(state, snapshot))]
pub async fn restore(
    State(state): State<AppState>,
    Json(mut snapshot): Json<Store>,
) -> ApiResult<Value> {
    check_snapshot(&snapshot)?;
    snapshot.touch();

    let mut guard = state.store.write().await;
    state.gateway.save(&snapshot).await?;
    *guard = snapshot;

    info!(sites = guard.sites.len(), "store restored from snapshot");
    Ok(Json(ApiResponse::success(json!({
        "restored_sites": guard.sites.len(),
        "restored_transactions": guard.transactions.len(),
    }))))
}

/// A snapshot must only contain quantities the ledger itself could have
/// produced: negative stock or usage is rejected before anything is swapped.
fn check_snapshot(snapshot: &Store) -> Result<(), ServiceError> {
    for (site_name, site) in &snapshot.sites {
        for category in Category::iter() {
            for (item_id, record) in site.items(category) {
                if record.stock < Decimal::ZERO || record.used < Decimal::ZERO {
                    return Err(ServiceError::Validation(format!(
                        "snapshot item '{}' in {} at '{}' has negative stock or used",
                        item_id, category, site_name
                    )));
                }
            }
        }
    }
    Ok(())
}
