//! Read-only reporting endpoints.

use axum::extract::{Json, Query, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::Transaction;
use crate::queries::{self, DashboardMetrics, SiteComparison};
use crate::{ApiResponse, ApiResult, AppState};

const DEFAULT_TRANSACTION_LIMIT: usize = 50;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub metrics: DashboardMetrics,
    pub sites: Vec<SiteComparison>,
}

/// Dashboard metrics and per-site comparison
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardResponse> {
    let store = state.store.read().await;
    Ok(Json(ApiResponse::success(DashboardResponse {
        metrics: queries::dashboard_metrics(&store),
        sites: queries::site_comparison(&store),
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionQuery {
    /// Keep only transactions touching this site (transfers match either end).
    pub site: Option<String>,
    /// Maximum number of transactions to return, newest first.
    pub limit: Option<usize>,
}

/// Recent transactions, newest first
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transaction history"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult<Vec<Transaction>> {
    let store = state.store.read().await;
    let transactions = queries::recent_transactions(
        &store,
        query.site.as_deref(),
        query.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT),
    );
    Ok(Json(ApiResponse::success(transactions)))
}
