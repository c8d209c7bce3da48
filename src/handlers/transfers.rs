//! Inter-site transfer endpoint.

use axum::extract::{Json, State};

use crate::services::ledger::{TransferOutcome, TransferRequest};
use crate::{ApiResponse, ApiResult, AppState};

/// Move stock between two sites in one atomic operation
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer completed", body = TransferOutcome),
        (status = 400, description = "Invalid request or same-site transfer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Site or item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock at source", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> ApiResult<TransferOutcome> {
    let outcome = state.ledger.transfer_stock(payload).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
