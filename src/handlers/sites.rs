//! Site management endpoints.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::services::sites::{CreateSiteRequest, RemovedSite};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SiteView {
    pub name: String,
    pub location: String,
    pub site_manager: String,
    pub contact: String,
    pub project_type: String,
    pub total_items: usize,
    pub stock_value: Decimal,
}

impl SiteView {
    fn from_site(name: &str, site: &crate::models::Site) -> Self {
        SiteView {
            name: name.to_string(),
            location: site.location.clone(),
            site_manager: site.site_manager.clone(),
            contact: site.contact.clone(),
            project_type: site.project_type.clone(),
            total_items: site.item_count(),
            stock_value: site.stock_value(),
        }
    }
}

/// List all sites
#[utoipa::path(
    get,
    path = "/api/v1/sites",
    responses(
        (status = 200, description = "All sites",
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "sites"
)]
pub async fn list_sites(State(state): State<AppState>) -> ApiResult<Vec<SiteView>> {
    let store = state.store.read().await;
    let sites = store
        .sites
        .iter()
        .map(|(name, site)| SiteView::from_site(name, site))
        .collect();
    Ok(Json(ApiResponse::success(sites)))
}

/// Get one site
#[utoipa::path(
    get,
    path = "/api/v1/sites/{site}",
    params(("site" = String, Path, description = "Site name")),
    responses(
        (status = 200, description = "Site returned", body = SiteView),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "sites"
)]
pub async fn get_site(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> ApiResult<SiteView> {
    let store = state.store.read().await;
    let found = store.site(&site)?;
    Ok(Json(ApiResponse::success(SiteView::from_site(&site, found))))
}

/// Create a site with an empty inventory
#[utoipa::path(
    post,
    path = "/api/v1/sites",
    request_body = CreateSiteRequest,
    responses(
        (status = 201, description = "Site created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Site already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "sites"
)]
pub async fn create_site(
    State(state): State<AppState>,
    Json(payload): Json<CreateSiteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = payload.name.clone();
    state.sites.create_site(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(name))))
}

/// Remove a site and everything it contains
#[utoipa::path(
    delete,
    path = "/api/v1/sites/{site}",
    params(("site" = String, Path, description = "Site name")),
    responses(
        (status = 200, description = "Site removed", body = RemovedSite),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "sites"
)]
pub async fn delete_site(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> ApiResult<RemovedSite> {
    let removed = state.sites.remove_site(&site).await?;
    Ok(Json(ApiResponse::success(removed)))
}
