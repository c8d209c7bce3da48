//! SiteStock API Library
//!
//! Material inventory management for construction sites: per-site stock
//! across three fixed categories, an append-only transaction log, and
//! whole-store JSON persistence.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod persistence;
pub mod queries;
pub mod services;
pub mod store;
pub mod tracing;

use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::models::Store;
use crate::persistence::StoreGateway;
use crate::services::ledger::LedgerService;
use crate::services::sites::SiteService;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub store: Arc<RwLock<Store>>,
    pub gateway: Arc<StoreGateway>,
    pub ledger: LedgerService,
    pub sites: SiteService,
}

impl AppState {
    pub fn new(config: config::AppConfig, store: Store, gateway: StoreGateway) -> Self {
        let store = Arc::new(RwLock::new(store));
        let gateway = Arc::new(gateway);
        Self {
            config,
            ledger: LedgerService::new(store.clone(), gateway.clone()),
            sites: SiteService::new(store.clone(), gateway.clone()),
            store,
            gateway,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::reports::dashboard))
        .route("/transactions", get(handlers::reports::list_transactions))
        .route(
            "/sites",
            get(handlers::sites::list_sites).post(handlers::sites::create_site),
        )
        .route(
            "/sites/:site",
            get(handlers::sites::get_site).delete(handlers::sites::delete_site),
        )
        .route("/items", get(handlers::inventory::list_items))
        .route("/inventory/add", post(handlers::inventory::add_stock))
        .route("/inventory/use", post(handlers::inventory::use_stock))
        .route(
            "/sites/:site/items/:category/:item",
            put(handlers::inventory::edit_item).delete(handlers::inventory::delete_item),
        )
        .route("/transfers", post(handlers::transfers::create_transfer))
        .route("/backup", get(handlers::system::backup))
        .route("/restore", post(handlers::system::restore))
}

/// Full application router: health, v1 API, OpenAPI document, tracing and
/// request-id plumbing. CORS is layered on top by the binary since it is
/// environment dependent.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::system::health))
        .nest("/api/v1", api_v1_routes())
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(tracing::request_id_middleware))
        .with_state(state)
}
