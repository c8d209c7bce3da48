use utoipa::OpenApi;

use crate::errors::ErrorResponse;
use crate::handlers;
use crate::models::{Category, ItemRecord, Site, Store, SystemInfo, Transaction};
use crate::queries::{DashboardMetrics, ItemView, SiteComparison};
use crate::services::ledger::{
    AddStockRequest, DeletedItem, EditItemRequest, NewItemMeta, StockLevel, TransferOutcome,
    TransferRequest, UseStockRequest,
};
use crate::services::sites::{CreateSiteRequest, RemovedSite};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SiteStock API",
        description = r#"
Material inventory management for construction sites.

Each site carries its own inventory across three fixed categories
(materials, tools and accessories, machines). Every stock mutation is
recorded in an append-only transaction log, and the whole store is
persisted to a single JSON file after each successful operation.
"#
    ),
    paths(
        handlers::system::health,
        handlers::system::backup,
        handlers::system::restore,
        handlers::reports::dashboard,
        handlers::reports::list_transactions,
        handlers::sites::list_sites,
        handlers::sites::get_site,
        handlers::sites::create_site,
        handlers::sites::delete_site,
        handlers::inventory::list_items,
        handlers::inventory::add_stock,
        handlers::inventory::use_stock,
        handlers::inventory::edit_item,
        handlers::inventory::delete_item,
        handlers::transfers::create_transfer,
    ),
    components(schemas(
        Category,
        ItemRecord,
        Site,
        SystemInfo,
        Store,
        Transaction,
        ItemView,
        DashboardMetrics,
        SiteComparison,
        AddStockRequest,
        NewItemMeta,
        UseStockRequest,
        EditItemRequest,
        TransferRequest,
        TransferOutcome,
        StockLevel,
        DeletedItem,
        CreateSiteRequest,
        RemovedSite,
        ErrorResponse,
    )),
    tags(
        (name = "system", description = "Liveness, backup and restore"),
        (name = "reports", description = "Dashboard and transaction history"),
        (name = "sites", description = "Site management"),
        (name = "inventory", description = "Item-level stock operations"),
        (name = "transfers", description = "Inter-site stock transfers"),
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}
