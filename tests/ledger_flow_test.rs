//! End-to-end ledger flows against a real temp-file gateway.

use std::time::Duration;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use sitestock_api::errors::ServiceError;
use sitestock_api::models::{Category, TransactionKind};
use sitestock_api::persistence::StoreGateway;
use sitestock_api::services::ledger::{
    AddStockRequest, EditItemRequest, NewItemMeta, TransferRequest, UseStockRequest,
};
use sitestock_api::services::sites::CreateSiteRequest;
use sitestock_api::AppState;

const LNT: &str = "L&T Site";
const KARLE: &str = "Karle Construction Site";

fn test_config() -> sitestock_api::config::AppConfig {
    sitestock_api::config::AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        environment: "development".into(),
        log_level: "info".into(),
        log_json: false,
        data_file: "unused".into(),
        save_timeout_secs: 5,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
    }
}

async fn seeded_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let gateway = StoreGateway::new(dir.path().join("store.json"), Duration::from_secs(5));
    let store = gateway.load().await.unwrap();
    (AppState::new(test_config(), store, gateway), dir)
}

fn use_putty(quantity: rust_decimal::Decimal) -> UseStockRequest {
    UseStockRequest {
        site: LNT.into(),
        category: Category::Materials,
        item: "asian_fine_putty".into(),
        quantity,
        work_area: "Block A".into(),
        supervisor: "Anil".into(),
        purpose: String::new(),
    }
}

#[tokio::test]
async fn use_stock_then_reject_overdraw() {
    let (state, _dir) = seeded_state().await;

    let level = state.ledger.use_stock(use_putty(dec!(15))).await.unwrap();
    assert_eq!(level.stock, dec!(25));
    assert_eq!(level.used, dec!(15));

    let err = state.ledger.use_stock(use_putty(dec!(30))).await.unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // The failed attempt mutated nothing in memory or on disk.
    let store = state.store.read().await;
    let record = store.item(LNT, Category::Materials, "asian_fine_putty").unwrap();
    assert_eq!(record.stock, dec!(25));
    assert_eq!(record.used, dec!(15));
    assert_eq!(store.transactions.len(), 1);

    let reloaded = state.gateway.load().await.unwrap();
    assert_eq!(reloaded, *store);
}

#[tokio::test]
async fn transfer_clones_metadata_into_new_destination_record() {
    let (state, _dir) = seeded_state().await;

    let outcome = state
        .ledger
        .transfer_stock(TransferRequest {
            from_site: KARLE.into(),
            to_site: LNT.into(),
            category: Category::Materials,
            item: "jk_levelmaxx_putty".into(),
            quantity: dec!(10),
            authorized_by: "PM".into(),
            driver_name: "Ravi".into(),
            vehicle_number: "KA-01-AB-1234".into(),
        })
        .await
        .unwrap();

    assert_eq!(outcome.from_stock, dec!(3590));
    assert_eq!(outcome.to_stock, dec!(10));

    let store = state.store.read().await;
    let source = store.item(KARLE, Category::Materials, "jk_levelmaxx_putty").unwrap();
    let dest = store.item(LNT, Category::Materials, "jk_levelmaxx_putty").unwrap();
    assert_eq!(source.stock, dec!(3590));
    assert_eq!(dest.stock, dec!(10));
    assert_eq!(dest.used, dec!(0));
    assert_eq!(dest.unit, source.unit);
    assert_eq!(dest.rate, source.rate);
    assert_eq!(dest.code, "JK-PY-01");

    // Exactly one transaction, of kind transfer.
    assert_eq!(store.transactions.len(), 1);
    assert_matches!(store.transactions[0].kind, TransactionKind::Transfer { .. });
}

#[tokio::test]
async fn transfer_into_same_site_is_rejected() {
    let (state, _dir) = seeded_state().await;
    let err = state
        .ledger
        .transfer_stock(TransferRequest {
            from_site: LNT.into(),
            to_site: LNT.into(),
            category: Category::Materials,
            item: "asian_fine_putty".into(),
            quantity: dec!(1),
            authorized_by: "PM".into(),
            driver_name: "Ravi".into(),
            vehicle_number: String::new(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::SameSite(_));
}

#[tokio::test]
async fn add_stock_creates_or_increments() {
    let (state, _dir) = seeded_state().await;

    // Restock an existing item.
    let level = state
        .ledger
        .add_stock(AddStockRequest {
            site: LNT.into(),
            category: Category::Materials,
            item: "asian_fine_putty".into(),
            quantity: dec!(60),
            new_item: None,
            supplier: "Asian Paints".into(),
            received_by: "Storekeeper".into(),
        })
        .await
        .unwrap();
    assert_eq!(level.stock, dec!(100));

    // Create a brand-new item with metadata.
    let level = state
        .ledger
        .add_stock(AddStockRequest {
            site: LNT.into(),
            category: Category::ToolsAndAccessories,
            item: "wire_brush".into(),
            quantity: dec!(12),
            new_item: Some(NewItemMeta {
                unit: "pieces".into(),
                min_stock: dec!(3),
                rate: dec!(45),
                code: None,
            }),
            supplier: String::new(),
            received_by: "Storekeeper".into(),
        })
        .await
        .unwrap();
    assert_eq!(level.stock, dec!(12));

    let store = state.store.read().await;
    let brush = store
        .item(LNT, Category::ToolsAndAccessories, "wire_brush")
        .unwrap();
    assert_eq!(brush.code, "N/A");
    assert_eq!(brush.used, dec!(0));

    // Each accepted add appends exactly one `added` transaction.
    assert_eq!(store.transactions.len(), 2);
    assert_matches!(
        &store.transactions[0].kind,
        TransactionKind::Added { quantity, .. } if *quantity == dec!(60)
    );
    assert_matches!(
        &store.transactions[1].kind,
        TransactionKind::Added { quantity, .. } if *quantity == dec!(12)
    );
}

#[tokio::test]
async fn add_stock_duplicate_and_missing_item_errors() {
    let (state, _dir) = seeded_state().await;

    let err = state
        .ledger
        .add_stock(AddStockRequest {
            site: LNT.into(),
            category: Category::Materials,
            item: "asian_fine_putty".into(),
            quantity: dec!(5),
            new_item: Some(NewItemMeta {
                unit: "kg".into(),
                min_stock: dec!(1),
                rate: dec!(1),
                code: None,
            }),
            supplier: String::new(),
            received_by: "Storekeeper".into(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Duplicate(_));

    let err = state
        .ledger
        .add_stock(AddStockRequest {
            site: LNT.into(),
            category: Category::Materials,
            item: "no_such_item".into(),
            quantity: dec!(5),
            new_item: None,
            supplier: String::new(),
            received_by: "Storekeeper".into(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn edit_item_records_old_and_new_stock() {
    let (state, _dir) = seeded_state().await;

    let level = state
        .ledger
        .edit_item(
            LNT,
            Category::Materials,
            "asian_fine_putty",
            EditItemRequest {
                stock: dec!(55),
                used: dec!(5),
                unit: "kg".into(),
                rate: dec!(610),
                min_stock: dec!(25),
                code: None,
                notes: "stocktake correction".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(level.stock, dec!(55));

    let store = state.store.read().await;
    assert_matches!(
        &store.transactions[0].kind,
        TransactionKind::Edited { old_stock, new_stock, .. }
            if *old_stock == dec!(40) && *new_stock == dec!(55)
    );
    // Code was not supplied, so the original survives.
    let record = store.item(LNT, Category::Materials, "asian_fine_putty").unwrap();
    assert_eq!(record.code, "AP-PY-03");
    assert_eq!(record.min_stock, dec!(25));
}

#[tokio::test]
async fn edit_item_is_idempotent() {
    let (state, _dir) = seeded_state().await;

    let request = EditItemRequest {
        stock: dec!(55),
        used: dec!(5),
        unit: "kg".into(),
        rate: dec!(610),
        min_stock: dec!(25),
        code: Some("AP-PY-04".into()),
        notes: "stocktake correction".into(),
    };

    state
        .ledger
        .edit_item(LNT, Category::Materials, "asian_fine_putty", request.clone())
        .await
        .unwrap();
    let after_first = {
        let store = state.store.read().await;
        store
            .item(LNT, Category::Materials, "asian_fine_putty")
            .unwrap()
            .clone()
    };

    // Applying the same field set again changes nothing.
    let level = state
        .ledger
        .edit_item(LNT, Category::Materials, "asian_fine_putty", request)
        .await
        .unwrap();
    assert_eq!(level.stock, dec!(55));
    assert_eq!(level.used, dec!(5));

    let store = state.store.read().await;
    let after_second = store
        .item(LNT, Category::Materials, "asian_fine_putty")
        .unwrap();
    assert_eq!(*after_second, after_first);

    // Both edits are logged; the second records an unchanged stock level.
    assert_eq!(store.transactions.len(), 2);
    assert_matches!(
        &store.transactions[1].kind,
        TransactionKind::Edited { old_stock, new_stock, .. }
            if *old_stock == dec!(55) && *new_stock == dec!(55)
    );
}

#[tokio::test]
async fn delete_item_logs_deleted_stock() {
    let (state, _dir) = seeded_state().await;

    let deleted = state
        .ledger
        .delete_item(LNT, Category::Machines, "helmet")
        .await
        .unwrap();
    assert_eq!(deleted.deleted_stock, dec!(6));

    let store = state.store.read().await;
    assert!(store.item(LNT, Category::Machines, "helmet").is_none());
    assert_matches!(
        &store.transactions[0].kind,
        TransactionKind::Deleted { deleted_stock, .. } if *deleted_stock == dec!(6)
    );
}

#[tokio::test]
async fn site_lifecycle_cascades_without_logging() {
    let (state, _dir) = seeded_state().await;

    state
        .sites
        .create_site(CreateSiteRequest {
            name: "Prestige Site".into(),
            location: "Whitefield".into(),
            site_manager: "Meera".into(),
            contact: "+91-1234567890".into(),
            project_type: "Residential".into(),
        })
        .await
        .unwrap();

    let err = state
        .sites
        .create_site(CreateSiteRequest {
            name: "Prestige Site".into(),
            location: "Elsewhere".into(),
            site_manager: "X".into(),
            contact: "Y".into(),
            project_type: "Z".into(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Duplicate(_));

    let removed = state.sites.remove_site(KARLE).await.unwrap();
    assert_eq!(removed.items_removed, 6);

    let store = state.store.read().await;
    assert!(!store.sites.contains_key(KARLE));
    assert_eq!(store.system_info.total_sites, 2);
    // Site removal leaves no trace in the transaction log.
    assert!(store.transactions.is_empty());
}

#[tokio::test]
async fn failed_persist_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let good = StoreGateway::new(dir.path().join("store.json"), Duration::from_secs(5));
    let store = good.load().await.unwrap();

    // Gateway pointing at a directory that does not exist: every save fails.
    let broken = StoreGateway::new(
        dir.path().join("missing-dir").join("store.json"),
        Duration::from_secs(5),
    );
    let state = AppState::new(test_config(), store, broken);

    let err = state.ledger.use_stock(use_putty(dec!(15))).await.unwrap_err();
    assert_matches!(err, ServiceError::Persistence(_));

    let store = state.store.read().await;
    let record = store.item(LNT, Category::Materials, "asian_fine_putty").unwrap();
    assert_eq!(record.stock, dec!(40));
    assert_eq!(record.used, dec!(0));
    assert!(store.transactions.is_empty());
}
