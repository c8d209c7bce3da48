//! Ledger engine: the five stock-mutating operations.
//!
//! Every operation follows the same staged-commit discipline: validate
//! against the live store, apply the mutation and the transaction append to a
//! scratch copy, persist the copy, and only then swap it in. A failed persist
//! therefore leaves both memory and disk exactly as they were. The write lock
//! is held across the whole sequence so readers never observe a partially
//! applied operation.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::{Category, ItemRecord, Store, Transaction, TransactionKind};
use crate::persistence::StoreGateway;

/// Metadata for creating a brand-new item record. `unit` is mandatory;
/// everything else defaults to zero / "N/A".
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewItemMeta {
    #[validate(length(min = 1, message = "unit is required for a new item"))]
    pub unit: String,
    #[serde(default)]
    pub min_stock: Decimal,
    #[serde(default)]
    pub rate: Decimal,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddStockRequest {
    #[validate(length(min = 1))]
    pub site: String,
    pub category: Category,
    #[validate(length(min = 1))]
    pub item: String,
    pub quantity: Decimal,
    /// Present when creating a new item; absent when restocking an existing one.
    #[validate]
    pub new_item: Option<NewItemMeta>,
    #[serde(default)]
    pub supplier: String,
    #[validate(length(min = 1, message = "received_by is required"))]
    pub received_by: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UseStockRequest {
    #[validate(length(min = 1))]
    pub site: String,
    pub category: Category,
    #[validate(length(min = 1))]
    pub item: String,
    pub quantity: Decimal,
    #[validate(length(min = 1, message = "work_area is required"))]
    pub work_area: String,
    #[validate(length(min = 1, message = "supervisor is required"))]
    pub supervisor: String,
    #[serde(default)]
    pub purpose: String,
}

/// Direct field overwrite: no delta semantics, no lower bound tied to the
/// usage history. The edited transaction records old and new stock.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EditItemRequest {
    pub stock: Decimal,
    pub used: Decimal,
    #[validate(length(min = 1))]
    pub unit: String,
    pub rate: Decimal,
    pub min_stock: Decimal,
    pub code: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    #[validate(length(min = 1))]
    pub from_site: String,
    #[validate(length(min = 1))]
    pub to_site: String,
    pub category: Category,
    #[validate(length(min = 1))]
    pub item: String,
    pub quantity: Decimal,
    #[validate(length(min = 1, message = "authorized_by is required"))]
    pub authorized_by: String,
    #[validate(length(min = 1, message = "driver_name is required"))]
    pub driver_name: String,
    #[serde(default)]
    pub vehicle_number: String,
}

/// Post-operation stock snapshot returned to the caller. `low_stock` is the
/// advisory signal: non-fatal, the operation has already succeeded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockLevel {
    pub site: String,
    pub category: Category,
    pub item: String,
    pub stock: Decimal,
    pub used: Decimal,
    pub unit: String,
    pub low_stock: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferOutcome {
    pub item: String,
    pub category: Category,
    pub quantity: Decimal,
    pub from_site: String,
    pub from_stock: Decimal,
    pub to_site: String,
    pub to_stock: Decimal,
    pub source_low_stock: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletedItem {
    pub site: String,
    pub category: Category,
    pub item: String,
    pub deleted_stock: Decimal,
}

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<RwLock<Store>>,
    gateway: Arc<StoreGateway>,
}

impl LedgerService {
    pub fn new(store: Arc<RwLock<Store>>, gateway: Arc<StoreGateway>) -> Self {
        Self { store, gateway }
    }

    /// Receives stock into a site: creates the item when `new_item` metadata
    /// is supplied, otherwise increments the existing record.
    #[instrument(skip(self, req), fields(site = %req.site, item = %req.item))]
    pub async fn add_stock(&self, req: AddStockRequest) -> Result<StockLevel, ServiceError> {
        req.validate()?;
        if req.quantity < Decimal::ZERO {
            return Err(ServiceError::Validation(
                "quantity must not be negative".into(),
            ));
        }
        if let Some(meta) = &req.new_item {
            if meta.min_stock < Decimal::ZERO || meta.rate < Decimal::ZERO {
                return Err(ServiceError::Validation(
                    "min_stock and rate must not be negative".into(),
                ));
            }
        }

        let mut guard = self.store.write().await;
        let mut staged = guard.clone();

        let site = staged.site_mut(&req.site)?;
        let items = site.items_mut(req.category);

        let level = match (&req.new_item, items.contains_key(&req.item)) {
            (Some(_), true) => {
                return Err(ServiceError::Duplicate(format!(
                    "item '{}' already exists in {} at '{}'",
                    req.item, req.category, req.site
                )));
            }
            (Some(meta), false) => {
                let record = ItemRecord {
                    stock: req.quantity,
                    used: Decimal::ZERO,
                    unit: meta.unit.clone(),
                    min_stock: meta.min_stock,
                    category: req.category,
                    rate: meta.rate,
                    code: meta.code.clone().unwrap_or_else(|| "N/A".to_string()),
                };
                let level = stock_level(&req.site, req.category, &req.item, &record);
                items.insert(req.item.clone(), record);
                level
            }
            (None, true) => {
                let record = items.get_mut(&req.item).ok_or_else(|| {
                    ServiceError::Internal("item vanished during add".into())
                })?;
                record.stock += req.quantity;
                stock_level(&req.site, req.category, &req.item, record)
            }
            (None, false) => {
                return Err(ServiceError::NotFound(format!(
                    "item '{}' in {} at '{}'",
                    req.item, req.category, req.site
                )));
            }
        };

        staged.transactions.push(Transaction::now(TransactionKind::Added {
            site: req.site.clone(),
            category: req.category,
            item: req.item.clone(),
            quantity: req.quantity,
            supplier: req.supplier.clone(),
            received_by: req.received_by.clone(),
        }));
        staged.touch();

        self.gateway.save(&staged).await?;
        *guard = staged;

        info!(stock = %level.stock, "stock added");
        Ok(level)
    }

    /// Consumes stock: decrements `stock`, increments the cumulative `used`
    /// counter. Rejected before any mutation when the quantity exceeds stock.
    #[instrument(skip(self, req), fields(site = %req.site, item = %req.item))]
    pub async fn use_stock(&self, req: UseStockRequest) -> Result<StockLevel, ServiceError> {
        req.validate()?;
        if req.quantity <= Decimal::ZERO {
            return Err(ServiceError::Validation("quantity must be positive".into()));
        }

        let mut guard = self.store.write().await;
        let mut staged = guard.clone();

        let record = staged
            .item_mut(&req.site, req.category, &req.item)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "item '{}' in {} at '{}'",
                    req.item, req.category, req.site
                ))
            })?;

        if req.quantity > record.stock {
            return Err(ServiceError::InsufficientStock(format!(
                "requested {} {} of '{}' but only {} available",
                req.quantity, record.unit, req.item, record.stock
            )));
        }

        record.stock -= req.quantity;
        record.used += req.quantity;
        let level = stock_level(&req.site, req.category, &req.item, record);

        staged.transactions.push(Transaction::now(TransactionKind::Used {
            site: req.site.clone(),
            category: req.category,
            item: req.item.clone(),
            quantity: req.quantity,
            work_area: req.work_area.clone(),
            supervisor: req.supervisor.clone(),
            purpose: req.purpose.clone(),
        }));
        staged.touch();

        self.gateway.save(&staged).await?;
        *guard = staged;

        if level.low_stock {
            warn!(stock = %level.stock, "item is at or below its minimum stock level");
        }
        Ok(level)
    }

    /// Overwrites an item's fields with caller-supplied values.
    #[instrument(skip(self, req), fields(site = %site, item = %item))]
    pub async fn edit_item(
        &self,
        site: &str,
        category: Category,
        item: &str,
        req: EditItemRequest,
    ) -> Result<StockLevel, ServiceError> {
        req.validate()?;
        if req.stock < Decimal::ZERO
            || req.used < Decimal::ZERO
            || req.rate < Decimal::ZERO
            || req.min_stock < Decimal::ZERO
        {
            return Err(ServiceError::Validation(
                "stock, used, rate and min_stock must not be negative".into(),
            ));
        }

        let mut guard = self.store.write().await;
        let mut staged = guard.clone();

        let record = staged.item_mut(site, category, item).ok_or_else(|| {
            ServiceError::NotFound(format!("item '{}' in {} at '{}'", item, category, site))
        })?;

        let old_stock = record.stock;
        record.stock = req.stock;
        record.used = req.used;
        record.unit = req.unit.clone();
        record.rate = req.rate;
        record.min_stock = req.min_stock;
        if let Some(code) = &req.code {
            record.code = code.clone();
        }
        let level = stock_level(site, category, item, record);

        staged.transactions.push(Transaction::now(TransactionKind::Edited {
            site: site.to_string(),
            category,
            item: item.to_string(),
            old_stock,
            new_stock: req.stock,
            notes: req.notes.clone(),
        }));
        staged.touch();

        self.gateway.save(&staged).await?;
        *guard = staged;

        info!(old_stock = %old_stock, new_stock = %level.stock, "item edited");
        Ok(level)
    }

    /// Removes an item record entirely, logging the stock held at deletion.
    #[instrument(skip(self), fields(site = %site, item = %item))]
    pub async fn delete_item(
        &self,
        site: &str,
        category: Category,
        item: &str,
    ) -> Result<DeletedItem, ServiceError> {
        let mut guard = self.store.write().await;
        let mut staged = guard.clone();

        let removed = staged.remove_item(site, category, item).ok_or_else(|| {
            ServiceError::NotFound(format!("item '{}' in {} at '{}'", item, category, site))
        })?;

        staged.transactions.push(Transaction::now(TransactionKind::Deleted {
            site: site.to_string(),
            category,
            item: item.to_string(),
            deleted_stock: removed.stock,
        }));
        staged.touch();

        self.gateway.save(&staged).await?;
        *guard = staged;

        info!(deleted_stock = %removed.stock, "item deleted");
        Ok(DeletedItem {
            site: site.to_string(),
            category,
            item: item.to_string(),
            deleted_stock: removed.stock,
        })
    }

    /// Moves stock between two sites. When the destination lacks the item,
    /// the source's metadata is cloned into a fresh record with `used = 0`.
    /// Exactly one `transfer` transaction is appended.
    #[instrument(skip(self, req), fields(from = %req.from_site, to = %req.to_site, item = %req.item))]
    pub async fn transfer_stock(&self, req: TransferRequest) -> Result<TransferOutcome, ServiceError> {
        req.validate()?;
        if req.from_site == req.to_site {
            return Err(ServiceError::SameSite(req.from_site.clone()));
        }
        if req.quantity <= Decimal::ZERO {
            return Err(ServiceError::Validation("quantity must be positive".into()));
        }

        let mut guard = self.store.write().await;
        let mut staged = guard.clone();

        // Both ends checked up front so nothing is mutated on rejection.
        if !staged.sites.contains_key(&req.to_site) {
            return Err(ServiceError::NotFound(format!("site '{}'", req.to_site)));
        }
        let source = staged
            .item_mut(&req.from_site, req.category, &req.item)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "item '{}' in {} at '{}'",
                    req.item, req.category, req.from_site
                ))
            })?;
        if req.quantity > source.stock {
            return Err(ServiceError::InsufficientStock(format!(
                "requested {} {} of '{}' but only {} available at '{}'",
                req.quantity, source.unit, req.item, source.stock, req.from_site
            )));
        }

        source.stock -= req.quantity;
        let from_stock = source.stock;
        let source_low_stock = source.is_low_stock();
        let template = source.clone();

        let destination = staged.site_mut(&req.to_site)?.items_mut(req.category);
        let to_stock = match destination.get_mut(&req.item) {
            Some(existing) => {
                existing.stock += req.quantity;
                existing.stock
            }
            None => {
                destination.insert(
                    req.item.clone(),
                    ItemRecord {
                        stock: req.quantity,
                        used: Decimal::ZERO,
                        ..template
                    },
                );
                req.quantity
            }
        };

        staged.transactions.push(Transaction::now(TransactionKind::Transfer {
            from_site: req.from_site.clone(),
            to_site: req.to_site.clone(),
            category: req.category,
            item: req.item.clone(),
            quantity: req.quantity,
            authorized_by: req.authorized_by.clone(),
            driver_name: req.driver_name.clone(),
            vehicle_number: req.vehicle_number.clone(),
        }));
        staged.touch();

        self.gateway.save(&staged).await?;
        *guard = staged;

        info!(from_stock = %from_stock, to_stock = %to_stock, "transfer completed");
        Ok(TransferOutcome {
            item: req.item,
            category: req.category,
            quantity: req.quantity,
            from_site: req.from_site,
            from_stock,
            to_site: req.to_site,
            to_stock,
            source_low_stock,
        })
    }
}

fn stock_level(site: &str, category: Category, item: &str, record: &ItemRecord) -> StockLevel {
    StockLevel {
        site: site.to_string(),
        category,
        item: item.to_string(),
        stock: record.stock,
        used: record.used,
        unit: record.unit.clone(),
        low_stock: record.is_low_stock(),
    }
}
