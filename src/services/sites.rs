//! Site management: whole-site create and remove.
//!
//! These wrap Store mutation rather than the ledger proper: they manage
//! sites, not items. Removal cascades over every contained item record and
//! emits no transaction, matching the system's historical behavior.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::{Site, Store};
use crate::persistence::StoreGateway;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSiteRequest {
    #[validate(length(min = 1, message = "site name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "site_manager is required"))]
    pub site_manager: String,
    #[validate(length(min = 1, message = "contact is required"))]
    pub contact: String,
    #[validate(length(min = 1, message = "project_type is required"))]
    pub project_type: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RemovedSite {
    pub name: String,
    /// Item records cascade-deleted with the site.
    pub items_removed: usize,
}

#[derive(Clone)]
pub struct SiteService {
    store: Arc<RwLock<Store>>,
    gateway: Arc<StoreGateway>,
}

impl SiteService {
    pub fn new(store: Arc<RwLock<Store>>, gateway: Arc<StoreGateway>) -> Self {
        Self { store, gateway }
    }

    #[instrument(skip(self, req), fields(site = %req.name))]
    pub async fn create_site(&self, req: CreateSiteRequest) -> Result<(), ServiceError> {
        req.validate()?;

        let mut guard = self.store.write().await;
        if guard.sites.contains_key(&req.name) {
            return Err(ServiceError::Duplicate(format!(
                "site '{}' already exists",
                req.name
            )));
        }

        let mut staged = guard.clone();
        staged.sites.insert(
            req.name.clone(),
            Site {
                location: req.location,
                site_manager: req.site_manager,
                contact: req.contact,
                project_type: req.project_type,
                materials: BTreeMap::new(),
                tools_and_accessories: BTreeMap::new(),
                machines: BTreeMap::new(),
            },
        );
        staged.touch();

        self.gateway.save(&staged).await?;
        *guard = staged;

        info!("site created");
        Ok(())
    }

    /// Permanently removes a site and every item record it contains.
    #[instrument(skip(self), fields(site = %name))]
    pub async fn remove_site(&self, name: &str) -> Result<RemovedSite, ServiceError> {
        let mut guard = self.store.write().await;
        let mut staged = guard.clone();

        let removed = staged
            .sites
            .remove(name)
            .ok_or_else(|| ServiceError::NotFound(format!("site '{}'", name)))?;
        staged.touch();

        self.gateway.save(&staged).await?;
        *guard = staged;

        let items_removed = removed.item_count();
        info!(items_removed, "site removed");
        Ok(RemovedSite {
            name: name.to_string(),
            items_removed,
        })
    }
}
