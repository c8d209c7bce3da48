//! Item Record Store: dumb accessors over the in-memory [`Store`].
//!
//! Uniqueness per `(site, category)` pair falls out of the underlying map;
//! business validation (quantities, mandatory fields, duplicate policy)
//! belongs to the ledger in [`crate::services::ledger`].

use crate::errors::ServiceError;
use crate::models::{Category, ItemRecord, Site, Store};

impl Store {
    pub fn site(&self, name: &str) -> Result<&Site, ServiceError> {
        self.sites
            .get(name)
            .ok_or_else(|| ServiceError::NotFound(format!("site '{}'", name)))
    }

    pub fn site_mut(&mut self, name: &str) -> Result<&mut Site, ServiceError> {
        self.sites
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(format!("site '{}'", name)))
    }

    pub fn item(&self, site: &str, category: Category, item_id: &str) -> Option<&ItemRecord> {
        self.sites.get(site).and_then(|s| s.items(category).get(item_id))
    }

    pub fn item_mut(
        &mut self,
        site: &str,
        category: Category,
        item_id: &str,
    ) -> Option<&mut ItemRecord> {
        self.sites
            .get_mut(site)
            .and_then(|s| s.items_mut(category).get_mut(item_id))
    }

    /// Inserts or replaces an item record.
    pub fn put_item(
        &mut self,
        site: &str,
        category: Category,
        item_id: &str,
        record: ItemRecord,
    ) -> Result<(), ServiceError> {
        self.site_mut(site)?
            .items_mut(category)
            .insert(item_id.to_string(), record);
        Ok(())
    }

    /// Removes an item record, returning it if present.
    pub fn remove_item(
        &mut self,
        site: &str,
        category: Category,
        item_id: &str,
    ) -> Option<ItemRecord> {
        self.sites
            .get_mut(site)
            .and_then(|s| s.items_mut(category).remove(item_id))
    }

    /// Total number of item records across all sites and categories.
    pub fn item_count(&self) -> usize {
        self.sites.values().map(Site::item_count).sum()
    }
}
