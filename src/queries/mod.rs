//! Read-side queries over the in-memory store.
//!
//! Everything here is a pure function over `&Store`; handlers take a read
//! lock, run the query, and drop the lock before serializing the response.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use utoipa::{IntoParams, ToSchema};

use crate::models::{Category, ItemRecord, Store, Transaction};

/// Flattened view of one item record, as returned by listing queries.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemView {
    pub site: String,
    pub item: String,
    pub category: Category,
    pub stock: Decimal,
    pub used: Decimal,
    pub unit: String,
    pub min_stock: Decimal,
    pub rate: Decimal,
    /// Valuation of the remaining stock, `stock * rate`.
    pub value: Decimal,
    pub code: String,
    pub low_stock: bool,
}

impl ItemView {
    fn from_record(site: &str, item: &str, record: &ItemRecord) -> Self {
        ItemView {
            site: site.to_string(),
            item: item.to_string(),
            category: record.category,
            stock: record.stock,
            used: record.used,
            unit: record.unit.clone(),
            min_stock: record.min_stock,
            rate: record.rate,
            value: record.value(),
            code: record.code.clone(),
            low_stock: record.is_low_stock(),
        }
    }
}

/// Optional filters for [`filter_items`]. All criteria are ANDed together.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ItemFilter {
    /// Restrict to a single site.
    pub site: Option<String>,
    /// Restrict to a single category.
    pub category: Option<Category>,
    /// Case-insensitive substring match on the item id.
    pub search: Option<String>,
    /// Keep only items at or below their minimum stock level.
    #[serde(default)]
    pub low_stock: bool,
}

fn each_item(store: &Store) -> impl Iterator<Item = (&String, Category, &String, &ItemRecord)> {
    store.sites.iter().flat_map(|(site_name, site)| {
        Category::iter().flat_map(move |category| {
            site.items(category)
                .iter()
                .map(move |(item_id, record)| (site_name, category, item_id, record))
        })
    })
}

/// All item records matching the filter, ordered by site then category then
/// item id.
pub fn filter_items(store: &Store, filter: &ItemFilter) -> Vec<ItemView> {
    let needle = filter.search.as_deref().map(str::to_lowercase);
    each_item(store)
        .filter(|(site_name, category, item_id, record)| {
            if let Some(want) = &filter.site {
                if *site_name != want {
                    return false;
                }
            }
            if let Some(want) = filter.category {
                if *category != want {
                    return false;
                }
            }
            if let Some(needle) = &needle {
                if !item_id.to_lowercase().contains(needle) {
                    return false;
                }
            }
            !filter.low_stock || record.is_low_stock()
        })
        .map(|(site_name, _, item_id, record)| ItemView::from_record(site_name, item_id, record))
        .collect()
}

/// Items at or below their minimum stock level, optionally per site.
pub fn low_stock_items(store: &Store, site: Option<&str>) -> Vec<ItemView> {
    filter_items(
        store,
        &ItemFilter {
            site: site.map(str::to_string),
            low_stock: true,
            ..ItemFilter::default()
        },
    )
}

/// Total stock valuation, optionally restricted to one site and/or category.
pub fn total_stock_value(store: &Store, site: Option<&str>, category: Option<Category>) -> Decimal {
    each_item(store)
        .filter(|(site_name, cat, _, _)| {
            site.map_or(true, |want| site_name.as_str() == want)
                && category.map_or(true, |want| *cat == want)
        })
        .map(|(_, _, _, record)| record.value())
        .sum()
}

/// Most recent transactions first, optionally filtered to those touching a
/// site (transfers count for both endpoints).
pub fn recent_transactions(store: &Store, site: Option<&str>, limit: usize) -> Vec<Transaction> {
    let mut matching: Vec<Transaction> = store
        .transactions
        .iter()
        .filter(|t| site.map_or(true, |s| t.references_site(s)))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date));
    matching.truncate(limit);
    matching
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub total_sites: usize,
    pub total_items: usize,
    pub total_stock_value: Decimal,
    pub low_stock_count: usize,
}

pub fn dashboard_metrics(store: &Store) -> DashboardMetrics {
    DashboardMetrics {
        total_sites: store.sites.len(),
        total_items: store.item_count(),
        total_stock_value: total_stock_value(store, None, None),
        low_stock_count: each_item(store)
            .filter(|(_, _, _, record)| record.is_low_stock())
            .count(),
    }
}

/// Per-site rollup used for the cross-site comparison report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SiteComparison {
    pub site: String,
    pub location: String,
    pub site_manager: String,
    pub total_items: usize,
    pub stock_value: Decimal,
}

pub fn site_comparison(store: &Store) -> Vec<SiteComparison> {
    store
        .sites
        .iter()
        .map(|(name, site)| SiteComparison {
            site: name.clone(),
            location: site.location.clone(),
            site_manager: site.site_manager.clone(),
            total_items: site.item_count(),
            stock_value: site.stock_value(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use rust_decimal_macros::dec;

    #[test]
    fn filter_by_site_and_category() {
        let store = Store::seed();
        let views = filter_items(
            &store,
            &ItemFilter {
                site: Some("L&T Site".into()),
                category: Some(Category::Materials),
                ..ItemFilter::default()
            },
        );
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.site == "L&T Site"));
        assert!(views.iter().all(|v| v.category == Category::Materials));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let store = Store::seed();
        let views = filter_items(
            &store,
            &ItemFilter {
                search: Some("PUTTY".into()),
                ..ItemFilter::default()
            },
        );
        // asian_fine_putty, jk_levelmaxx_putty and both putty blades
        assert_eq!(views.len(), 4);
    }

    #[test]
    fn low_stock_filter_uses_inclusive_threshold() {
        let store = Store::seed();
        let views = low_stock_items(&store, Some("L&T Site"));
        let ids: Vec<&str> = views.iter().map(|v| v.item.as_str()).collect();
        // cutting_plier 1<=2, helmet 6<=10, safety_jacket_orange 4<=8
        assert_eq!(ids, vec!["cutting_plier", "helmet", "safety_jacket_orange"]);
    }

    #[test]
    fn stock_value_sums_stock_times_rate() {
        let store = Store::seed();
        let value = total_stock_value(&store, Some("L&T Site"), Some(Category::Machines));
        // helmet 6 * 88.5 + safety_jacket_orange 4 * 57.75
        assert_eq!(value, dec!(762));
    }

    #[test]
    fn dashboard_counts_seed_inventory() {
        let store = Store::seed();
        let metrics = dashboard_metrics(&store);
        assert_eq!(metrics.total_sites, 2);
        assert_eq!(metrics.total_items, 12);
        assert!(metrics.total_stock_value > dec!(2_000_000));
        assert_eq!(metrics.low_stock_count, 3);
    }

    #[test]
    fn transactions_filter_counts_transfers_for_both_sites() {
        let mut store = Store::seed();
        store.transactions.push(Transaction::now(TransactionKind::Transfer {
            from_site: "Karle Construction Site".into(),
            to_site: "L&T Site".into(),
            category: Category::Materials,
            item: "jk_levelmaxx_putty".into(),
            quantity: dec!(10),
            authorized_by: "PM".into(),
            driver_name: "Ravi".into(),
            vehicle_number: "KA-01".into(),
        }));
        store.transactions.push(Transaction::now(TransactionKind::Used {
            site: "Karle Construction Site".into(),
            category: Category::Materials,
            item: "dulux_interior_primer".into(),
            quantity: dec!(5),
            work_area: "Block A".into(),
            supervisor: "Anil".into(),
            purpose: "".into(),
        }));

        assert_eq!(recent_transactions(&store, Some("L&T Site"), 50).len(), 1);
        assert_eq!(
            recent_transactions(&store, Some("Karle Construction Site"), 50).len(),
            2
        );
        assert_eq!(recent_transactions(&store, None, 1).len(), 1);
    }

    #[test]
    fn site_comparison_covers_every_site() {
        let store = Store::seed();
        let rows = site_comparison(&store);
        assert_eq!(rows.len(), 2);
        let karle = rows.iter().find(|r| r.site == "Karle Construction Site").unwrap();
        assert_eq!(karle.total_items, 6);
        assert!(karle.stock_value > dec!(2_000_000));
    }
}
