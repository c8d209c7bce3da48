use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

mod transaction;

pub use transaction::{Transaction, TransactionKind};

/// The three fixed inventory classes. Modeled as a closed enum so an invalid
/// category cannot reach the ledger at runtime.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    ToSchema,
)]
pub enum Category {
    #[serde(rename = "materials")]
    #[strum(serialize = "materials")]
    Materials,
    #[serde(rename = "tools and accessories")]
    #[strum(serialize = "tools and accessories")]
    ToolsAndAccessories,
    #[serde(rename = "machines")]
    #[strum(serialize = "machines")]
    Machines,
}

/// One trackable inventory unit within a site and category.
///
/// Quantities are decimals: materials are often measured in fractional kg or
/// liters while tools are counted in whole pieces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemRecord {
    /// Current stock on hand; never negative.
    pub stock: Decimal,
    /// Cumulative quantity consumed via use operations.
    pub used: Decimal,
    /// Free-text unit of measure (pieces, kg, liters, sets, ...).
    pub unit: String,
    /// Threshold at or below which the item counts as low stock.
    pub min_stock: Decimal,
    /// Redundant copy of the owning category, kept for the wire format.
    pub category: Category,
    /// Price per unit in rupees.
    pub rate: Decimal,
    /// Optional supplier item code.
    #[serde(default = "default_code")]
    pub code: String,
}

fn default_code() -> String {
    "N/A".to_string()
}

impl ItemRecord {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Stock valuation: `stock * rate`.
    pub fn value(&self) -> Decimal {
        self.stock * self.rate
    }
}

/// A construction location with its own independent inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Site {
    pub location: String,
    pub site_manager: String,
    pub contact: String,
    pub project_type: String,
    #[serde(default)]
    pub materials: BTreeMap<String, ItemRecord>,
    #[serde(default, rename = "tools and accessories")]
    pub tools_and_accessories: BTreeMap<String, ItemRecord>,
    #[serde(default)]
    pub machines: BTreeMap<String, ItemRecord>,
}

impl Site {
    pub fn items(&self, category: Category) -> &BTreeMap<String, ItemRecord> {
        match category {
            Category::Materials => &self.materials,
            Category::ToolsAndAccessories => &self.tools_and_accessories,
            Category::Machines => &self.machines,
        }
    }

    pub fn items_mut(&mut self, category: Category) -> &mut BTreeMap<String, ItemRecord> {
        match category {
            Category::Materials => &mut self.materials,
            Category::ToolsAndAccessories => &mut self.tools_and_accessories,
            Category::Machines => &mut self.machines,
        }
    }

    pub fn item_count(&self) -> usize {
        self.materials.len() + self.tools_and_accessories.len() + self.machines.len()
    }

    /// Total valuation across all three categories.
    pub fn stock_value(&self) -> Decimal {
        [
            Category::Materials,
            Category::ToolsAndAccessories,
            Category::Machines,
        ]
        .iter()
        .flat_map(|c| self.items(*c).values())
        .map(ItemRecord::value)
        .sum()
    }
}

/// Store-level metadata, rewritten on every successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SystemInfo {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub total_sites: usize,
}

/// Top-level aggregate and unit of persistence: all sites, the append-only
/// transaction log, and system metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub sites: BTreeMap<String, Site>,
    pub transactions: Vec<Transaction>,
    pub system_info: SystemInfo,
}

impl Store {
    /// Empty store with no sites. Mostly useful in tests.
    pub fn empty() -> Self {
        Store {
            sites: BTreeMap::new(),
            transactions: Vec::new(),
            system_info: SystemInfo {
                version: format!("sitestock-api v{}", env!("CARGO_PKG_VERSION")),
                last_updated: Utc::now(),
                total_sites: 0,
            },
        }
    }

    /// Default inventory used when no store file exists yet: two sites, each
    /// pre-populated with two items per category.
    pub fn seed() -> Self {
        fn item(
            stock: Decimal,
            used: Decimal,
            unit: &str,
            min_stock: Decimal,
            category: Category,
            rate: Decimal,
            code: &str,
        ) -> ItemRecord {
            ItemRecord {
                stock,
                used,
                unit: unit.to_string(),
                min_stock,
                category,
                rate,
                code: code.to_string(),
            }
        }

        let mut store = Store::empty();

        let mut lnt = Site {
            location: "L&T Construction Site Location".to_string(),
            site_manager: "L&T Site Manager".to_string(),
            contact: "+91-XXXXXXXXXX".to_string(),
            project_type: "L&T Construction Project".to_string(),
            materials: BTreeMap::new(),
            tools_and_accessories: BTreeMap::new(),
            machines: BTreeMap::new(),
        };
        lnt.materials.insert(
            "asian_fine_putty".to_string(),
            item(
                dec!(40),
                dec!(0),
                "kg",
                dec!(20),
                Category::Materials,
                dec!(607.7),
                "AP-PY-03",
            ),
        );
        lnt.materials.insert(
            "asian_interior_primer".to_string(),
            item(
                dec!(120),
                dec!(0),
                "liters",
                dec!(50),
                Category::Materials,
                dec!(1416),
                "AP-PR-01",
            ),
        );
        lnt.tools_and_accessories.insert(
            "putty_blade_8inch".to_string(),
            item(
                dec!(48),
                dec!(0),
                "pieces",
                dec!(10),
                Category::ToolsAndAccessories,
                dec!(16.225),
                "HT-PB-08",
            ),
        );
        lnt.tools_and_accessories.insert(
            "cutting_plier".to_string(),
            item(
                dec!(1),
                dec!(0),
                "pieces",
                dec!(2),
                Category::ToolsAndAccessories,
                dec!(150.0),
                "HT-CP-001",
            ),
        );
        lnt.machines.insert(
            "helmet".to_string(),
            item(
                dec!(6),
                dec!(0),
                "pieces",
                dec!(10),
                Category::Machines,
                dec!(88.5),
                "SA-HE-001",
            ),
        );
        lnt.machines.insert(
            "safety_jacket_orange".to_string(),
            item(
                dec!(4),
                dec!(0),
                "pieces",
                dec!(8),
                Category::Machines,
                dec!(57.75),
                "SA-SJ-OR",
            ),
        );

        let mut karle = Site {
            location: "Karle Project Location".to_string(),
            site_manager: "Karle Site Manager".to_string(),
            contact: "+91-YYYYYYYYY".to_string(),
            project_type: "Karle Construction Project".to_string(),
            materials: BTreeMap::new(),
            tools_and_accessories: BTreeMap::new(),
            machines: BTreeMap::new(),
        };
        karle.materials.insert(
            "jk_levelmaxx_putty".to_string(),
            item(
                dec!(3600),
                dec!(0),
                "kg",
                dec!(100),
                Category::Materials,
                dec!(600.03),
                "JK-PY-01",
            ),
        );
        karle.materials.insert(
            "dulux_interior_primer".to_string(),
            item(
                dec!(297),
                dec!(23),
                "liters",
                dec!(50),
                Category::Materials,
                dec!(1357),
                "DL-PR-02",
            ),
        );
        karle.tools_and_accessories.insert(
            "putty_blade_4inch".to_string(),
            item(
                dec!(16),
                dec!(0),
                "pieces",
                dec!(8),
                Category::ToolsAndAccessories,
                dec!(6.2894),
                "HT-PB-04",
            ),
        );
        karle.tools_and_accessories.insert(
            "scaffolding".to_string(),
            item(
                dec!(16),
                dec!(0),
                "sets",
                dec!(5),
                Category::ToolsAndAccessories,
                dec!(5000),
                "EQ-SC-001",
            ),
        );
        karle.machines.insert(
            "fall_arrester".to_string(),
            item(
                dec!(6),
                dec!(0),
                "pieces",
                dec!(4),
                Category::Machines,
                dec!(1475),
                "SA-FA-001",
            ),
        );
        karle.machines.insert(
            "safety_goggles".to_string(),
            item(
                dec!(17),
                dec!(0),
                "pieces",
                dec!(10),
                Category::Machines,
                dec!(37.76),
                "SA-GO-001",
            ),
        );

        store.sites.insert("L&T Site".to_string(), lnt);
        store.sites.insert("Karle Construction Site".to_string(), karle);
        store.touch();
        store
    }

    /// Refresh metadata after a mutation.
    pub fn touch(&mut self) {
        self.system_info.last_updated = Utc::now();
        self.system_info.total_sites = self.sites.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_tags() {
        assert_eq!(
            serde_json::to_string(&Category::Materials).unwrap(),
            "\"materials\""
        );
        assert_eq!(
            serde_json::to_string(&Category::ToolsAndAccessories).unwrap(),
            "\"tools and accessories\""
        );
        assert_eq!(
            serde_json::to_string(&Category::Machines).unwrap(),
            "\"machines\""
        );

        let parsed: Category = serde_json::from_str("\"tools and accessories\"").unwrap();
        assert_eq!(parsed, Category::ToolsAndAccessories);
    }

    #[test]
    fn category_from_str() {
        use std::str::FromStr;
        assert_eq!(Category::from_str("materials").unwrap(), Category::Materials);
        assert_eq!(
            Category::from_str("tools and accessories").unwrap(),
            Category::ToolsAndAccessories
        );
        assert!(Category::from_str("vehicles").is_err());
    }

    #[test]
    fn seed_matches_default_inventory() {
        let store = Store::seed();
        assert_eq!(store.sites.len(), 2);
        assert_eq!(store.system_info.total_sites, 2);
        assert!(store.transactions.is_empty());

        let lnt = &store.sites["L&T Site"];
        let putty = &lnt.materials["asian_fine_putty"];
        assert_eq!(putty.stock, dec!(40));
        assert_eq!(putty.min_stock, dec!(20));
        assert_eq!(putty.rate, dec!(607.7));
        assert_eq!(putty.code, "AP-PY-03");

        let karle = &store.sites["Karle Construction Site"];
        assert_eq!(karle.materials["jk_levelmaxx_putty"].stock, dec!(3600));
        assert_eq!(karle.materials["dulux_interior_primer"].used, dec!(23));
        assert_eq!(karle.item_count(), 6);
    }

    #[test]
    fn site_uses_legacy_category_key() {
        let store = Store::seed();
        let json = serde_json::to_value(&store.sites["L&T Site"]).unwrap();
        assert!(json.get("tools and accessories").is_some());
        assert!(json.get("tools_and_accessories").is_none());
    }

    #[test]
    fn store_round_trips_through_json() {
        let store = Store::seed();
        let json = serde_json::to_string_pretty(&store).unwrap();
        let back: Store = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn low_stock_is_inclusive_of_threshold() {
        let store = Store::seed();
        let helmet = &store.sites["L&T Site"].machines["helmet"];
        assert!(helmet.is_low_stock()); // 6 <= 10
        let primer = &store.sites["L&T Site"].materials["asian_interior_primer"];
        assert!(!primer.is_low_stock()); // 120 > 50
    }
}
