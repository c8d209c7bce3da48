use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Category;

/// Immutable audit-log entry for one inventory-affecting event. Entries are
/// only ever appended; nothing in the system mutates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn now(kind: TransactionKind) -> Self {
        Transaction {
            date: Utc::now(),
            kind,
        }
    }

    /// True when the entry references `site` in any role (owner, transfer
    /// source, or transfer destination).
    pub fn references_site(&self, site: &str) -> bool {
        match &self.kind {
            TransactionKind::Added { site: s, .. }
            | TransactionKind::Used { site: s, .. }
            | TransactionKind::Edited { site: s, .. }
            | TransactionKind::Deleted { site: s, .. } => s == site,
            TransactionKind::Transfer {
                from_site, to_site, ..
            } => from_site == site || to_site == site,
        }
    }
}

/// Per-event payload. Each variant carries only the fields relevant to its
/// event type; the `type` tag on the wire is the lowercase variant name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Added {
        site: String,
        category: Category,
        item: String,
        quantity: Decimal,
        supplier: String,
        received_by: String,
    },
    Used {
        site: String,
        category: Category,
        item: String,
        quantity: Decimal,
        work_area: String,
        supervisor: String,
        purpose: String,
    },
    Edited {
        site: String,
        category: Category,
        item: String,
        old_stock: Decimal,
        new_stock: Decimal,
        notes: String,
    },
    Deleted {
        site: String,
        category: Category,
        item: String,
        deleted_stock: Decimal,
    },
    Transfer {
        from_site: String,
        to_site: String,
        category: Category,
        item: String,
        quantity: Decimal,
        authorized_by: String,
        driver_name: String,
        vehicle_number: String,
    },
}
