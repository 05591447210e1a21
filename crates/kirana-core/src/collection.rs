use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::CoreError,
    export::{DraftSnapshot, ExportItem, ExportPayload},
    models::{ItemRecord, ItemUpdate, VendorInfo, VendorUpdate},
    quantity::{
        derive_opening_stock, derive_purchase_price, derive_total_quantity, format_money,
        sum_final_amounts,
    },
};

pub const SEED_ROWS: usize = 5;

/// The invoice being edited: vendor header plus the ordered line items.
///
/// Every mutation returns the next state and leaves `self` untouched. The
/// collection never drops below one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCollection {
    vendor: VendorInfo,
    items: Vec<ItemRecord>,
}

impl ItemCollection {
    pub fn new(vendor: VendorInfo) -> Self {
        Self::with_rows(vendor, SEED_ROWS)
    }

    pub fn with_rows(vendor: VendorInfo, rows: usize) -> Self {
        let items = (1..=rows.max(1) as u64).map(ItemRecord::empty).collect();
        Self { vendor, items }
    }

    pub fn vendor(&self) -> &VendorInfo {
        &self.vendor
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn next_id(&self) -> u64 {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    #[must_use]
    pub fn add_item(&self) -> Self {
        let mut next = self.clone();
        next.items.push(ItemRecord::empty(self.next_id()));
        next
    }

    #[must_use]
    pub fn delete_item(&self, id: u64) -> Self {
        if self.items.len() <= 1 {
            debug!(id, "refusing to delete the last remaining item");
            return self.clone();
        }

        let mut next = self.clone();
        next.items.retain(|item| item.id != id);
        next
    }

    #[must_use]
    pub fn update_item(&self, id: u64, update: ItemUpdate) -> Self {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            debug!(id, field = update.field_name(), "update for unknown item ignored");
            return self.clone();
        };

        let current = &self.items[index];
        if matches!(update, ItemUpdate::OpeningStock(_)) && current.auto_calculate_stock {
            debug!(id, "opening stock is derived while auto mode is on");
            return self.clone();
        }

        let resync = match &update {
            ItemUpdate::AutoCalculateStock(enabled) => *enabled,
            other => other.affects_quantity(),
        };

        let mut next = self.clone();
        let item = &mut next.items[index];
        update.apply(item);

        if resync {
            if let Some(stock) = derive_opening_stock(item) {
                item.opening_stock = stock;
            }
        }

        next
    }

    #[must_use]
    pub fn update_vendor(&self, update: VendorUpdate) -> Self {
        let mut next = self.clone();
        update.apply(&mut next.vendor);
        next
    }

    /// Sum of every row's final amount, named or not.
    pub fn total(&self) -> Decimal {
        sum_final_amounts(&self.items)
    }

    pub fn display_total(&self) -> String {
        format_money(self.total())
    }

    pub fn build_export_payload(&self) -> ExportPayload {
        let products: Vec<ExportItem> = self
            .items
            .iter()
            .filter(|item| item.has_name())
            .map(ExportItem::from_record)
            .collect();
        let total = products
            .iter()
            .map(|product| product.final_amount)
            .fold(Decimal::ZERO, Decimal::saturating_add);

        ExportPayload {
            vendor_name: self.vendor.vendor_name.trim().to_string(),
            vendor_code: Some(self.vendor.vendor_code.trim())
                .filter(|code| !code.is_empty())
                .map(str::to_string),
            invoice_number: self.vendor.invoice_number.clone(),
            date: self.vendor.date,
            total: format_money(total),
            products,
        }
    }

    pub fn snapshot(&self, exported_at: DateTime<Utc>) -> DraftSnapshot {
        DraftSnapshot {
            vendor_info: self.vendor.clone(),
            items: self.items.clone(),
            total: self.display_total(),
            export_date: exported_at,
        }
    }

    /// Rebuilds a draft from a saved snapshot. Auto-mode rows are resynced so a
    /// hand-edited file cannot carry a stale opening stock.
    pub fn from_snapshot(snapshot: DraftSnapshot) -> Result<Self, CoreError> {
        if snapshot.items.is_empty() {
            return Err(CoreError::EmptyDraft);
        }

        let mut seen = HashSet::with_capacity(snapshot.items.len());
        for item in &snapshot.items {
            if !seen.insert(item.id) {
                return Err(CoreError::DuplicateItemId(item.id));
            }
        }

        let items = snapshot
            .items
            .into_iter()
            .map(|mut item| {
                if let Some(stock) = derive_opening_stock(&item) {
                    item.opening_stock = stock;
                }
                item
            })
            .collect();

        Ok(Self {
            vendor: snapshot.vendor_info,
            items,
        })
    }
}

/// A row together with the fields derived from it, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub record: ItemRecord,
    pub total_quantity: i64,
    pub purchase_price: String,
}

impl From<&ItemRecord> for ItemView {
    fn from(record: &ItemRecord) -> Self {
        Self {
            total_quantity: derive_total_quantity(record),
            purchase_price: derive_purchase_price(record),
            record: record.clone(),
        }
    }
}
