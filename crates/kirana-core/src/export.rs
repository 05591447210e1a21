use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    models::{ItemRecord, PackagingType, VendorInfo},
    quantity::{
        derive_purchase_price, derive_total_quantity, describe_quantity, parse_amount, parse_count,
    },
};

/// Export-ready row. Amounts travel as JSON numbers, the purchase price as a
/// two-digit string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItem {
    pub item_name: String,
    pub item_code: String,
    pub category: String,
    pub hsn: String,
    pub packaging_type: PackagingType,
    pub quantity: String,
    pub total_quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub purchase_price: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub mrp: Decimal,
    pub opening_stock: i64,
}

impl ExportItem {
    pub fn from_record(item: &ItemRecord) -> Self {
        let final_amount = parse_amount(&item.final_amount);

        Self {
            item_name: item.item_name.clone(),
            item_code: item.item_code.clone(),
            category: item.category.clone(),
            hsn: item.hsn.clone(),
            packaging_type: item.packaging_type.clone(),
            quantity: describe_quantity(item),
            total_quantity: derive_total_quantity(item),
            final_amount,
            total: final_amount,
            purchase_price: derive_purchase_price(item),
            mrp: parse_amount(&item.mrp),
            opening_stock: parse_count(&item.opening_stock),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub vendor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<String>,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub total: String,
    pub products: Vec<ExportItem>,
}

/// Full draft as saved to a JSON backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub vendor_info: VendorInfo,
    pub items: Vec<ItemRecord>,
    pub total: String,
    pub export_date: DateTime<Utc>,
}

impl DraftSnapshot {
    pub fn file_name(&self) -> String {
        format!(
            "invoice_{}_{}.json",
            file_safe(&self.vendor_info.invoice_number),
            self.export_date.format("%Y-%m-%d")
        )
    }
}

/// Replaces anything outside `[A-Za-z0-9_-]` with `_` so user-entered text can
/// sit inside a file name or a header.
pub fn file_safe(text: &str) -> String {
    text.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
