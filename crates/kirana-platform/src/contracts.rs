use anyhow::Result as AnyResult;
use chrono::{DateTime, Utc};
use kirana_core::{
    ExportItem, ExportPayload, ItemView, PackagingType, VendorInfo,
    export::file_safe,
    models::default_invoice_number,
    quantity::{format_money, parse_amount, parse_count},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of a spreadsheet request. Older callers wrap everything in an
/// `invoiceData` object; newer ones send the fields at the top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenerateInvoiceRequest {
    Wrapped {
        #[serde(rename = "invoiceData")]
        invoice_data: InvoiceData,
    },
    Unwrapped(InvoiceData),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub vendor_code: Option<String>,
    #[serde(default)]
    pub vendor_address: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<ProductLine>>,
    #[serde(default)]
    pub items: Option<Vec<ProductLine>>,
}

/// One product as a client sent it. Numeric fields may arrive as JSON numbers
/// or as text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hsn: Option<String>,
    #[serde(default)]
    pub packaging_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub total_quantity: Value,
    #[serde(default)]
    pub final_amount: Value,
    #[serde(default)]
    pub total: Value,
    #[serde(default)]
    pub purchase_price: Value,
    #[serde(default)]
    pub mrp: Value,
    #[serde(default)]
    pub opening_stock: Value,
}

/// Normalized invoice ready for the spreadsheet layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub date: String,
    pub vendor_name: String,
    pub vendor_code: Option<String>,
    pub vendor_address: Option<String>,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub products: Vec<ExportItem>,
}

impl GenerateInvoiceRequest {
    pub fn into_data(self) -> InvoiceData {
        match self {
            Self::Wrapped { invoice_data } => invoice_data,
            Self::Unwrapped(data) => data,
        }
    }

    pub fn into_document(self, now: DateTime<Utc>) -> AnyResult<InvoiceDocument> {
        let data = self.into_data();

        let vendor_name = non_blank(data.vendor_name)
            .ok_or_else(|| anyhow::anyhow!("Vendor name is required"))?;
        let products = data
            .products
            .or(data.items)
            .filter(|products| !products.is_empty())
            .ok_or_else(|| anyhow::anyhow!("No invoice data provided"))?;

        Ok(InvoiceDocument {
            invoice_number: non_blank(data.invoice_number)
                .unwrap_or_else(|| default_invoice_number(now)),
            date: non_blank(data.date).unwrap_or_else(|| now.date_naive().to_string()),
            vendor_name,
            vendor_code: non_blank(data.vendor_code),
            vendor_address: non_blank(data.vendor_address),
            customer_name: non_blank(data.customer_name)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            customer_address: non_blank(data.customer_address),
            products: products.into_iter().map(ProductLine::into_export_item).collect(),
        })
    }
}

impl ProductLine {
    pub fn into_export_item(self) -> ExportItem {
        let total_quantity = count_from(&self.total_quantity);
        let final_amount = amount_from(&self.final_amount);
        let total = match amount_from(&self.total) {
            total if total.is_zero() => final_amount,
            total => total,
        };
        let quantity = non_blank(self.quantity).unwrap_or_else(|| {
            let units = if total_quantity == 0 { 1 } else { total_quantity };
            format!("{units} units")
        });
        let packaging_type = non_blank(self.packaging_type)
            .map(|raw| PackagingType::from_wire(&raw))
            .unwrap_or_default();

        ExportItem {
            item_name: self.item_name.unwrap_or_default(),
            item_code: self.item_code.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            hsn: self.hsn.unwrap_or_default(),
            packaging_type,
            quantity,
            total_quantity,
            final_amount,
            total,
            purchase_price: format_money(amount_from(&self.purchase_price)),
            mrp: amount_from(&self.mrp),
            opening_stock: count_from(&self.opening_stock),
        }
    }
}

impl InvoiceDocument {
    pub fn from_payload(payload: ExportPayload) -> Self {
        Self {
            invoice_number: payload.invoice_number,
            date: payload.date.to_string(),
            vendor_name: payload.vendor_name,
            vendor_code: payload.vendor_code,
            vendor_address: None,
            customer_name: NOT_AVAILABLE.to_string(),
            customer_address: None,
            products: payload.products,
        }
    }

    pub fn total(&self) -> Decimal {
        self.products
            .iter()
            .map(|product| product.total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Attachment name with anything outside `[A-Za-z0-9_-]` replaced.
    pub fn attachment_name(&self) -> String {
        format!("Invoice-{}.xlsx", file_safe(&self.invoice_number))
    }
}

/// Draft as shown to an editing client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub vendor_info: VendorInfo,
    pub items: Vec<ItemView>,
    pub total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftResponse {
    pub file_name: String,
    pub location: String,
    pub bytes_written: usize,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn amount_from(value: &Value) -> Decimal {
    match value {
        Value::Number(number) => parse_amount(&number.to_string()),
        Value::String(text) => parse_amount(text),
        _ => Decimal::ZERO,
    }
}

fn count_from(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .unwrap_or_else(|| parse_count(&number.to_string())),
        Value::String(text) => parse_count(text),
        _ => 0,
    }
}
