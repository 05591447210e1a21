use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How an item is packed. Values outside the known set keep their wire text
/// and count as plain units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackagingType {
    #[default]
    Simple,
    Carton,
    Pieces,
    BoxPiecesPacks,
    Unrecognized(String),
}

impl PackagingType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Simple => "simple",
            Self::Carton => "carton",
            Self::Pieces => "pieces",
            Self::BoxPiecesPacks => "boxPiecesPacks",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "simple" => Self::Simple,
            "carton" => Self::Carton,
            "pieces" => Self::Pieces,
            "boxPiecesPacks" => Self::BoxPiecesPacks,
            _ => Self::Unrecognized(value.to_string()),
        }
    }
}

impl From<String> for PackagingType {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<PackagingType> for String {
    fn from(value: PackagingType) -> Self {
        match value {
            PackagingType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One invoice row as the user entered it. Numeric inputs stay as text and are
/// interpreted by [`crate::quantity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: u64,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_code: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub hsn: String,
    #[serde(default)]
    pub packaging_type: PackagingType,
    #[serde(default)]
    pub total_units: String,
    #[serde(default)]
    pub units_per_pack: String,
    #[serde(default)]
    pub packs_per_unit: String,
    #[serde(default)]
    pub final_amount: String,
    #[serde(default)]
    pub mrp: String,
    #[serde(default)]
    pub opening_stock: String,
    #[serde(default = "default_auto_calculate_stock")]
    pub auto_calculate_stock: bool,
}

impl ItemRecord {
    pub fn empty(id: u64) -> Self {
        Self {
            id,
            item_name: String::new(),
            item_code: String::new(),
            category: String::new(),
            hsn: String::new(),
            packaging_type: PackagingType::Simple,
            total_units: String::new(),
            units_per_pack: String::new(),
            packs_per_unit: String::new(),
            final_amount: String::new(),
            mrp: String::new(),
            opening_stock: String::new(),
            auto_calculate_stock: true,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.item_name.trim().is_empty()
    }
}

fn default_auto_calculate_stock() -> bool {
    true
}

/// A single-field edit addressed to one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ItemUpdate {
    ItemName(String),
    ItemCode(String),
    Category(String),
    Hsn(String),
    PackagingType(PackagingType),
    TotalUnits(String),
    UnitsPerPack(String),
    PacksPerUnit(String),
    FinalAmount(String),
    Mrp(String),
    OpeningStock(String),
    AutoCalculateStock(bool),
}

impl ItemUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::ItemName(_) => "itemName",
            Self::ItemCode(_) => "itemCode",
            Self::Category(_) => "category",
            Self::Hsn(_) => "hsn",
            Self::PackagingType(_) => "packagingType",
            Self::TotalUnits(_) => "totalUnits",
            Self::UnitsPerPack(_) => "unitsPerPack",
            Self::PacksPerUnit(_) => "packsPerUnit",
            Self::FinalAmount(_) => "finalAmount",
            Self::Mrp(_) => "mrp",
            Self::OpeningStock(_) => "openingStock",
            Self::AutoCalculateStock(_) => "autoCalculateStock",
        }
    }

    /// Fields that feed the total-quantity derivation.
    pub fn affects_quantity(&self) -> bool {
        matches!(
            self,
            Self::PackagingType(_)
                | Self::TotalUnits(_)
                | Self::UnitsPerPack(_)
                | Self::PacksPerUnit(_)
        )
    }

    pub(crate) fn apply(self, item: &mut ItemRecord) {
        match self {
            Self::ItemName(value) => item.item_name = value,
            Self::ItemCode(value) => item.item_code = value,
            Self::Category(value) => item.category = value,
            Self::Hsn(value) => item.hsn = value,
            Self::PackagingType(value) => item.packaging_type = value,
            Self::TotalUnits(value) => item.total_units = value,
            Self::UnitsPerPack(value) => item.units_per_pack = value,
            Self::PacksPerUnit(value) => item.packs_per_unit = value,
            Self::FinalAmount(value) => item.final_amount = value,
            Self::Mrp(value) => item.mrp = value,
            Self::OpeningStock(value) => item.opening_stock = value,
            Self::AutoCalculateStock(value) => item.auto_calculate_stock = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorInfo {
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_code: String,
    pub invoice_number: String,
    pub date: NaiveDate,
}

impl VendorInfo {
    pub fn new_at(now: DateTime<Utc>) -> Self {
        Self {
            vendor_name: String::new(),
            vendor_code: String::new(),
            invoice_number: default_invoice_number(now),
            date: now.date_naive(),
        }
    }

    pub fn ensure_exportable(&self) -> Result<(), CoreError> {
        if self.vendor_name.trim().is_empty() {
            return Err(CoreError::VendorNameRequired);
        }

        Ok(())
    }
}

/// `INV-` followed by the last six digits of the epoch milliseconds.
pub fn default_invoice_number(now: DateTime<Utc>) -> String {
    format!("INV-{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum VendorUpdate {
    VendorName(String),
    VendorCode(String),
    InvoiceNumber(String),
    Date(NaiveDate),
}

impl VendorUpdate {
    pub(crate) fn apply(self, vendor: &mut VendorInfo) {
        match self {
            Self::VendorName(value) => vendor.vendor_name = value,
            Self::VendorCode(value) => vendor.vendor_code = value,
            Self::InvoiceNumber(value) => vendor.invoice_number = value,
            Self::Date(value) => vendor.date = value,
        }
    }
}
