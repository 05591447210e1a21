pub mod layout;
pub mod writer;

use kirana_platform::InvoiceDocument;
use thiserror::Error;
use tracing::info;

pub use layout::{COLUMNS, render_invoice};
pub use writer::{CellStyle, GridSheet, TabularWriter, XlsxSheet};

pub const SHEET_NAME: &str = "Invoice";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Renders `invoice` into a single-sheet `.xlsx` workbook.
pub fn render_xlsx(invoice: &InvoiceDocument) -> Result<Vec<u8>, SheetError> {
    let mut sheet = XlsxSheet::new(SHEET_NAME)?;
    let total_row = render_invoice(&mut sheet, invoice)?;
    let bytes = sheet.into_bytes()?;

    info!(
        invoice_number = %invoice.invoice_number,
        products = invoice.products.len(),
        total_row,
        "rendered invoice workbook ({} bytes)",
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use kirana_core::{ExportItem, ItemRecord};

    use super::*;

    #[test]
    fn workbook_bytes_are_a_zip_package() {
        let record = ItemRecord {
            item_name: "Tea".to_string(),
            total_units: "20".to_string(),
            final_amount: "100".to_string(),
            ..ItemRecord::empty(1)
        };
        let invoice = InvoiceDocument {
            invoice_number: "INV-000042".to_string(),
            date: "2024-03-09".to_string(),
            vendor_name: "Sharma Traders".to_string(),
            vendor_code: Some("V001".to_string()),
            vendor_address: None,
            customer_name: "N/A".to_string(),
            customer_address: None,
            products: vec![ExportItem::from_record(&record)],
        };

        let bytes = render_xlsx(&invoice).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
