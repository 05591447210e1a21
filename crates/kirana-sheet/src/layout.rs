use kirana_core::{ExportItem, quantity::parse_amount};
use kirana_platform::InvoiceDocument;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::writer::{CellStyle, Col, Row, TabularWriter};

const NOT_AVAILABLE: &str = "N/A";
const LAST_COL: Col = 9;
const TOTAL_LABEL_LAST_COL: Col = 5;
const TOTAL_AMOUNT_COL: Col = 6;

pub const COLUMNS: [(&str, f64); 10] = [
    ("Item Name", 25.0),
    ("Item Code", 12.0),
    ("Category", 15.0),
    ("HSN", 12.0),
    ("Packaging Type", 15.0),
    ("Quantity", 20.0),
    ("Final Amount", 12.0),
    ("Purchase Price", 15.0),
    ("MRP", 10.0),
    ("Opening Stock", 12.0),
];

/// Lays an invoice out on `sheet`: title and party details, the product
/// table, then the grand total. Returns the row index of the total line.
pub fn render_invoice<W: TabularWriter>(
    sheet: &mut W,
    invoice: &InvoiceDocument,
) -> Result<Row, W::Error> {
    for (col, (_, width)) in (0..).zip(COLUMNS) {
        sheet.set_column_width(col, width)?;
    }

    let mut row: Row = 0;
    sheet.merge_text(row, 0, LAST_COL, "INVOICE", CellStyle::Title)?;
    row += 1;

    let mut header_lines = vec![
        (format!("Invoice Number: {}", invoice.invoice_number), CellStyle::Plain),
        (format!("Date: {}", invoice.date), CellStyle::Plain),
        ("Vendor Details:".to_string(), CellStyle::Heading),
        (format!("Name: {}", invoice.vendor_name), CellStyle::Plain),
    ];
    if let Some(code) = &invoice.vendor_code {
        header_lines.push((format!("Code: {code}"), CellStyle::Plain));
    }
    header_lines.extend([
        (
            format!("Address: {}", or_not_available(invoice.vendor_address.as_deref())),
            CellStyle::Plain,
        ),
        ("Customer Details:".to_string(), CellStyle::Heading),
        (format!("Name: {}", invoice.customer_name), CellStyle::Plain),
        (
            format!("Address: {}", or_not_available(invoice.customer_address.as_deref())),
            CellStyle::Plain,
        ),
    ]);
    for (text, style) in header_lines {
        sheet.merge_text(row, 0, LAST_COL, &text, style)?;
        row += 1;
    }

    row += 1;
    for (col, (title, _)) in (0..).zip(COLUMNS) {
        sheet.write_text(row, col, title, CellStyle::ColumnHeader)?;
    }
    row += 1;

    for product in &invoice.products {
        write_product(sheet, row, product)?;
        row += 1;
    }

    row += 1;
    sheet.merge_text(row, 0, TOTAL_LABEL_LAST_COL, "Total Amount", CellStyle::TotalLabel)?;
    sheet.write_number(row, TOTAL_AMOUNT_COL, to_f64(invoice.total()), CellStyle::TotalMoney)?;

    Ok(row)
}

fn write_product<W: TabularWriter>(
    sheet: &mut W,
    row: Row,
    product: &ExportItem,
) -> Result<(), W::Error> {
    let texts = [
        product.item_name.as_str(),
        or_not_available(Some(product.item_code.as_str())),
        or_not_available(Some(product.category.as_str())),
        or_not_available(Some(product.hsn.as_str())),
        product.packaging_type.as_str(),
        product.quantity.as_str(),
    ];
    for (col, text) in (0..).zip(texts) {
        sheet.write_text(row, col, text, CellStyle::Plain)?;
    }

    sheet.write_number(row, 6, to_f64(product.total), CellStyle::Money)?;
    sheet.write_number(
        row,
        7,
        to_f64(parse_amount(&product.purchase_price)),
        CellStyle::Money,
    )?;
    sheet.write_number(row, 8, to_f64(product.mrp), CellStyle::Money)?;
    sheet.write_number(row, 9, product.opening_stock as f64, CellStyle::Count)?;

    Ok(())
}

fn or_not_available(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => NOT_AVAILABLE,
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
