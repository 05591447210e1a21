use std::{collections::BTreeMap, convert::Infallible};

use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet, XlsxError,
};

pub type Row = u32;
pub type Col = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    Plain,
    Title,
    Heading,
    ColumnHeader,
    Money,
    Count,
    TotalLabel,
    TotalMoney,
}

/// Minimal cell-level surface the invoice layout needs from a spreadsheet
/// backend.
pub trait TabularWriter {
    type Error: std::error::Error + 'static;

    fn set_column_width(&mut self, col: Col, width: f64) -> Result<(), Self::Error>;

    fn write_text(
        &mut self,
        row: Row,
        col: Col,
        text: &str,
        style: CellStyle,
    ) -> Result<(), Self::Error>;

    fn write_number(
        &mut self,
        row: Row,
        col: Col,
        value: f64,
        style: CellStyle,
    ) -> Result<(), Self::Error>;

    fn merge_text(
        &mut self,
        row: Row,
        first_col: Col,
        last_col: Col,
        text: &str,
        style: CellStyle,
    ) -> Result<(), Self::Error>;
}

/// `.xlsx` backend. Cells go into a detached worksheet that joins a workbook
/// only when the bytes are produced.
pub struct XlsxSheet {
    worksheet: Worksheet,
}

impl XlsxSheet {
    pub fn new(name: &str) -> Result<Self, XlsxError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(name)?;
        Ok(Self { worksheet })
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook.save_to_buffer()
    }
}

fn format_for(style: CellStyle) -> Format {
    let base = Format::new().set_border(FormatBorder::Thin);

    match style {
        CellStyle::Plain => base,
        CellStyle::Title => base
            .set_bold()
            .set_font_size(18)
            .set_align(FormatAlign::Center),
        CellStyle::Heading => base.set_bold(),
        CellStyle::ColumnHeader => base
            .set_bold()
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(0xE0E0E0)),
        CellStyle::Money => base
            .set_num_format("#,##0.00")
            .set_align(FormatAlign::Right),
        CellStyle::Count => base.set_num_format("#,##0").set_align(FormatAlign::Right),
        CellStyle::TotalLabel => base.set_bold().set_align(FormatAlign::Right),
        CellStyle::TotalMoney => base
            .set_bold()
            .set_num_format("#,##0.00")
            .set_align(FormatAlign::Right),
    }
}

impl TabularWriter for XlsxSheet {
    type Error = XlsxError;

    fn set_column_width(&mut self, col: Col, width: f64) -> Result<(), XlsxError> {
        self.worksheet.set_column_width(col, width)?;
        Ok(())
    }

    fn write_text(
        &mut self,
        row: Row,
        col: Col,
        text: &str,
        style: CellStyle,
    ) -> Result<(), XlsxError> {
        self.worksheet
            .write_string_with_format(row, col, text, &format_for(style))?;
        Ok(())
    }

    fn write_number(
        &mut self,
        row: Row,
        col: Col,
        value: f64,
        style: CellStyle,
    ) -> Result<(), XlsxError> {
        self.worksheet
            .write_number_with_format(row, col, value, &format_for(style))?;
        Ok(())
    }

    fn merge_text(
        &mut self,
        row: Row,
        first_col: Col,
        last_col: Col,
        text: &str,
        style: CellStyle,
    ) -> Result<(), XlsxError> {
        self.worksheet
            .merge_range(row, first_col, row, last_col, text, &format_for(style))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub value: CellValue,
    pub style: CellStyle,
}

/// In-memory backend that records what the layout wrote.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GridSheet {
    pub cells: BTreeMap<(Row, Col), GridCell>,
    pub merges: Vec<(Row, Col, Col)>,
    pub widths: BTreeMap<Col, f64>,
}

impl GridSheet {
    pub fn text(&self, row: Row, col: Col) -> Option<&str> {
        match self.cells.get(&(row, col)).map(|cell| &cell.value) {
            Some(CellValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn number(&self, row: Row, col: Col) -> Option<f64> {
        match self.cells.get(&(row, col)).map(|cell| &cell.value) {
            Some(CellValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn style(&self, row: Row, col: Col) -> Option<CellStyle> {
        self.cells.get(&(row, col)).map(|cell| cell.style)
    }

    pub fn last_row(&self) -> Option<Row> {
        self.cells.keys().map(|(row, _)| *row).max()
    }
}

impl TabularWriter for GridSheet {
    type Error = Infallible;

    fn set_column_width(&mut self, col: Col, width: f64) -> Result<(), Infallible> {
        self.widths.insert(col, width);
        Ok(())
    }

    fn write_text(
        &mut self,
        row: Row,
        col: Col,
        text: &str,
        style: CellStyle,
    ) -> Result<(), Infallible> {
        self.cells.insert(
            (row, col),
            GridCell {
                value: CellValue::Text(text.to_string()),
                style,
            },
        );
        Ok(())
    }

    fn write_number(
        &mut self,
        row: Row,
        col: Col,
        value: f64,
        style: CellStyle,
    ) -> Result<(), Infallible> {
        self.cells.insert(
            (row, col),
            GridCell {
                value: CellValue::Number(value),
                style,
            },
        );
        Ok(())
    }

    fn merge_text(
        &mut self,
        row: Row,
        first_col: Col,
        last_col: Col,
        text: &str,
        style: CellStyle,
    ) -> Result<(), Infallible> {
        self.merges.push((row, first_col, last_col));
        self.write_text(row, first_col, text, style)
    }
}
