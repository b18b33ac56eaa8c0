//! # Spreadsheet Writer
//!
//! Excel (.xlsx) output via `rust_xlsxwriter`.
//!
//! ## Sheet Layout
//! ```text
//!        A              B            C
//!   1  ┌─────────────────────────────────────┐
//!      │ Title (merged across all columns)   │
//!   2  │ Generado: 17/03/2024 15:42          │
//!   3  │                                     │
//!   4  │ Nombre       │ Precio      │ Stock  │  ◄── indigo, white bold
//!   5  │ Camiseta     │ $45,000.00  │ 12     │
//!   6  │ Jean Slim    │ $120,000.00 │ 0      │  ◄── #f8fafc stripe
//!   7  │                                     │
//!   8  │ StyleYoung - Tienda Virtual de Ropa │
//!   9  │ Total de registros: 2               │
//!      └─────────────────────────────────────┘
//! ```

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use styleyoung_core::STORE_NAME;

use crate::{
    is_currency_column, CellValue, Report, ReportResult, ReportWriter, HEADER_RGB, STRIPE_RGB,
};

const SHEET_NAME: &str = "Reporte";
const HEADER_ROW: u32 = 3;
const MAX_COLUMN_WIDTH: usize = 50;
const CURRENCY_FORMAT: &str = "\"$\"#,##0.00";

/// Writes reports as a single-sheet workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetWriter;

/// Cell formats for one data row (plain or striped).
struct RowFormats {
    text: Format,
    currency: Format,
}

impl RowFormats {
    fn new(striped: bool) -> Self {
        let mut text = Format::new().set_border(FormatBorder::Thin);
        if striped {
            text = text.set_background_color(Color::RGB(STRIPE_RGB));
        }
        let currency = text.clone().set_num_format(CURRENCY_FORMAT);
        RowFormats { text, currency }
    }
}

impl ReportWriter for SpreadsheetWriter {
    fn render(&self, report: &Report) -> ReportResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        write_title(sheet, report)?;

        let header = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_RGB))
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center);

        let mut widths: Vec<usize> = report.columns.iter().map(|c| c.chars().count()).collect();

        for (col, name) in report.columns.iter().enumerate() {
            sheet.write_string_with_format(HEADER_ROW, col as u16, name, &header)?;
        }

        let plain = RowFormats::new(false);
        let striped = RowFormats::new(true);
        let currency_columns: Vec<bool> =
            report.columns.iter().map(|c| is_currency_column(c)).collect();

        for (i, record) in report.rows.iter().enumerate() {
            let row = HEADER_ROW + 1 + i as u32;
            let formats = if i % 2 == 1 { &striped } else { &plain };

            for (col, name) in report.columns.iter().enumerate() {
                let currency = currency_columns[col];
                let value = record.get(name);
                let c = col as u16;

                match value {
                    CellValue::Integer(_) | CellValue::Decimal(_) => {
                        let number = value.as_number().unwrap_or_default();
                        let format = if currency { &formats.currency } else { &formats.text };
                        sheet.write_number_with_format(row, c, number, format)?;
                    }
                    CellValue::Text(s) => {
                        sheet.write_string_with_format(row, c, s, &formats.text)?;
                    }
                    CellValue::Empty => {
                        sheet.write_blank(row, c, &formats.text)?;
                    }
                }

                widths[col] = widths[col].max(value.display(currency).chars().count());
            }
        }

        for (col, width) in widths.iter().enumerate() {
            let width = (width + 2).min(MAX_COLUMN_WIDTH);
            sheet.set_column_width(col as u16, width as f64)?;
        }

        let footer_row = HEADER_ROW + report.rows.len() as u32 + 2;
        let footer = Format::new().set_italic().set_font_color(Color::Gray);
        sheet.write_string_with_format(footer_row, 0, STORE_NAME, &footer)?;
        sheet.write_string_with_format(footer_row + 1, 0, report.count_line(), &footer)?;

        Ok(workbook.save_to_buffer()?)
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}

fn write_title(sheet: &mut Worksheet, report: &Report) -> ReportResult<()> {
    let title = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_font_color(Color::RGB(HEADER_RGB));
    let last_col = report.columns.len().saturating_sub(1) as u16;

    // A merge needs at least two cells
    if last_col > 0 {
        sheet.merge_range(0, 0, 0, last_col, &report.title, &title)?;
    } else {
        sheet.write_string_with_format(0, 0, &report.title, &title)?;
    }

    let subtitle = Format::new().set_italic().set_font_color(Color::Gray);
    sheet.write_string_with_format(1, 0, report.generated_line(), &subtitle)?;

    Ok(())
}
