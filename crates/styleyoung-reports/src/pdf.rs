//! # PDF Writer
//!
//! Landscape A4 tables via `printpdf` with the built-in Helvetica fonts.
//!
//! ## Page Layout (mm, origin bottom-left)
//! ```text
//! 210 ┌───────────────────────────────────────────────────────────┐
//!     │  Title                                             (y=192)│
//!     │  Generado: ...                                     (y=185)│
//!     │ ┌───────────────┬───────────────┬───────────────┐  (y=176)│
//!     │ │ header        │ header        │ header        │         │
//!     │ ├───────────────┼───────────────┼───────────────┤         │
//!     │ │ row           │ row           │ row           │  7mm    │
//!     │ │ row (striped) │               │               │         │
//!     │ └───────────────┴───────────────┴───────────────┘         │
//!     │  ...continues on a new page (header repeated) below 25mm  │
//!     │  Store name / Total de registros (last page)              │
//!   0 └───────────────────────────────────────────────────────────┘
//!     0                                                         297
//! ```

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect, Rgb,
};
use styleyoung_core::STORE_NAME;

use crate::{is_currency_column, Report, ReportResult, ReportWriter, HEADER_RGB, STRIPE_RGB};

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 7.0;
const TABLE_TOP: f32 = 176.0;
const BOTTOM_LIMIT: f32 = 25.0;
const BODY_SIZE: f32 = 9.0;
const CELL_PADDING: f32 = 1.5;

/// Approximate Helvetica glyph width at 9pt, used to clip long cells.
const CHAR_WIDTH_MM: f32 = 1.7;

/// Writes reports as a paginated PDF table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Drawing state for the table currently being laid out.
struct Canvas<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    column_width: f32,
    y: f32,
}

impl<'a> Canvas<'a> {
    fn new_page(&mut self, columns: &[String]) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.header(columns);
    }

    fn header(&mut self, columns: &[String]) {
        self.fill(HEADER_RGB, self.y);
        self.set_text_color(0xFFFFFF);
        for (col, name) in columns.iter().enumerate() {
            self.cell(col, name, &self.fonts.bold);
        }
        self.y -= ROW_HEIGHT;
    }

    fn row(&mut self, cells: &[String], striped: bool) {
        if striped {
            self.fill(STRIPE_RGB, self.y);
        }
        self.set_text_color(0x1E293B);
        for (col, text) in cells.iter().enumerate() {
            self.cell(col, text, &self.fonts.regular);
        }
        self.y -= ROW_HEIGHT;
    }

    /// Fills the band of one table row whose top edge is at `top`.
    fn fill(&self, rgb: u32, top: f32) {
        self.layer.set_fill_color(color(rgb));
        self.layer.add_rect(Rect::new(
            Mm(MARGIN),
            Mm(top - ROW_HEIGHT),
            Mm(PAGE_WIDTH - MARGIN),
            Mm(top),
        ));
    }

    fn cell(&self, col: usize, text: &str, font: &IndirectFontRef) {
        let x = MARGIN + col as f32 * self.column_width + CELL_PADDING;
        let baseline = self.y - ROW_HEIGHT + 2.2;
        self.layer.use_text(
            clip(text, self.column_width - 2.0 * CELL_PADDING),
            BODY_SIZE,
            Mm(x),
            Mm(baseline),
            font,
        );
    }

    fn set_text_color(&self, rgb: u32) {
        self.layer.set_fill_color(color(rgb));
    }

    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= size * 0.5;
    }
}

impl ReportWriter for PdfWriter {
    fn render(&self, report: &Report) -> ReportResult<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(&report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        };

        let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / report.columns.len().max(1) as f32;
        let mut canvas = Canvas {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            fonts: &fonts,
            column_width,
            y: PAGE_HEIGHT - MARGIN - 3.0,
        };

        canvas.set_text_color(HEADER_RGB);
        canvas.line(&report.title, 16.0, &fonts.bold);
        canvas.set_text_color(0x64748B);
        canvas.line(&report.generated_line(), 9.0, &fonts.regular);

        canvas.y = TABLE_TOP;
        canvas.header(&report.columns);

        let currency: Vec<bool> = report.columns.iter().map(|c| is_currency_column(c)).collect();

        for (i, record) in report.rows.iter().enumerate() {
            if canvas.y - ROW_HEIGHT < BOTTOM_LIMIT {
                canvas.new_page(&report.columns);
            }

            let cells: Vec<String> = report
                .columns
                .iter()
                .zip(&currency)
                .map(|(name, is_currency)| record.get(name).display(*is_currency))
                .collect();
            canvas.row(&cells, i % 2 == 1);
        }

        canvas.y = canvas.y.min(BOTTOM_LIMIT) - 6.0;
        canvas.set_text_color(0x64748B);
        canvas.line(STORE_NAME, 9.0, &fonts.bold);
        canvas.line(&report.count_line(), 9.0, &fonts.regular);
        drop(canvas);

        Ok(doc.save_to_bytes()?)
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

fn color(rgb: u32) -> Color {
    let channel = |shift: u32| ((rgb >> shift) & 0xFF) as f32 / 255.0;
    Color::Rgb(Rgb::new(channel(16), channel(8), channel(0), None))
}

/// Cuts `text` to fit `width_mm`, marking the cut with "...".
fn clip(text: &str, width_mm: f32) -> String {
    let max_chars = (width_mm / CHAR_WIDTH_MM).floor().max(4.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    #[test]
    fn test_clip() {
        assert_eq!(clip("Camiseta", 40.0), "Camiseta");
        let clipped = clip("Chaqueta de Cuero Premium Edición Limitada", 20.0);
        assert!(clipped.ends_with("..."));
        assert!(clipped.chars().count() <= 11);
    }

    #[test]
    fn test_color_channels() {
        match color(0xFF0000) {
            Color::Rgb(rgb) => {
                assert_eq!(rgb.r, 1.0);
                assert_eq!(rgb.g, 0.0);
                assert_eq!(rgb.b, 0.0);
            }
            other => panic!("unexpected color {:?}", other),
        }
    }

    #[test]
    fn test_empty_report_still_renders() {
        let report = Report::new("Pedidos", &["Cliente", "Total"], Vec::<Record>::new());
        let bytes = PdfWriter.render(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
