//! # StyleYoung Reports
//!
//! Renders admin exports (products, orders, sales) as styled documents.
//!
//! ## Rendering Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   rows: Vec<Record>  ──┐                                                │
//! │   columns: ["Nombre",  ├──► Report ──► dyn ReportWriter ──► Vec<u8>     │
//! │    "Precio", ...]     ──┘                  │                            │
//! │                                  ┌─────────┴─────────┐                  │
//! │                                  ▼                   ▼                  │
//! │                          SpreadsheetWriter       PdfWriter              │
//! │                              (.xlsx)               (.pdf)               │
//! │                                                                         │
//! │   generate_report() wraps the bytes with a timestamped filename and    │
//! │   the writer's content type, ready for an HTTP attachment.              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Document Layout (both writers)
//! 1. Title
//! 2. "Generado: dd/mm/YYYY HH:MM" line
//! 3. Header row (white bold text on indigo)
//! 4. Data rows with alternating light shading
//! 5. Footer with the store name and the record count
//!
//! Columns whose name mentions a price or total are rendered as currency.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use styleyoung_core::Money;
use thiserror::Error;

pub mod pdf;
pub mod xlsx;

pub use pdf::PdfWriter;
pub use xlsx::SpreadsheetWriter;

// =============================================================================
// Constants
// =============================================================================

/// Header fill (#6366f1).
pub const HEADER_RGB: u32 = 0x6366F1;

/// Fill for every other data row (#f8fafc).
pub const STRIPE_RGB: u32 = 0xF8FAFC;

/// Column names containing one of these are formatted as currency.
const CURRENCY_KEYWORDS: &[&str] = &["precio", "price", "total"];

// =============================================================================
// Errors
// =============================================================================

/// Report rendering failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report has no columns")]
    NoColumns,

    #[error("Unknown report format: {0}")]
    UnknownFormat(String),

    #[error("Spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

// =============================================================================
// Cell Values & Records
// =============================================================================

/// A single cell in a report row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Empty,
}

impl CellValue {
    /// Numeric view of the cell, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(n) => Some(*n as f64),
            CellValue::Decimal(n) => Some(*n),
            CellValue::Text(_) | CellValue::Empty => None,
        }
    }

    /// Plain-text rendering used by the PDF writer and for width estimates.
    pub fn display(&self, currency: bool) -> String {
        match (self, currency) {
            (CellValue::Empty, _) => String::new(),
            (CellValue::Text(s), _) => s.clone(),
            (value, true) => {
                let amount = value.as_number().unwrap_or_default();
                Money::from_cents((amount * 100.0).round() as i64).to_string()
            }
            (CellValue::Integer(n), false) => n.to_string(),
            (CellValue::Decimal(n), false) => format!("{:.2}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Integer(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Decimal(n)
    }
}

/// Money goes into reports in major units so spreadsheets can sum it.
impl From<Money> for CellValue {
    fn from(m: Money) -> Self {
        CellValue::Decimal(m.cents() as f64 / 100.0)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// One report row, keyed by column name.
///
/// ```rust
/// use styleyoung_reports::{CellValue, Record};
///
/// let row = Record::new().with("Nombre", "Camiseta").with("Stock", 12_i64);
/// assert_eq!(row.get("Stock"), &CellValue::Integer(12));
/// assert_eq!(row.get("Color"), &CellValue::Empty);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    cells: HashMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Value for `column`, or `Empty` when the row has none.
    pub fn get(&self, column: &str) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.cells.get(column).unwrap_or(EMPTY)
    }
}

// =============================================================================
// Report & Writer Trait
// =============================================================================

/// Everything a writer needs to lay out one document.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(title: impl Into<String>, columns: &[&str], rows: Vec<Record>) -> Self {
        Report {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            generated_at: Utc::now(),
        }
    }

    /// "Generado: 17/03/2024 15:42"
    pub fn generated_line(&self) -> String {
        format!("Generado: {}", self.generated_at.format("%d/%m/%Y %H:%M"))
    }

    /// "Total de registros: 12"
    pub fn count_line(&self) -> String {
        format!("Total de registros: {}", self.rows.len())
    }

    /// `report_YYYYmmdd_HHMMSS.<ext>`
    pub fn filename(&self, extension: &str) -> String {
        format!(
            "report_{}.{}",
            self.generated_at.format("%Y%m%d_%H%M%S"),
            extension
        )
    }
}

/// A document format the admin can download reports in.
pub trait ReportWriter: Send + Sync {
    /// Renders the whole document in memory.
    fn render(&self, report: &Report) -> ReportResult<Vec<u8>>;

    /// MIME type for the `Content-Type` header.
    fn content_type(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;
}

/// Whether a column should be rendered as money.
pub fn is_currency_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    CURRENCY_KEYWORDS.iter().any(|k| lower.contains(k))
}

// =============================================================================
// Formats
// =============================================================================

/// Format selector for download routes (`?format=xlsx|pdf`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Pdf,
}

impl ReportFormat {
    /// The writer for this format.
    pub fn writer(self) -> Box<dyn ReportWriter> {
        match self {
            ReportFormat::Xlsx => Box::new(SpreadsheetWriter),
            ReportFormat::Pdf => Box::new(PdfWriter),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            "pdf" => Ok(ReportFormat::Pdf),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// A rendered document ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Renders `rows` with `writer`, laying out `columns` in the given order.
pub fn generate_report(
    writer: &dyn ReportWriter,
    title: &str,
    rows: Vec<Record>,
    columns: &[&str],
) -> ReportResult<RenderedReport> {
    render_report(writer, &Report::new(title, columns, rows))
}

/// Like [`generate_report`] for an already assembled [`Report`].
pub fn render_report(writer: &dyn ReportWriter, report: &Report) -> ReportResult<RenderedReport> {
    if report.columns.is_empty() {
        return Err(ReportError::NoColumns);
    }

    let bytes = writer.render(report)?;

    tracing::debug!(
        title = %report.title,
        rows = report.rows.len(),
        format = writer.extension(),
        size = bytes.len(),
        "Rendered report"
    );

    Ok(RenderedReport {
        bytes,
        filename: report.filename(writer.extension()),
        content_type: writer.content_type(),
    })
}
