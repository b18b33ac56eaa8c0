//! # Report Downloads
//!
//! ```text
//! GET /api/admin/reports/{kind}?format=xlsx|pdf[&status=delivered]
//!        │
//!        ├── kind: products | orders | sales
//!        ▼
//!   ReportRepository ──► Vec<Record> ──► ReportWriter::render (blocking pool)
//!        │
//!        ▼
//!   200 application/vnd.openxmlformats-... | application/pdf
//!       Content-Disposition: attachment; filename="report_20260118_143000.xlsx"
//! ```
//!
//! `status` only applies to the orders report.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use styleyoung_core::{Money, ProductSummary};
use styleyoung_db::{OrderReportRow, SalesReportRow};
use styleyoung_reports::{generate_report, Record, ReportFormat};
use tracing::info;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::admin::OrderListParams;
use crate::state::AppState;

const PRODUCT_COLUMNS: &[&str] = &[
    "Nombre", "Categoría", "Marca", "Color", "Precio", "Stock", "Vendidos",
];

const ORDER_COLUMNS: &[&str] = &[
    "Pedido", "Cliente", "Email", "Estado", "Artículos", "Total", "Dirección", "Fecha",
];

const SALES_COLUMNS: &[&str] = &[
    "Producto", "Categoría", "Precio", "Unidades Vendidas", "Total Vendido",
];

/// Which export to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Products,
    Orders,
    Sales,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Products => "Reporte de Productos",
            ReportKind::Orders => "Reporte de Pedidos",
            ReportKind::Sales => "Reporte de Ventas",
        }
    }
}

impl FromStr for ReportKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(ReportKind::Products),
            "orders" => Ok(ReportKind::Orders),
            "sales" => Ok(ReportKind::Sales),
            other => Err(ApiError::not_found("Report", other)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/reports/{kind}", get(download))
}

async fn download(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(kind): Path<String>,
    Query(params): Query<ReportParams>,
) -> ApiResult<Response> {
    let kind: ReportKind = kind.parse()?;
    let format = match params.format.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw.parse::<ReportFormat>()?,
        _ => ReportFormat::default(),
    };

    let reports = state.db.reports();
    let (columns, rows): (&'static [&'static str], Vec<Record>) = match kind {
        ReportKind::Products => (
            PRODUCT_COLUMNS,
            reports.product_rows().await?.iter().map(product_record).collect(),
        ),
        ReportKind::Orders => {
            let status = OrderListParams {
                status: params.status,
            }
            .status()?;
            (
                ORDER_COLUMNS,
                reports.order_rows(status).await?.iter().map(order_record).collect(),
            )
        }
        ReportKind::Sales => (
            SALES_COLUMNS,
            reports.sales_rows().await?.iter().map(sales_record).collect(),
        ),
    };

    let rendered = tokio::task::spawn_blocking(move || {
        generate_report(format.writer().as_ref(), kind.title(), rows, columns)
    })
    .await
    .map_err(|e| {
        tracing::error!("Report task failed: {}", e);
        ApiError::internal("Report rendering failed")
    })??;

    info!(
        admin = %admin.id,
        report = kind.title(),
        format = %format,
        bytes = rendered.bytes.len(),
        "Report downloaded"
    );

    Ok((
        [
            (header::CONTENT_TYPE, rendered.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", rendered.filename),
            ),
        ],
        rendered.bytes,
    )
        .into_response())
}

// =============================================================================
// Row Mapping
// =============================================================================

fn product_record(p: &ProductSummary) -> Record {
    Record::new()
        .with("Nombre", p.name.as_str())
        .with("Categoría", p.category_name.as_str())
        .with("Marca", p.brand.as_str())
        .with("Color", p.color.as_str())
        .with("Precio", p.price())
        .with("Stock", p.stock_total)
        .with("Vendidos", p.sales_count)
}

fn order_record(o: &OrderReportRow) -> Record {
    Record::new()
        .with("Pedido", o.id.as_str())
        .with("Cliente", o.customer.as_str())
        .with("Email", o.email.as_str())
        .with("Estado", o.status.as_str())
        .with("Artículos", o.item_count)
        .with("Total", Money::from_cents(o.total_cents))
        .with("Dirección", o.address.as_str())
        .with("Fecha", o.created_at.format("%d/%m/%Y %H:%M").to_string())
}

/// "Total Vendido" is what delivered orders actually charged.
fn sales_record(s: &SalesReportRow) -> Record {
    Record::new()
        .with("Producto", s.name.as_str())
        .with("Categoría", s.category_name.as_str())
        .with("Precio", Money::from_cents(s.price_cents))
        .with("Unidades Vendidas", s.units_sold)
        .with("Total Vendido", Money::from_cents(s.revenue_cents))
}
