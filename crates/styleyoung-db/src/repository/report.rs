//! # Report Repository
//!
//! Read-only aggregates for the admin dashboard, the sales report and the
//! downloadable spreadsheet/PDF exports.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::timestamp;
use styleyoung_core::{
    CategorySales, DashboardSummary, OrderStatus, ProductSummary, SalesReport,
    DASHBOARD_RECENT_ORDERS, DASHBOARD_TOP_SELLERS, LOW_STOCK_THRESHOLD, REPORT_TOP_SELLERS,
};

/// One row of the orders export.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderReportRow {
    pub id: String,
    pub customer: String,
    pub email: String,
    pub status: OrderStatus,
    pub item_count: i64,
    pub total_cents: i64,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the sales export. Revenue sums the prices frozen on the
/// delivered order lines, so later price edits leave it unchanged.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesReportRow {
    pub product_id: String,
    pub name: String,
    pub category_name: String,
    /// Current catalog price
    pub price_cents: i64,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Admin dashboard figures as of now.
    pub async fn dashboard(&self) -> DbResult<DashboardSummary> {
        self.dashboard_at(Utc::now()).await
    }

    /// Dashboard figures with "this month" anchored at `now`.
    pub async fn dashboard_at(&self, now: DateTime<Utc>) -> DbResult<DashboardSummary> {
        let products = ProductRepository::new(self.pool.clone());
        let orders = OrderRepository::new(self.pool.clone());

        let (total_products, total_categories): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM products), (SELECT COUNT(*) FROM categories)",
        )
        .fetch_one(&self.pool)
        .await?;

        let low_stock_products: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT product_id) FROM sizes WHERE stock < ?1")
                .bind(LOW_STOCK_THRESHOLD)
                .fetch_one(&self.pool)
                .await?;

        let (month_revenue_cents, month_delivered_orders): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cents), 0), COUNT(*)
            FROM orders
            WHERE status = 'delivered' AND created_at >= ?1
            "#,
        )
        .bind(timestamp(month_start(now)))
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            total_products,
            total_orders: orders.count().await?,
            total_categories,
            low_stock_products,
            top_sellers: products.top_selling(DASHBOARD_TOP_SELLERS).await?,
            recent_orders: orders.recent(DASHBOARD_RECENT_ORDERS).await?,
            month_revenue_cents,
            month_delivered_orders,
        })
    }

    /// Top sellers plus units sold per category.
    pub async fn sales_report(&self) -> DbResult<SalesReport> {
        let top_sellers = ProductRepository::new(self.pool.clone())
            .top_selling(REPORT_TOP_SELLERS)
            .await?;

        let by_category = sqlx::query_as::<_, CategorySales>(
            r#"
            SELECT
                c.id AS category_id,
                c.name AS category_name,
                COALESCE(SUM(p.sales_count), 0) AS units_sold
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY units_sold DESC, c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(SalesReport {
            top_sellers,
            by_category,
        })
    }

    /// Every product for the products export, alphabetically.
    pub async fn product_rows(&self) -> DbResult<Vec<ProductSummary>> {
        let mut rows = ProductRepository::new(self.pool.clone())
            .list(&Default::default())
            .await?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Products with delivered sales, most units first.
    pub async fn sales_rows(&self) -> DbResult<Vec<SalesReportRow>> {
        let rows = sqlx::query_as::<_, SalesReportRow>(
            r#"
            SELECT
                p.id AS product_id,
                p.name,
                c.name AS category_name,
                p.price_cents,
                SUM(ol.quantity) AS units_sold,
                SUM(ol.quantity * ol.unit_price_cents) AS revenue_cents
            FROM order_lines ol
            INNER JOIN orders o ON o.id = ol.order_id
            INNER JOIN products p ON p.id = ol.product_id
            INNER JOIN categories c ON c.id = p.category_id
            WHERE o.status = 'delivered'
            GROUP BY p.id, p.name, c.name, p.price_cents
            ORDER BY units_sold DESC, revenue_cents DESC, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Orders for the orders export, newest first.
    pub async fn order_rows(&self, status: Option<OrderStatus>) -> DbResult<Vec<OrderReportRow>> {
        let rows = sqlx::query_as::<_, OrderReportRow>(
            r#"
            SELECT
                o.id,
                u.full_name AS customer,
                u.email,
                o.status,
                COALESCE((SELECT SUM(ol.quantity) FROM order_lines ol WHERE ol.order_id = o.id), 0)
                    AS item_count,
                o.total_cents,
                o.address,
                o.created_at
            FROM orders o
            INNER JOIN users u ON u.id = o.user_id
            WHERE ?1 IS NULL OR o.status = ?1
            ORDER BY o.created_at DESC, o.rowid DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// 00:00 UTC on the first day of `now`'s month.
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
