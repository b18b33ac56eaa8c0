//! # Order Repository
//!
//! Checkout and order history.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    checkout(user, address)                              │
//! │                                                                         │
//! │  validate address ──✗──► 400, nothing written                          │
//! │       │                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐  │
//! │  │  load active cart lines (current price, name, label)             │  │
//! │  │       └── no lines ──✗──► EmptyCart (rollback)                    │  │
//! │  │  INSERT order (status = processing, total = Σ qty × price)       │  │
//! │  │  for each line:                                                  │  │
//! │  │       UPDATE sizes SET stock = stock - q WHERE stock >= q        │  │
//! │  │       └── 0 rows ──✗──► InsufficientStock (rollback everything)  │  │
//! │  │       INSERT order_line (name, label, unit price snapshot)       │  │
//! │  │  UPDATE carts SET active = 0                                     │  │
//! │  COMMIT ────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales counters are not touched at checkout. They follow the `delivered`
//! status (see [`OrderRepository::update_status`]).

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use crate::repository::product::recompute_sales_counters_for_order;
use crate::repository::size::reduce_stock;
use crate::repository::{new_id, timestamp};
use styleyoung_core::cart::{cart_total, PricedLine};
use styleyoung_core::validation::validate_address;
use styleyoung_core::{
    CoreError, Money, Order, OrderLine, OrderStatus, OrderWithLines, SizeLabel,
};

const ORDER_COLUMNS: &str = "id, user_id, total_cents, status, address, created_at, updated_at";

const LINE_COLUMNS: &str = r#"
    id, order_id, product_id, size_id, product_name, size_label,
    quantity, unit_price_cents, created_at
"#;

/// A cart line as checkout sees it: current price and stock context.
#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    product_id: String,
    product_name: String,
    size_id: String,
    size_label: SizeLabel,
    quantity: i64,
    price_cents: i64,
}

/// Result of an admin status change.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusChange {
    pub order: Order,
    pub previous: OrderStatus,
    /// Whether the products' sales counters were recomputed.
    pub counters_recomputed: bool,
}

/// Repository for orders and order lines.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Turns the user's active cart into an order.
    ///
    /// ## Returns
    /// * `Ok(OrderWithLines)` - order created, stock taken, cart retired
    /// * `Err(DbError::Rule(EmptyCart))` - no active cart or no lines
    /// * `Err(DbError::Rule(InsufficientStock))` - a line cannot be filled;
    ///   no order, stock change or cart change is kept
    /// * `Err(DbError::Rule(Validation))` - blank or oversized address
    pub async fn checkout(&self, user_id: &str, address: &str) -> DbResult<OrderWithLines> {
        validate_address(address).map_err(CoreError::from)?;
        let address = address.trim().to_string();

        debug!(user_id = %user_id, "Starting checkout");

        // Dropping `tx` on any early return rolls back every write below.
        let mut tx = begin_write(&self.pool).await?;

        let cart_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM carts WHERE user_id = ?1 AND active = 1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let cart_id = cart_id.ok_or(CoreError::EmptyCart)?;

        let lines = sqlx::query_as::<_, CheckoutLine>(
            r#"
            SELECT
                cl.product_id,
                p.name AS product_name,
                cl.size_id,
                s.label AS size_label,
                cl.quantity,
                p.price_cents
            FROM cart_lines cl
            INNER JOIN products p ON p.id = cl.product_id
            INNER JOIN sizes s ON s.id = cl.size_id
            WHERE cl.cart_id = ?1
            ORDER BY cl.created_at, cl.rowid
            "#,
        )
        .bind(&cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let priced: Vec<PricedLine> = lines
            .iter()
            .map(|l| PricedLine::new(Money::from_cents(l.price_cents), l.quantity))
            .collect();
        let total = cart_total(&priced);

        let now = Utc::now();
        let ts = timestamp(now);
        let order = Order {
            id: new_id(),
            user_id: user_id.to_string(),
            total_cents: total.cents(),
            status: OrderStatus::Processing,
            address,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total_cents, status, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.total_cents)
        .bind(order.status.as_str())
        .bind(&order.address)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;

        let mut order_lines = Vec::with_capacity(lines.len());
        for line in lines {
            if !reduce_stock(&mut tx, &line.size_id, line.quantity).await? {
                let available: i64 = sqlx::query_scalar("SELECT stock FROM sizes WHERE id = ?1")
                    .bind(&line.size_id)
                    .fetch_one(&mut *tx)
                    .await?;

                warn!(
                    user_id = %user_id,
                    product = %line.product_name,
                    size = %line.size_label,
                    available,
                    requested = line.quantity,
                    "Checkout rejected: insufficient stock"
                );

                return Err(CoreError::InsufficientStock {
                    product: line.product_name,
                    size: line.size_label.to_string(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }

            let order_line = OrderLine {
                id: new_id(),
                order_id: order.id.clone(),
                product_id: line.product_id,
                size_id: line.size_id,
                product_name: line.product_name,
                size_label: line.size_label,
                quantity: line.quantity,
                unit_price_cents: line.price_cents,
                created_at: now,
            };
            insert_line(&mut tx, &order_line, &ts).await?;
            order_lines.push(order_line);
        }

        sqlx::query("UPDATE carts SET active = 0 WHERE id = ?1")
            .bind(&cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.total(),
            lines = order_lines.len(),
            "Order placed"
        );

        Ok(OrderWithLines {
            order,
            lines: order_lines,
        })
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order with its lines.
    pub async fn get_with_lines(&self, id: &str) -> DbResult<Option<OrderWithLines>> {
        match self.get_by_id(id).await? {
            Some(order) => Ok(Some(self.attach_lines(order).await?)),
            None => Ok(None),
        }
    }

    /// Gets one of the user's own orders. Orders of other users are
    /// reported as missing.
    pub async fn get_for_user(&self, user_id: &str, id: &str) -> DbResult<Option<OrderWithLines>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?1 AND user_id = ?2",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(order) => Ok(Some(self.attach_lines(order).await?)),
            None => Ok(None),
        }
    }

    /// The user's order history, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<OrderWithLines>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut history = Vec::with_capacity(orders.len());
        for order in orders {
            history.push(self.attach_lines(order).await?);
        }
        Ok(history)
    }

    /// All orders, newest first, optionally of one status.
    pub async fn list_all(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let orders = match status {
            Some(status) => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {} FROM orders WHERE status = ?1 ORDER BY created_at DESC, rowid DESC",
                    ORDER_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
                    ORDER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    /// The `limit` most recent orders.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            ORDER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lines of an order in checkout order.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(&format!(
            "SELECT {} FROM order_lines WHERE order_id = ?1 ORDER BY created_at, rowid",
            LINE_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Moves an order to `status`.
    ///
    /// Any known status may follow any other. When the change enters or
    /// leaves `delivered`, the sales counters of the order's products are
    /// recomputed in the same transaction. Cancelling does not restock.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<OrderStatusChange> {
        let mut tx = begin_write(&self.pool).await?;

        let previous: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let previous = previous.ok_or_else(|| DbError::not_found("Order", id))?;

        sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status.as_str())
            .bind(timestamp(Utc::now()))
            .execute(&mut *tx)
            .await?;

        let counters_recomputed = previous.affects_sales_count(status);
        if counters_recomputed {
            recompute_sales_counters_for_order(&mut tx, id).await?;
        }

        tx.commit().await?;

        info!(
            order_id = %id,
            from = %previous,
            to = %status,
            counters_recomputed,
            "Order status changed"
        );

        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        Ok(OrderStatusChange {
            order,
            previous,
            counters_recomputed,
        })
    }

    /// Counts orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn attach_lines(&self, order: Order) -> DbResult<OrderWithLines> {
        let lines = self.lines(&order.id).await?;
        Ok(OrderWithLines { order, lines })
    }
}

async fn insert_line(conn: &mut SqliteConnection, line: &OrderLine, ts: &str) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_lines (
            id, order_id, product_id, size_id, product_name, size_label,
            quantity, unit_price_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&line.id)
    .bind(&line.order_id)
    .bind(&line.product_id)
    .bind(&line.size_id)
    .bind(&line.product_name)
    .bind(line.size_label.as_str())
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(ts)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use crate::Database;
    use styleyoung_core::{Product, Size, User};

    const ADDRESS: &str = "Calle 10 # 43-12, Medellín";

    struct Shop {
        db: Database,
        product: Product,
        size_m: Size,
        user: User,
    }

    async fn shop(stock: i64) -> Shop {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Ropa Casual").await;
        let product = test_support::product(&db, &category, "Camiseta Básica", 4_500_000).await;
        let size_m = test_support::size(&db, &product.id, SizeLabel::M, stock).await;
        let user = test_support::user(&db, "laura").await;
        Shop {
            db,
            product,
            size_m,
            user,
        }
    }

    async fn fill_cart(s: &Shop, user: &User, quantity: i64) {
        let cart = s.db.carts().active_for_user(&user.id).await.unwrap();
        s.db.carts()
            .add_line(&cart.id, &s.product.id, &s.size_m.id, quantity)
            .await
            .unwrap();
    }

    async fn sales_count(s: &Shop) -> i64 {
        s.db.products()
            .get_by_id(&s.product.id)
            .await
            .unwrap()
            .unwrap()
            .sales_count
    }

    async fn stock(s: &Shop) -> i64 {
        s.db.sizes().get_by_id(&s.size_m.id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_checkout_creates_order_and_takes_stock() {
        let s = shop(10).await;
        fill_cart(&s, &s.user, 2).await;

        let placed = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();

        assert_eq!(placed.order.total_cents, 9_000_000);
        assert_eq!(placed.order.status, OrderStatus::Processing);
        assert_eq!(placed.lines.len(), 1);
        assert_eq!(placed.lines[0].quantity, 2);
        assert_eq!(placed.lines[0].unit_price_cents, 4_500_000);
        assert_eq!(placed.lines[0].size_label, SizeLabel::M);
        assert_eq!(stock(&s).await, 8);
        assert_eq!(s.db.orders().count().await.unwrap(), 1);

        // Cart retired; a fresh one is handed out next time
        let fresh = s.db.carts().active_for_user(&s.user.id).await.unwrap();
        let view = s.db.carts().view(&fresh.id).await.unwrap();
        assert!(view.is_empty());

        // Checkout leaves the sales counter alone
        let product = s.db.products().get_by_id(&s.product.id).await.unwrap().unwrap();
        assert_eq!(product.sales_count, 0);
    }

    #[tokio::test]
    async fn test_order_keeps_price_snapshot() {
        let s = shop(10).await;
        fill_cart(&s, &s.user, 1).await;
        let placed = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();

        sqlx::query("UPDATE products SET price_cents = 1 WHERE id = ?1")
            .bind(&s.product.id)
            .execute(s.db.pool())
            .await
            .unwrap();

        let stored = s
            .db
            .orders()
            .get_with_lines(&placed.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.order.total_cents, 4_500_000);
        assert_eq!(stored.lines[0].unit_price_cents, 4_500_000);
        assert_eq!(stored.lines[0].product_name, "Camiseta Básica");
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let s = shop(10).await;

        // No cart at all
        let err = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::EmptyCart)));

        // An active but empty cart
        s.db.carts().active_for_user(&s.user.id).await.unwrap();
        let err = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::EmptyCart)));

        assert_eq!(s.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_address_rejected() {
        let s = shop(10).await;
        fill_cart(&s, &s.user, 1).await;

        let err = s.db.orders().checkout(&s.user.id, "   ").await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
        assert_eq!(s.db.orders().count().await.unwrap(), 0);
        assert_eq!(stock(&s).await, 10);
    }

    #[tokio::test]
    async fn test_second_checkout_beyond_stock_rolls_back() {
        let s = shop(3).await;
        let other = test_support::user(&s.db, "carlos").await;

        // Both carts pass the soft check while stock is still 3
        fill_cart(&s, &s.user, 2).await;
        fill_cart(&s, &other, 2).await;

        s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();
        assert_eq!(stock(&s).await, 1);

        let err = s.db.orders().checkout(&other.id, ADDRESS).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));

        assert_eq!(stock(&s).await, 1);
        assert_eq!(s.db.orders().count().await.unwrap(), 1);

        // The losing cart is still active and intact
        let cart = s.db.carts().active_for_user(&other.id).await.unwrap();
        let view = s.db.carts().view(&cart.id).await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_delivered_orders_drive_sales_counter() {
        let s = shop(20).await;

        fill_cart(&s, &s.user, 2).await;
        let first = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();
        fill_cart(&s, &s.user, 3).await;
        let second = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();
        fill_cart(&s, &s.user, 4).await;
        s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap(); // stays processing

        let orders = s.db.orders();
        let change = orders
            .update_status(&first.order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert!(change.counters_recomputed);
        assert_eq!(change.previous, OrderStatus::Processing);
        orders
            .update_status(&second.order.id, OrderStatus::Delivered)
            .await
            .unwrap();

        assert_eq!(sales_count(&s).await, 5);

        // Full recount agrees and ignores the processing order
        let updated = s.db.products().recompute_all_sales_counters().await.unwrap();
        assert_eq!(updated, 1);
        assert_eq!(sales_count(&s).await, 5);

        // Leaving delivered takes the units back out
        orders
            .update_status(&second.order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(sales_count(&s).await, 2);

        let change = orders
            .update_status(&first.order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert!(!change.counters_recomputed);
    }

    #[tokio::test]
    async fn test_history_is_per_user() {
        let s = shop(10).await;
        let other = test_support::user(&s.db, "carlos").await;

        fill_cart(&s, &s.user, 1).await;
        let first = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();
        fill_cart(&s, &s.user, 1).await;
        let second = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();

        let history = s.db.orders().list_for_user(&s.user.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].order.id, second.order.id);
        assert_eq!(history[1].order.id, first.order.id);
        assert_eq!(history[0].lines.len(), 1);

        assert!(s
            .db
            .orders()
            .get_for_user(&other.id, &first.order.id)
            .await
            .unwrap()
            .is_none());
        assert!(s.db.orders().list_for_user(&other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_by_status() {
        let s = shop(10).await;
        fill_cart(&s, &s.user, 1).await;
        let placed = s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();
        fill_cart(&s, &s.user, 1).await;
        s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();

        s.db.orders()
            .update_status(&placed.order.id, OrderStatus::Shipped)
            .await
            .unwrap();

        assert_eq!(s.db.orders().list_all(None).await.unwrap().len(), 2);
        let shipped = s
            .db
            .orders()
            .list_all(Some(OrderStatus::Shipped))
            .await
            .unwrap();
        assert_eq!(shipped.len(), 1);
        assert_eq!(shipped[0].id, placed.order.id);

        assert_eq!(s.db.orders().recent(1).await.unwrap().len(), 1);
        assert!(matches!(
            s.db.orders()
                .update_status("missing", OrderStatus::Shipped)
                .await,
            Err(DbError::NotFound { .. })
        ));
    }

    async fn file_db(dir: &tempfile::TempDir) -> Database {
        Database::new(crate::DbConfig::new(dir.path().join("shop.db")).max_connections(8))
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_checkouts_all_commit() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_db(&dir).await;
        let category = test_support::category(&db, "Ropa Casual").await;

        let mut buyers = Vec::new();
        for i in 0..8 {
            let product =
                test_support::product(&db, &category, &format!("Camiseta {}", i), 4_500_000).await;
            let size = test_support::size(&db, &product.id, SizeLabel::M, 100).await;
            let user = test_support::user(&db, &format!("cliente{}", i)).await;
            let cart = db.carts().active_for_user(&user.id).await.unwrap();
            db.carts().add_line(&cart.id, &product.id, &size.id, 1).await.unwrap();
            buyers.push((user, size));
        }

        let handles: Vec<_> = buyers
            .iter()
            .map(|(user, _)| {
                let db = db.clone();
                let user_id = user.id.clone();
                tokio::spawn(async move { db.orders().checkout(&user_id, ADDRESS).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(db.orders().count().await.unwrap(), 8);
        for (_, size) in &buyers {
            assert_eq!(db.sizes().get_by_id(&size.id).await.unwrap().unwrap().stock, 99);
        }
        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_checkouts_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_db(&dir).await;
        let category = test_support::category(&db, "Ropa Casual").await;
        let product = test_support::product(&db, &category, "Jean Slim", 12_000_000).await;
        let size = test_support::size(&db, &product.id, SizeLabel::M, 5).await;

        let mut users = Vec::new();
        for i in 0..8 {
            let user = test_support::user(&db, &format!("cliente{}", i)).await;
            let cart = db.carts().active_for_user(&user.id).await.unwrap();
            db.carts().add_line(&cart.id, &product.id, &size.id, 1).await.unwrap();
            users.push(user);
        }

        let handles: Vec<_> = users
            .iter()
            .map(|user| {
                let db = db.clone();
                let user_id = user.id.clone();
                tokio::spawn(async move { db.orders().checkout(&user_id, ADDRESS).await })
            })
            .collect();

        let mut placed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => placed += 1,
                Err(err) => assert!(
                    matches!(err, DbError::Rule(CoreError::InsufficientStock { .. })),
                    "unexpected error: {err:?}"
                ),
            }
        }

        assert_eq!(placed, 5);
        assert_eq!(db.orders().count().await.unwrap(), 5);
        assert_eq!(db.sizes().get_by_id(&size.id).await.unwrap().unwrap().stock, 0);
        db.close().await;
    }

    #[tokio::test]
    async fn test_product_in_order_cannot_be_deleted() {
        let s = shop(10).await;
        fill_cart(&s, &s.user, 1).await;
        s.db.orders().checkout(&s.user.id, ADDRESS).await.unwrap();

        let err = s.db.products().delete(&s.product.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
