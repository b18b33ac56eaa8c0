//! # Cart Repository
//!
//! Active carts and their lines.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cart Lifecycle                                 │
//! │                                                                         │
//! │  1. GET OR CREATE                                                      │
//! │     └── active_for_user() → INSERT OR IGNORE + SELECT                  │
//! │         (partial unique index: one active cart per user)               │
//! │                                                                         │
//! │  2. MUTATE                                                             │
//! │     └── add_line()             → upsert (cart, product, size)          │
//! │     └── update_line_quantity() → set quantity                          │
//! │     └── remove_line() / clear()                                        │
//! │     └── every mutation rewrites total_cents from current prices        │
//! │                                                                         │
//! │  3. RETIRE                                                             │
//! │     └── checkout (OrderRepository) flips active = 0                    │
//! │         next active_for_user() creates a fresh cart                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use crate::repository::{new_id, timestamp};
use styleyoung_core::cart::{cart_total, check_cart_capacity, merge_line_quantity, PricedLine};
use styleyoung_core::validation::validate_quantity;
use styleyoung_core::{Cart, CartLineView, CartView, CoreError, Money, SizeLabel};

const CART_COLUMNS: &str = "id, user_id, total_cents, active, created_at";

const LINE_SELECT: &str = r#"
    SELECT
        cl.id,
        cl.product_id,
        p.name AS product_name,
        p.primary_image,
        cl.size_id,
        s.label AS size_label,
        p.price_cents AS unit_price_cents,
        cl.quantity,
        cl.quantity * p.price_cents AS line_total_cents
    FROM cart_lines cl
    INNER JOIN products p ON p.id = cl.product_id
    INNER JOIN sizes s ON s.id = cl.size_id
"#;

/// Size row joined with its product's name, for stock checks.
#[derive(Debug, sqlx::FromRow)]
struct SizeStock {
    product_name: String,
    label: SizeLabel,
    stock: i64,
}

/// Repository for carts and cart lines.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Returns the user's active cart, creating an empty one if needed.
    ///
    /// Concurrent callers for the same user converge on one cart: the
    /// losing insert is ignored by the unique index and both read back the
    /// same row.
    pub async fn active_for_user(&self, user_id: &str) -> DbResult<Cart> {
        let mut conn = self.pool.acquire().await?;
        active_cart(&mut conn, user_id).await
    }

    /// Gets a cart by ID (active or retired).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(&format!(
            "SELECT {} FROM carts WHERE id = ?1",
            CART_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    /// The cart with its lines at current prices.
    pub async fn view(&self, cart_id: &str) -> DbResult<CartView> {
        let cart = self
            .get_by_id(cart_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", cart_id))?;

        let lines = sqlx::query_as::<_, CartLineView>(&format!(
            "{} WHERE cl.cart_id = ?1 ORDER BY cl.created_at, cl.rowid",
            LINE_SELECT
        ))
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CartView::new(cart, lines))
    }

    /// Adds `quantity` units of (product, size) to the cart.
    ///
    /// An existing line for the same pair grows by `quantity`; otherwise a
    /// new line is created. The merged quantity is checked against the
    /// size's current stock.
    ///
    /// ## Returns
    /// * `Err(DbError::Rule(SizeNotFound))` - size missing or of another product
    /// * `Err(DbError::Rule(InsufficientStock))` - merged quantity exceeds stock
    pub async fn add_line(
        &self,
        cart_id: &str,
        product_id: &str,
        size_id: &str,
        quantity: i64,
    ) -> DbResult<CartView> {
        debug!(cart_id = %cart_id, product_id = %product_id, size_id = %size_id, quantity, "Adding cart line");

        let mut tx = begin_write(&self.pool).await?;

        let size = size_stock(&mut tx, product_id, size_id).await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM cart_lines WHERE cart_id = ?1 AND product_id = ?2 AND size_id = ?3",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(size_id)
        .fetch_optional(&mut *tx)
        .await?;

        let line_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_lines WHERE cart_id = ?1")
            .bind(cart_id)
            .fetch_one(&mut *tx)
            .await?;

        check_cart_capacity(line_count as usize, existing.is_none())?;
        merge_line_quantity(
            &size.product_name,
            size.label,
            existing.unwrap_or(0),
            quantity,
            size.stock,
        )?;

        sqlx::query(
            r#"
            INSERT INTO cart_lines (id, cart_id, product_id, size_id, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (cart_id, product_id, size_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(new_id())
        .bind(cart_id)
        .bind(product_id)
        .bind(size_id)
        .bind(quantity)
        .bind(timestamp(Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Cart", cart_id),
            other => other,
        })?;

        refresh_total(&mut tx, cart_id).await?;
        tx.commit().await?;

        self.view(cart_id).await
    }

    /// Sets the quantity of one line. A quantity of 0 removes the line.
    pub async fn update_line_quantity(
        &self,
        cart_id: &str,
        line_id: &str,
        quantity: i64,
    ) -> DbResult<CartView> {
        if quantity == 0 {
            return self.remove_line(cart_id, line_id).await;
        }
        validate_quantity(quantity).map_err(CoreError::from)?;

        debug!(cart_id = %cart_id, line_id = %line_id, quantity, "Updating cart line");

        let mut tx = begin_write(&self.pool).await?;

        let line: Option<(String, String)> = sqlx::query_as(
            "SELECT product_id, size_id FROM cart_lines WHERE id = ?1 AND cart_id = ?2",
        )
        .bind(line_id)
        .bind(cart_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (product_id, size_id) = line.ok_or_else(|| DbError::not_found("CartLine", line_id))?;

        let size = size_stock(&mut tx, &product_id, &size_id).await?;
        merge_line_quantity(&size.product_name, size.label, 0, quantity, size.stock)?;

        sqlx::query("UPDATE cart_lines SET quantity = ?2 WHERE id = ?1")
            .bind(line_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

        refresh_total(&mut tx, cart_id).await?;
        tx.commit().await?;

        self.view(cart_id).await
    }

    /// Removes one line from the cart.
    pub async fn remove_line(&self, cart_id: &str, line_id: &str) -> DbResult<CartView> {
        debug!(cart_id = %cart_id, line_id = %line_id, "Removing cart line");

        let mut tx = begin_write(&self.pool).await?;

        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ?1 AND cart_id = ?2")
            .bind(line_id)
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", line_id));
        }

        refresh_total(&mut tx, cart_id).await?;
        tx.commit().await?;

        self.view(cart_id).await
    }

    /// Deletes every line and resets the total to zero.
    pub async fn clear(&self, cart_id: &str) -> DbResult<CartView> {
        debug!(cart_id = %cart_id, "Clearing cart");

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query("DELETE FROM cart_lines WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("UPDATE carts SET total_cents = 0 WHERE id = ?1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", cart_id));
        }

        tx.commit().await?;

        self.view(cart_id).await
    }
}

/// Lookup-or-create of the user's active cart on the given connection.
pub(crate) async fn active_cart(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Cart> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO carts (id, user_id, total_cents, active, created_at)
        VALUES (?1, ?2, 0, 1, ?3)
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(timestamp(Utc::now()))
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("User", user_id),
        other => other,
    })?;

    let cart = sqlx::query_as::<_, Cart>(&format!(
        "SELECT {} FROM carts WHERE user_id = ?1 AND active = 1",
        CART_COLUMNS
    ))
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(cart)
}

/// Loads the size, making sure it belongs to `product_id`.
async fn size_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    size_id: &str,
) -> DbResult<SizeStock> {
    let size = sqlx::query_as::<_, SizeStock>(
        r#"
        SELECT p.name AS product_name, s.label, s.stock
        FROM sizes s
        INNER JOIN products p ON p.id = s.product_id
        WHERE s.id = ?1 AND s.product_id = ?2
        "#,
    )
    .bind(size_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(size) = size {
        return Ok(size);
    }

    let product_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;

    if product_exists {
        Err(CoreError::SizeNotFound {
            product_id: product_id.to_string(),
            size_id: size_id.to_string(),
        }
        .into())
    } else {
        Err(CoreError::ProductNotFound(product_id.to_string()).into())
    }
}

/// Rewrites the cached total from the lines at current prices.
async fn refresh_total(conn: &mut SqliteConnection, cart_id: &str) -> DbResult<Money> {
    let priced: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT p.price_cents, cl.quantity
        FROM cart_lines cl
        INNER JOIN products p ON p.id = cl.product_id
        WHERE cl.cart_id = ?1
        "#,
    )
    .bind(cart_id)
    .fetch_all(&mut *conn)
    .await?;

    let lines: Vec<PricedLine> = priced
        .into_iter()
        .map(|(price, qty)| PricedLine::new(Money::from_cents(price), qty))
        .collect();
    let total = cart_total(&lines);

    sqlx::query("UPDATE carts SET total_cents = ?2 WHERE id = ?1")
        .bind(cart_id)
        .bind(total.cents())
        .execute(&mut *conn)
        .await?;

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    struct Fixture {
        db: crate::Database,
        cart: Cart,
        product_id: String,
        size_m: String,
        size_l: String,
    }

    async fn fixture() -> Fixture {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta Básica", 4_500_000).await;
        let size_m = test_support::size(&db, &product.id, SizeLabel::M, 10).await;
        let size_l = test_support::size(&db, &product.id, SizeLabel::L, 2).await;
        let user = test_support::user(&db, "laura").await;
        let cart = db.carts().active_for_user(&user.id).await.unwrap();

        Fixture {
            db,
            cart,
            product_id: product.id,
            size_m: size_m.id,
            size_l: size_l.id,
        }
    }

    #[tokio::test]
    async fn test_one_active_cart_per_user() {
        let f = fixture().await;
        let again = f.db.carts().active_for_user(&f.cart.user_id).await.unwrap();
        assert_eq!(again.id, f.cart.id);

        let active: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM carts WHERE user_id = ?1 AND active = 1")
                .bind(&f.cart.user_id)
                .fetch_one(f.db.pool())
                .await
                .unwrap();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn test_add_same_pair_merges_line() {
        let f = fixture().await;
        let carts = f.db.carts();

        carts
            .add_line(&f.cart.id, &f.product_id, &f.size_m, 2)
            .await
            .unwrap();
        let view = carts
            .add_line(&f.cart.id, &f.product_id, &f.size_m, 3)
            .await
            .unwrap();

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 5);
        assert_eq!(view.lines[0].line_total_cents, 22_500_000);
        assert_eq!(view.cart.total_cents, 22_500_000);
        assert_eq!(view.item_count, 5);
    }

    #[tokio::test]
    async fn test_total_tracks_current_prices() {
        let f = fixture().await;
        let carts = f.db.carts();

        carts
            .add_line(&f.cart.id, &f.product_id, &f.size_m, 2)
            .await
            .unwrap();
        let view = carts
            .add_line(&f.cart.id, &f.product_id, &f.size_l, 1)
            .await
            .unwrap();
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.cart.total_cents, 13_500_000);

        let view = carts
            .update_line_quantity(&f.cart.id, &view.lines[1].id, 2)
            .await
            .unwrap();
        assert_eq!(view.cart.total_cents, 18_000_000);

        let view = carts
            .remove_line(&f.cart.id, &view.lines[0].id)
            .await
            .unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.cart.total_cents, 9_000_000);

        let view = carts.clear(&f.cart.id).await.unwrap();
        assert!(view.is_empty());
        assert_eq!(view.cart.total_cents, 0);
    }

    #[tokio::test]
    async fn test_add_beyond_stock_rejected() {
        let f = fixture().await;
        let carts = f.db.carts();

        carts
            .add_line(&f.cart.id, &f.product_id, &f.size_l, 2)
            .await
            .unwrap();
        let err = carts
            .add_line(&f.cart.id, &f.product_id, &f.size_l, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            })
        ));

        // Rejected add leaves the line untouched
        let view = carts.view(&f.cart.id).await.unwrap();
        assert_eq!(view.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_size_must_belong_to_product() {
        let f = fixture().await;
        let category = test_support::category(&f.db, "Otra").await;
        let other = test_support::product(&f.db, &category, "Gorra", 2_000_000).await;

        let err = f
            .db
            .carts()
            .add_line(&f.cart.id, &other.id, &f.size_m, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::SizeNotFound { .. })));

        let err = f
            .db
            .carts()
            .add_line(&f.cart.id, "missing", &f.size_m, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected() {
        let f = fixture().await;
        let carts = f.db.carts();

        assert!(matches!(
            carts.add_line(&f.cart.id, &f.product_id, &f.size_m, 0).await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));

        let view = carts
            .add_line(&f.cart.id, &f.product_id, &f.size_m, 1)
            .await
            .unwrap();
        assert!(matches!(
            carts
                .update_line_quantity(&f.cart.id, &view.lines[0].id, -1)
                .await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));

        // Zero removes the line
        let view = carts
            .update_line_quantity(&f.cart.id, &view.lines[0].id, 0)
            .await
            .unwrap();
        assert!(view.is_empty());
    }

    #[tokio::test]
    async fn test_line_of_other_cart_not_found() {
        let f = fixture().await;
        let view = f
            .db
            .carts()
            .add_line(&f.cart.id, &f.product_id, &f.size_m, 1)
            .await
            .unwrap();

        let intruder = test_support::user(&f.db, "mallory").await;
        let other_cart = f.db.carts().active_for_user(&intruder.id).await.unwrap();

        assert!(matches!(
            f.db.carts()
                .remove_line(&other_cart.id, &view.lines[0].id)
                .await,
            Err(DbError::NotFound { .. })
        ));
    }
}
