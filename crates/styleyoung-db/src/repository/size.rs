//! # Size Repository
//!
//! Per-size stock of a product. Stock only ever leaves through
//! [`reduce_stock`], the conditional decrement checkout runs inside its
//! transaction.
//!
//! ```text
//! UPDATE sizes SET stock = stock - q WHERE id = ? AND stock >= q
//!        │
//!        ├── 1 row  → units reserved
//!        └── 0 rows → not enough stock (nothing changed)
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use styleyoung_core::input::SizeInput;
use styleyoung_core::validation::validate_stock;
use styleyoung_core::{CoreError, Size};

/// Repository for size variants.
#[derive(Debug, Clone)]
pub struct SizeRepository {
    pool: SqlitePool,
}

impl SizeRepository {
    /// Creates a new SizeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SizeRepository { pool }
    }

    /// Sizes of a product, smallest label first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<Size>> {
        let sizes = sqlx::query_as::<_, Size>(
            r#"
            SELECT id, product_id, label, stock
            FROM sizes
            WHERE product_id = ?1
            ORDER BY CASE label
                WHEN 'XS' THEN 0 WHEN 'S' THEN 1 WHEN 'M' THEN 2
                WHEN 'L' THEN 3 WHEN 'XL' THEN 4 END
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sizes)
    }

    /// Gets a size by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Size>> {
        let size = sqlx::query_as::<_, Size>(
            "SELECT id, product_id, label, stock FROM sizes WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(size)
    }

    /// Adds a size variant to a product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the product already has that label
    /// * `Err(DbError::NotFound)` - the product does not exist
    pub async fn insert(&self, product_id: &str, input: &SizeInput) -> DbResult<Size> {
        validate_stock(input.stock).map_err(CoreError::from)?;

        let size = Size {
            id: new_id(),
            product_id: product_id.to_string(),
            label: input.label,
            stock: input.stock,
        };

        debug!(id = %size.id, product_id = %product_id, label = %size.label, "Inserting size");

        sqlx::query("INSERT INTO sizes (id, product_id, label, stock) VALUES (?1, ?2, ?3, ?4)")
            .bind(&size.id)
            .bind(&size.product_id)
            .bind(size.label.as_str())
            .bind(size.stock)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                    field,
                    value: size.label.to_string(),
                },
                DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", product_id),
                other => other,
            })?;

        Ok(size)
    }

    /// Overwrites the stock of a size (admin restock / correction).
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<Size> {
        validate_stock(stock).map_err(CoreError::from)?;

        debug!(id = %id, stock, "Setting stock");

        let result = sqlx::query("UPDATE sizes SET stock = ?2 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Size", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Size", id))
    }

    /// Deletes a size that no order references.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting size");

        let result = sqlx::query("DELETE FROM sizes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: "size appears in order history".to_string(),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Size", id));
        }

        Ok(())
    }
}

/// Atomically takes `quantity` units from a size.
///
/// ## Returns
/// * `Ok(true)` - stock decremented
/// * `Ok(false)` - fewer than `quantity` units left; nothing changed
pub(crate) async fn reduce_stock(
    conn: &mut SqliteConnection,
    size_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE sizes SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1")
        .bind(quantity)
        .bind(size_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use styleyoung_core::SizeLabel;

    #[tokio::test]
    async fn test_sizes_sorted_by_label() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta", 4_500_000).await;

        test_support::size(&db, &product.id, SizeLabel::Xl, 1).await;
        test_support::size(&db, &product.id, SizeLabel::Xs, 2).await;
        test_support::size(&db, &product.id, SizeLabel::M, 3).await;

        let labels: Vec<SizeLabel> = db
            .sizes()
            .list_for_product(&product.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, vec![SizeLabel::Xs, SizeLabel::M, SizeLabel::Xl]);
    }

    #[tokio::test]
    async fn test_duplicate_label_rejected() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta", 4_500_000).await;
        test_support::size(&db, &product.id, SizeLabel::M, 3).await;

        let err = db
            .sizes()
            .insert(
                &product.id,
                &SizeInput {
                    label: SizeLabel::M,
                    stock: 1,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "M"));
    }

    #[tokio::test]
    async fn test_set_stock() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta", 4_500_000).await;
        let size = test_support::size(&db, &product.id, SizeLabel::S, 3).await;

        let updated = db.sizes().set_stock(&size.id, 12).await.unwrap();
        assert_eq!(updated.stock, 12);

        assert!(matches!(
            db.sizes().set_stock(&size.id, -1).await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));
        assert!(matches!(
            db.sizes().set_stock("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reduce_stock_never_goes_negative() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta", 4_500_000).await;
        let size = test_support::size(&db, &product.id, SizeLabel::M, 3).await;

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(reduce_stock(&mut *conn, &size.id, 2).await.unwrap());
        assert!(!reduce_stock(&mut *conn, &size.id, 2).await.unwrap());
        assert!(reduce_stock(&mut *conn, &size.id, 1).await.unwrap());
        drop(conn);

        let size = db.sizes().get_by_id(&size.id).await.unwrap().unwrap();
        assert_eq!(size.stock, 0);
    }
}
