//! # Category Repository
//!
//! Categories group the catalog ("Camisetas", "Pantalones", ...). A
//! category that still owns products cannot be deleted; the schema's
//! `ON DELETE RESTRICT` enforces it and the error surfaces as a
//! [`DbError::ForeignKeyViolation`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, timestamp};
use styleyoung_core::input::CategoryInput;
use styleyoung_core::{Category, CategoryWithCount};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists every category with the number of products filed under it,
    /// alphabetically.
    pub async fn list_with_counts(&self) -> DbResult<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT
                c.id,
                c.name,
                c.description,
                (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id) AS product_count
            FROM categories c
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - a category with that name exists
    pub async fn insert(&self, input: &CategoryInput) -> DbResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: new_id(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            created_at: now,
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(category.name.clone()))?;

        Ok(category)
    }

    /// Renames or re-describes a category.
    pub async fn update(&self, id: &str, input: &CategoryInput) -> DbResult<Category> {
        debug!(id = %id, "Updating category");

        let name = input.name.trim().to_string();
        let result = sqlx::query("UPDATE categories SET name = ?2, description = ?3 WHERE id = ?1")
            .bind(id)
            .bind(&name)
            .bind(&input.description)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(name.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Deletes a category that has no products.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - products still reference it
    /// * `Err(DbError::NotFound)` - no such category
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: "category still has products".to_string(),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Counts categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_list_with_counts() {
        let db = test_support::db().await;
        let casual = test_support::category(&db, "Ropa Casual").await;
        test_support::category(&db, "Accesorios").await;
        test_support::product(&db, &casual, "Camiseta Básica", 4_500_000).await;
        test_support::product(&db, &casual, "Jean Slim", 12_000_000).await;

        let categories = db.categories().list_with_counts().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Accesorios");
        assert_eq!(categories[0].product_count, 0);
        assert_eq!(categories[1].product_count, 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_support::db().await;
        test_support::category(&db, "Deportiva").await;

        let err = db
            .categories()
            .insert(&CategoryInput {
                name: "Deportiva".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "Deportiva"));
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_support::db().await;
        let id = test_support::category(&db, "Formal").await;

        let updated = db
            .categories()
            .update(
                &id,
                &CategoryInput {
                    name: "Ropa Formal".to_string(),
                    description: Some("Trajes y camisas".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ropa Formal");
        assert_eq!(updated.description.as_deref(), Some("Trajes y camisas"));

        assert!(matches!(
            db.categories()
                .update(
                    "missing",
                    &CategoryInput {
                        name: "X".to_string(),
                        description: None
                    }
                )
                .await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_refused_while_products_exist() {
        let db = test_support::db().await;
        let id = test_support::category(&db, "Ropa Casual").await;
        let product = test_support::product(&db, &id, "Camiseta", 4_500_000).await;

        let err = db.categories().delete(&id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        db.products().delete(&product.id).await.unwrap();
        db.categories().delete(&id).await.unwrap();
        assert!(db.categories().get_by_id(&id).await.unwrap().is_none());
        assert_eq!(db.categories().count().await.unwrap(), 0);
    }
}
