//! # Image Repository
//!
//! Product pictures. At most one image per product is primary, and its file
//! reference is mirrored into `products.primary_image` so listings never
//! need to join the images table.
//!
//! ## Primary Image Switch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_primary(img3)               (one transaction)                     │
//! │                                                                         │
//! │  1. UPDATE product_images SET is_primary = 0 WHERE product_id = P      │
//! │  2. UPDATE product_images SET is_primary = 1 WHERE id = img3           │
//! │  3. UPDATE products SET primary_image = img3.file_ref WHERE id = P     │
//! │                                                                         │
//! │  The partial unique index on (product_id) WHERE is_primary = 1 backs   │
//! │  this up: a second primary can never be committed.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use crate::repository::{new_id, timestamp};
use styleyoung_core::input::ImageInput;
use styleyoung_core::{CoreError, ProductImage};

const IMAGE_COLUMNS: &str =
    "id, product_id, file_ref, description, is_primary, display_order, uploaded_at";

/// Repository for product images.
#[derive(Debug, Clone)]
pub struct ImageRepository {
    pool: SqlitePool,
}

impl ImageRepository {
    /// Creates a new ImageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ImageRepository { pool }
    }

    /// Images of a product by display order, newest upload first on ties.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<ProductImage>> {
        let images = sqlx::query_as::<_, ProductImage>(&format!(
            "SELECT {} FROM product_images WHERE product_id = ?1 \
             ORDER BY display_order ASC, uploaded_at DESC, rowid DESC",
            IMAGE_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Gets an image by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductImage>> {
        let image = sqlx::query_as::<_, ProductImage>(&format!(
            "SELECT {} FROM product_images WHERE id = ?1",
            IMAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    /// Attaches an image to a product, optionally as its primary image.
    pub async fn insert(&self, product_id: &str, input: &ImageInput) -> DbResult<ProductImage> {
        input.validate().map_err(CoreError::from)?;

        let now = Utc::now();
        let image = ProductImage {
            id: new_id(),
            product_id: product_id.to_string(),
            file_ref: input.file_ref.trim().to_string(),
            description: input.description.clone(),
            is_primary: input.is_primary,
            display_order: input.display_order,
            uploaded_at: now,
        };

        debug!(id = %image.id, product_id = %product_id, primary = image.is_primary, "Inserting image");

        let mut tx = begin_write(&self.pool).await?;

        if image.is_primary {
            clear_primary(&mut tx, product_id).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO product_images (
                id, product_id, file_ref, description, is_primary, display_order, uploaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&image.id)
        .bind(&image.product_id)
        .bind(&image.file_ref)
        .bind(&image.description)
        .bind(image.is_primary)
        .bind(image.display_order)
        .bind(timestamp(now))
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", product_id),
            other => other,
        })?;

        if image.is_primary {
            mirror_primary(&mut tx, product_id, Some(&image.file_ref)).await?;
        }

        tx.commit().await?;

        Ok(image)
    }

    /// Makes `id` the product's only primary image.
    pub async fn set_primary(&self, id: &str) -> DbResult<ProductImage> {
        let image = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Image", id))?;

        debug!(id = %id, product_id = %image.product_id, "Setting primary image");

        let mut tx = begin_write(&self.pool).await?;

        clear_primary(&mut tx, &image.product_id).await?;
        sqlx::query("UPDATE product_images SET is_primary = 1 WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        mirror_primary(&mut tx, &image.product_id, Some(&image.file_ref)).await?;

        tx.commit().await?;

        Ok(ProductImage {
            is_primary: true,
            ..image
        })
    }

    /// Deletes an image. Deleting the primary image clears the product's
    /// `primary_image`.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let image = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Image", id))?;

        debug!(id = %id, primary = image.is_primary, "Deleting image");

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query("DELETE FROM product_images WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if image.is_primary {
            mirror_primary(&mut tx, &image.product_id, None).await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

async fn clear_primary(conn: &mut SqliteConnection, product_id: &str) -> DbResult<()> {
    sqlx::query("UPDATE product_images SET is_primary = 0 WHERE product_id = ?1 AND is_primary = 1")
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn mirror_primary(
    conn: &mut SqliteConnection,
    product_id: &str,
    file_ref: Option<&str>,
) -> DbResult<()> {
    sqlx::query("UPDATE products SET primary_image = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(file_ref)
        .bind(timestamp(Utc::now()))
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    fn image(file_ref: &str, is_primary: bool, display_order: i64) -> ImageInput {
        ImageInput {
            file_ref: file_ref.to_string(),
            description: None,
            is_primary,
            display_order,
        }
    }

    async fn primary_image(db: &crate::Database, product_id: &str) -> Option<String> {
        db.products()
            .get_by_id(product_id)
            .await
            .unwrap()
            .unwrap()
            .primary_image
    }

    #[tokio::test]
    async fn test_setting_primary_unsets_siblings() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta", 4_500_000).await;

        let images = db.images();
        let first = images
            .insert(&product.id, &image("a.jpg", true, 0))
            .await
            .unwrap();
        let second = images
            .insert(&product.id, &image("b.jpg", false, 1))
            .await
            .unwrap();
        let third = images
            .insert(&product.id, &image("c.jpg", true, 2))
            .await
            .unwrap();

        let listed = images.list_for_product(&product.id).await.unwrap();
        let primaries: Vec<&str> = listed
            .iter()
            .filter(|i| i.is_primary)
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(primaries, vec![third.id.as_str()]);
        assert_eq!(primary_image(&db, &product.id).await.as_deref(), Some("c.jpg"));

        images.set_primary(&second.id).await.unwrap();
        let listed = images.list_for_product(&product.id).await.unwrap();
        assert_eq!(listed.iter().filter(|i| i.is_primary).count(), 1);
        assert!(listed.iter().find(|i| i.id == second.id).unwrap().is_primary);
        assert!(!listed.iter().find(|i| i.id == first.id).unwrap().is_primary);
        assert_eq!(primary_image(&db, &product.id).await.as_deref(), Some("b.jpg"));
    }

    #[tokio::test]
    async fn test_deleting_primary_clears_product() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta", 4_500_000).await;

        let images = db.images();
        let primary = images
            .insert(&product.id, &image("a.jpg", true, 0))
            .await
            .unwrap();
        let other = images
            .insert(&product.id, &image("b.jpg", false, 1))
            .await
            .unwrap();

        images.delete(&other.id).await.unwrap();
        assert_eq!(primary_image(&db, &product.id).await.as_deref(), Some("a.jpg"));

        images.delete(&primary.id).await.unwrap();
        assert_eq!(primary_image(&db, &product.id).await, None);

        assert!(matches!(
            images.delete(&primary.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_images_ordered_by_display_order() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Casual").await;
        let product = test_support::product(&db, &category, "Camiseta", 4_500_000).await;

        db.images()
            .insert(&product.id, &image("late.jpg", false, 5))
            .await
            .unwrap();
        db.images()
            .insert(&product.id, &image("first.jpg", false, 0))
            .await
            .unwrap();

        let refs: Vec<String> = db
            .images()
            .list_for_product(&product.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.file_ref)
            .collect();
        assert_eq!(refs, vec!["first.jpg", "late.jpg"]);
    }

    #[tokio::test]
    async fn test_image_for_unknown_product() {
        let db = test_support::db().await;
        let err = db
            .images()
            .insert("missing", &image("a.jpg", false, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Product"));
    }
}
