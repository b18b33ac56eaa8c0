//! # User Repository
//!
//! Customer and staff accounts. Passwords arrive here already hashed; the
//! HTTP layer owns hashing and verification.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, timestamp};
use styleyoung_core::User;

const USER_COLUMNS: &str = r#"
    id, username, email, full_name, address, phone,
    password_hash, is_staff, created_at
"#;

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - username or email already taken
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
        address: &str,
        phone: &str,
        password_hash: &str,
        is_staff: bool,
    ) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            id: new_id(),
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            full_name: full_name.trim().to_string(),
            address: address.trim().to_string(),
            phone: phone.trim().to_string(),
            password_hash: password_hash.to_string(),
            is_staff,
            created_at: now,
        };

        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, full_name, address, phone,
                password_hash, is_staff, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.address)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                let value = if field.contains("email") {
                    user.email.clone()
                } else {
                    user.username.clone()
                };
                DbError::UniqueViolation { field, value }
            }
            other => other,
        })?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by login email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?1",
            USER_COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Grants or revokes staff rights.
    pub async fn set_staff(&self, id: &str, is_staff: bool) -> DbResult<()> {
        debug!(id = %id, is_staff, "Updating staff flag");

        let result = sqlx::query("UPDATE users SET is_staff = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_staff)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_support::db().await;
        let user = test_support::user(&db, "laura").await;

        let by_email = db
            .users()
            .get_by_email("LAURA@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(!by_email.is_staff);

        let by_id = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "laura");
        assert!(db.users().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_support::db().await;
        test_support::user(&db, "laura").await;

        let err = db
            .users()
            .insert(
                "laura2",
                "laura@example.com",
                "Otra Laura",
                "Calle 1",
                "3001234567",
                "hash",
                false,
            )
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert!(field.contains("email"));
                assert_eq!(value, "laura@example.com");
            }
            other => panic!("expected UniqueViolation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_staff() {
        let db = test_support::db().await;
        let user = test_support::user(&db, "admin").await;

        db.users().set_staff(&user.id, true).await.unwrap();
        assert!(db.users().get_by_id(&user.id).await.unwrap().unwrap().is_staff);

        assert!(matches!(
            db.users().set_staff("missing", true).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
