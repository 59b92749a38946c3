use crate::infrastructure::db::DbPool;
use crate::{domain::user::User, error::AppResult};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserRepository {
    pool: Arc<DbPool>,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by (normalized) email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Create a new user on the free tier
    pub async fn create(&self, email: &str, password_hash: &str, is_admin: bool) -> AppResult<User> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, is_pro, is_admin, created_at, updated_at)
            VALUES (?1, ?2, ?3, FALSE, ?4, ?5, ?5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// All users, oldest first
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        let pool = self.pool.as_ref();
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(pool)
            .await?;

        Ok(users)
    }

    /// Update the mutable account fields, returning the new record
    pub async fn update(&self, user_id: Uuid, email: &str, is_pro: bool) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = ?1, is_pro = ?2, updated_at = ?3
            WHERE id = ?4
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(is_pro)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Delete a user, returning whether a row was removed
    pub async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count (all users, pro users)
    pub async fn count_by_tier(&self) -> AppResult<(i64, i64)> {
        let pool = self.pool.as_ref();
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_pro THEN 1 ELSE 0 END), 0) FROM users",
        )
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }
}
