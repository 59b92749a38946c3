use crate::infrastructure::db::DbPool;
use crate::{
    domain::user::{SessionRecord, User},
    error::AppResult,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct SessionRepository {
    pool: Arc<DbPool>,
}

impl SessionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Create a session holding a copy of the user's flags
    pub async fn create(&self, user: &User, expiration_hours: i64) -> AppResult<SessionRecord> {
        let pool = self.pool.as_ref();
        let now = Utc::now();
        let expires_at = now + Duration::hours(expiration_hours);

        let session = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO sessions (id, user_id, email, is_pro, is_admin, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&user.email)
        .bind(user.is_pro)
        .bind(user.is_admin)
        .bind(now)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Find a session that has not expired
    pub async fn find_active(&self, session_id: Uuid) -> AppResult<Option<SessionRecord>> {
        let pool = self.pool.as_ref();
        let session = sqlx::query_as::<_, SessionRecord>("SELECT * FROM sessions WHERE id = ?1")
            .bind(session_id)
            .fetch_optional(pool)
            .await?;

        Ok(session.filter(|s| !s.is_expired()))
    }

    /// Refresh every session copy of a user after the record changed
    pub async fn sync_from_user(&self, user: &User) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET email = ?1, is_pro = ?2, is_admin = ?3
            WHERE user_id = ?4
            "#,
        )
        .bind(&user.email)
        .bind(user.is_pro)
        .bind(user.is_admin)
        .bind(user.id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a single session
    pub async fn delete(&self, session_id: Uuid) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(session_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Delete all sessions of a user
    pub async fn delete_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete expired sessions (cleanup)
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
