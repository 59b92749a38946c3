use anyhow::Result;
use chrono::Utc;
use replylens_backend::domain::auth::password::hash_password;
use replylens_backend::domain::user::User;
use replylens_backend::infrastructure::db::DbPool;
use std::sync::Arc;
use uuid::Uuid;

use super::TEST_PASSWORD;

pub struct TestFixtures {
    pool: Arc<DbPool>,
}

impl TestFixtures {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, email: &str) -> Result<User> {
        self.insert_user(email, false, false).await
    }

    pub async fn create_pro_user(&self, email: &str) -> Result<User> {
        self.insert_user(email, true, false).await
    }

    pub async fn create_admin(&self, email: &str) -> Result<User> {
        self.insert_user(email, false, true).await
    }

    async fn insert_user(&self, email: &str, is_pro: bool, is_admin: bool) -> Result<User> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, is_pro, is_admin, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hash_password(TEST_PASSWORD)?)
        .bind(is_pro)
        .bind(is_admin)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(user)
    }

    pub async fn count_sessions(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }
}
