use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    domain::{
        auth::{service::DUPLICATE_EMAIL_MESSAGE, SessionEvent, SessionEvents},
        user::{
            dto::{AdminStats, UpdateUserRequest, UserSummary},
            is_valid_email, normalize_email, User, UserSession,
        },
    },
    error::{AppError, AppResult},
    infrastructure::{
        config::Config,
        repositories::{SessionRepository, UserRepository},
    },
};

pub const ADMIN_PROTECTED_MESSAGE: &str = "Admin accounts cannot be modified.";
pub const RESERVED_EMAIL_MESSAGE: &str = "This email is reserved for the administrator.";

pub struct AdminService {
    user_repo: Arc<UserRepository>,
    session_repo: Arc<SessionRepository>,
    events: Arc<SessionEvents>,
    config: Arc<Config>,
}

impl AdminService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        session_repo: Arc<SessionRepository>,
        events: Arc<SessionEvents>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            events,
            config,
        }
    }

    /// All users, optionally filtered by an email or id fragment
    pub async fn list_users(&self, search: Option<&str>) -> AppResult<Vec<UserSummary>> {
        let users = self.user_repo.list_all().await?;

        Ok(users
            .into_iter()
            .filter(|user| search.map_or(true, |term| user.matches_search(term)))
            .map(UserSummary::from)
            .collect())
    }

    pub async fn stats(&self) -> AppResult<AdminStats> {
        let (total_users, pro_users) = self.user_repo.count_by_tier().await?;

        Ok(AdminStats {
            total_users,
            pro_users,
            total_revenue: Decimal::from(pro_users) * Decimal::from(self.config.pro_price),
        })
    }

    /// Change a user's email or tier; admin accounts are never touched
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> AppResult<UserSummary> {
        let user = self.find_mutable(user_id).await?;

        let email = match request.email {
            Some(email) => {
                let email = normalize_email(&email);
                if !is_valid_email(&email) {
                    return Err(AppError::BadRequest(
                        "Please enter a valid email address.".to_string(),
                    ));
                }
                if email == self.config.admin_email {
                    return Err(AppError::Conflict(RESERVED_EMAIL_MESSAGE.to_string()));
                }
                if email != user.email && self.user_repo.find_by_email(&email).await?.is_some() {
                    return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
                }
                email
            }
            None => user.email.clone(),
        };
        let is_pro = request.is_pro.unwrap_or(user.is_pro);

        let updated = self
            .user_repo
            .update(user.id, &email, is_pro)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let synced = self.session_repo.sync_from_user(&updated).await?;
        tracing::info!(
            user_id = %updated.id,
            is_pro = updated.is_pro,
            sessions = synced,
            "Admin updated user"
        );

        self.events.publish(SessionEvent::Updated {
            session: UserSession::from(&updated),
        });

        Ok(UserSummary::from(updated))
    }

    /// Remove a user together with their sessions
    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let user = self.find_mutable(user_id).await?;

        let sessions = self.session_repo.delete_for_user(user.id).await?;
        if !self.user_repo.delete(user.id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = %user.id, sessions, "Admin deleted user");
        self.events.publish(SessionEvent::Revoked { user_id: user.id });

        Ok(())
    }

    async fn find_mutable(&self, user_id: Uuid) -> AppResult<User> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.is_admin {
            tracing::warn!(user_id = %user.id, "Refused to modify admin account");
            return Err(AppError::Forbidden(ADMIN_PROTECTED_MESSAGE.to_string()));
        }

        Ok(user)
    }
}
