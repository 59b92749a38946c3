use std::sync::Arc;

use tokio::task;
use uuid::Uuid;

use super::{
    events::{SessionEvent, SessionEvents},
    password::{hash_password, verify_password, MIN_PASSWORD_LENGTH},
    AuthResponse, JwtManager,
};
use crate::{
    domain::user::{is_valid_email, normalize_email, SessionRecord, User, UserSession},
    error::{AppError, AppResult},
    infrastructure::{
        config::Config,
        repositories::{SessionRepository, UserRepository},
    },
};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "This email is already registered.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

pub struct AuthService {
    user_repo: Arc<UserRepository>,
    session_repo: Arc<SessionRepository>,
    events: Arc<SessionEvents>,
    config: Arc<Config>,
}

impl AuthService {
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

    /// Register a free-tier account and sign it in
    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AppError::BadRequest("Please enter a valid email address.".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }

        let password = password.to_string();
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let is_admin = email == self.config.admin_email;
        let user = self
            .user_repo
            .create(&email, &password_hash, is_admin)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent signup for the same address
                AppError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string())
                }
                other => other,
            })?;

        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User signed up");

        self.open_session(&user).await
    }

    /// Verify credentials and open a new session
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let email = normalize_email(email);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()))?;

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?;

        if !matches {
            tracing::warn!(user_id = %user.id, "Sign in rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
        }

        let purged = self.session_repo.delete_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "Removed expired sessions");
        }

        self.open_session(&user).await
    }

    /// Drop the session behind the current token
    pub async fn sign_out(&self, session_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.session_repo.delete(session_id).await?;
        tracing::info!(user_id = %user_id, session_id = %session_id, "User signed out");
        self.events.publish(SessionEvent::SignedOut {
            user_id,
            session_id,
        });
        Ok(())
    }

    /// The cached session copy
    pub async fn current_session(&self, session_id: Uuid) -> AppResult<UserSession> {
        let session = self
            .session_repo
            .find_active(session_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))?;

        Ok(UserSession::from(&session))
    }

    /// Set the paid flag on the account and every session of it
    pub async fn upgrade_to_pro(&self, user_id: Uuid) -> AppResult<UserSession> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let user = if user.is_pro {
            user
        } else {
            self.user_repo
                .update(user.id, &user.email, true)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
        };

        self.session_repo.sync_from_user(&user).await?;
        tracing::info!(user_id = %user.id, "User upgraded to pro");

        let session = UserSession::from(&user);
        self.events.publish(SessionEvent::Updated {
            session: session.clone(),
        });

        Ok(session)
    }

    async fn open_session(&self, user: &User) -> AppResult<AuthResponse> {
        let session: SessionRecord = self
            .session_repo
            .create(user, self.config.jwt_expiration_hours)
            .await?;

        let jwt_manager = JwtManager::new(self.config.jwt_secret.clone());
        let token = jwt_manager.generate_token(&session)?;

        let user = UserSession::from(&session);
        self.events.publish(SessionEvent::SignedIn {
            session_id: session.id,
            session: user.clone(),
        });

        Ok(AuthResponse {
            token,
            expires_in: self.config.jwt_expiration_hours * 3600,
            user,
        })
    }
}
