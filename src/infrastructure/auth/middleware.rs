use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::sync::Arc;

use crate::infrastructure::config::Config;
use crate::{
    domain::{auth::JwtManager, user::UserSession},
    error::AppError,
    infrastructure::repositories::SessionRepository,
};
use uuid::Uuid;

/// Session context injected into request extensions after authentication
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    pub is_pro: bool,
    pub is_admin: bool,
}

impl AuthUser {
    pub fn session(&self) -> UserSession {
        UserSession {
            id: self.user_id,
            email: self.email.clone(),
            is_pro: self.is_pro,
            is_admin: self.is_admin,
        }
    }
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))
}

/// Authentication middleware
///
/// The token only names a session; flags come from the session row so that
/// upgrades and admin edits apply without re-issuing tokens.
pub async fn auth_middleware(
    State((session_repo, config)): State<(Arc<SessionRepository>, Arc<Config>)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;

    let jwt_manager = JwtManager::new(config.jwt_secret.clone());
    let session_id = jwt_manager.extract_session_id(token)?;

    let session = session_repo
        .find_active(session_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))?;

    request.extensions_mut().insert(AuthUser {
        user_id: session.user_id,
        session_id: session.id,
        email: session.email,
        is_pro: session.is_pro,
        is_admin: session.is_admin,
    });

    Ok(next.run(request).await)
}

/// Admin gate; must run after `auth_middleware`
pub async fn admin_middleware(
    Extension(auth_user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !auth_user.is_admin {
        tracing::warn!(user_id = %auth_user.user_id, "Non-admin hit an admin route");
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}
