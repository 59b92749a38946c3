use serde::{Deserialize, Serialize};

use crate::domain::user::UserSession;

/// Request for POST /auth/signup and POST /auth/signin
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Token response after signup or signin
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserSession,
}
