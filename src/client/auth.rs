use serde::{Deserialize, Serialize};
use tracing::info;

use super::pipeline::RequestPipeline;
use crate::error::{AppError, AppResult};
use crate::identity::{Role, SessionContext, User};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl LoginRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(AppError::validation("missing_fields", "Email and password are required."));
        }
        Ok(())
    }
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(AppError::validation("missing_fields", "Name, email, and password are required."));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation("password_too_short", "Password must be at least 6 characters."));
        }
        Ok(())
    }
}

/// Authentication endpoints. These never touch the session themselves; see
/// [`sign_in`] for the exchange-then-login flow.
pub struct AuthApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> AuthApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self { Self { pipeline } }

    pub async fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        req.validate()?;
        self.pipeline.post("/users/login", req).await
    }

    /// Success does not log anyone in; the caller authenticates afterwards.
    pub async fn register(&self, req: &RegisterRequest) -> AppResult<serde_json::Value> {
        req.validate()?;
        self.pipeline.post("/users/register", req).await
    }
}

/// Authenticate against the backend and, on success, install the session.
pub async fn sign_in(pipeline: &RequestPipeline, session: &SessionContext, email: &str, password: &str) -> AppResult<User> {
    let req = LoginRequest { email: email.to_string(), password: password.to_string() };
    let resp = AuthApi::new(pipeline).login(&req).await?;
    let user = resp.user.clone();
    session.login(resp.user, resp.token)?;
    info!(target: "learnhub::session", user_id = %user.id, "signed in");
    Ok(user)
}
