//! Unified client error model.
//! Every failure the session core can hand back to a screen is an `AppError`. Backend
//! statuses are classified once, in `AppError::from_status`, so call sites only match on
//! the variant. `AuthorizationRejected` is special: the request pipeline has already
//! cleared the stored session by the time a caller sees it.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::identity::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    AuthorizationRejected { code: String, message: String },
    ValidationFailed { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Server { code: String, message: String },
    Http { code: String, message: String },
    Network { code: String, message: String },
    Decode { code: String, message: String },
    Io { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::AuthorizationRejected { code, .. }
            | AppError::ValidationFailed { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Server { code, .. }
            | AppError::Http { code, .. }
            | AppError::Network { code, .. }
            | AppError::Decode { code, .. }
            | AppError::Io { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::AuthorizationRejected { message, .. }
            | AppError::ValidationFailed { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Server { message, .. }
            | AppError::Http { message, .. }
            | AppError::Network { message, .. }
            | AppError::Decode { message, .. }
            | AppError::Io { message, .. } => message.as_str(),
        }
    }

    pub fn rejected<S: Into<String>>(code: S, msg: S) -> Self { AppError::AuthorizationRejected { code: code.into(), message: msg.into() } }
    pub fn validation<S: Into<String>>(code: S, msg: S) -> Self { AppError::ValidationFailed { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn server<S: Into<String>>(code: S, msg: S) -> Self { AppError::Server { code: code.into(), message: msg.into() } }
    pub fn http<S: Into<String>>(code: S, msg: S) -> Self { AppError::Http { code: code.into(), message: msg.into() } }
    pub fn network<S: Into<String>>(code: S, msg: S) -> Self { AppError::Network { code: code.into(), message: msg.into() } }
    pub fn decode<S: Into<String>>(code: S, msg: S) -> Self { AppError::Decode { code: code.into(), message: msg.into() } }
    pub fn io<S: Into<String>>(code: S, msg: S) -> Self { AppError::Io { code: code.into(), message: msg.into() } }

    /// True for the authorization-failure class (HTTP 401).
    pub fn is_authorization_rejected(&self) -> bool {
        matches!(self, AppError::AuthorizationRejected { .. })
    }

    /// Classify a non-success backend response.
    ///
    /// The message is the body's `message` field when the body is a JSON object carrying
    /// one, otherwise the trimmed raw body, otherwise a generic `HTTP <status>` text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = backend_message(body).unwrap_or_else(|| format!("HTTP {}", status));
        match status {
            401 => AppError::rejected("unauthorized".to_string(), message),
            400 | 422 => AppError::validation("validation_failed".to_string(), message),
            404 => AppError::not_found("not_found".to_string(), message),
            409 => AppError::conflict("conflict".to_string(), message),
            500..=599 => AppError::server(format!("http_{}", status), message),
            _ => AppError::http(format!("http_{}", status), message),
        }
    }

    /// Representative HTTP status for this error class.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::AuthorizationRejected { .. } => 401,
            AppError::ValidationFailed { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Conflict { .. } => 409,
            AppError::Server { code, .. } | AppError::Http { code, .. } => {
                code.strip_prefix("http_").and_then(|s| s.parse().ok()).unwrap_or(500)
            }
            AppError::Network { .. } => 503,
            AppError::Decode { .. } => 502,
            AppError::Io { .. } => 500,
        }
    }
}

fn backend_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() { return None; }
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(m) = v.get("message").and_then(|m| m.as_str()) {
            if !m.trim().is_empty() { return Some(m.to_string()); }
        }
    }
    Some(trimmed.to_string())
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::decode("decode_error".to_string(), err.to_string())
        } else {
            AppError::network("network_error".to_string(), err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::decode("decode_error".to_string(), err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::io("session_store".to_string(), err.to_string())
    }
}
