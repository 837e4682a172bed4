//! Client configuration.
//!
//! Defaults, then environment (`LEARNHUB_API_BASE`, `LEARNHUB_SESSION_DIR`), then
//! whatever the caller sets explicitly (CLI flags).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://rural-learning-backend.onrender.com";
pub const ENV_API_BASE: &str = "LEARNHUB_API_BASE";
pub const ENV_SESSION_DIR: &str = "LEARNHUB_SESSION_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL; request paths are appended to it.
    pub base_url: String,
    /// Directory holding the `token` and `user` session slots.
    pub session_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE.to_string(), session_dir: default_session_dir() }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env` with an injectable lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            cfg.base_url = v.trim().to_string();
        }
        if let Some(v) = lookup(ENV_SESSION_DIR).filter(|v| !v.trim().is_empty()) {
            cfg.session_dir = PathBuf::from(v);
        }
        cfg
    }
}

/// `~/.learnhub/session`, or `./.learnhub/session` without a home directory.
fn default_session_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".learnhub").join("session")
}
