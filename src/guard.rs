//! Route admission: a pure decision per navigation attempt from the screen's declared
//! requirement and the current session flags. Nothing here is stateful.

use serde::{Deserialize, Serialize};

use crate::identity::SessionFlags;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_AUTHENTICATED_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Public,
    RequiresAuth,
    RequiresInstructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Admit,
    /// `from` is the originally requested path, kept so the caller can return there
    /// after login. Best-effort only.
    RedirectTo { path: String, from: Option<String> },
}

/// Terminal outcome of one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Admitted,
    RedirectedToLogin,
    RedirectedToDefault,
}

impl Decision {
    pub fn to_login(from: &str) -> Self {
        Decision::RedirectTo { path: LOGIN_PATH.to_string(), from: Some(from.to_string()) }
    }

    pub fn to_default() -> Self {
        Decision::RedirectTo { path: DEFAULT_AUTHENTICATED_PATH.to_string(), from: None }
    }

    pub fn is_admit(&self) -> bool { matches!(self, Decision::Admit) }

    pub fn outcome(&self) -> Outcome {
        match self {
            Decision::Admit => Outcome::Admitted,
            Decision::RedirectTo { path, .. } if path == LOGIN_PATH => Outcome::RedirectedToLogin,
            Decision::RedirectTo { .. } => Outcome::RedirectedToDefault,
        }
    }
}

pub fn admit(requirement: Requirement, flags: SessionFlags, requested: &str) -> Decision {
    match requirement {
        Requirement::Public => Decision::Admit,
        Requirement::RequiresAuth => {
            if flags.is_authenticated { Decision::Admit } else { Decision::to_login(requested) }
        }
        Requirement::RequiresInstructor => {
            if !flags.is_authenticated {
                Decision::to_login(requested)
            } else if flags.is_instructor {
                Decision::Admit
            } else {
                // valid user, not enough privilege
                Decision::to_default()
            }
        }
    }
}
