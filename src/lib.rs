//! LearnHub client core: persistent session store, session context, token-carrying
//! request pipeline and route admission for the course and lesson platform.

pub mod identity;
pub mod client;
pub mod guard;
pub mod navigation;
pub mod config;
pub mod error;
pub mod cli;

use std::sync::Arc;

use crate::client::RequestPipeline;
use crate::config::ClientConfig;
use crate::error::AppResult;
use crate::identity::{SessionContext, SessionStore};
use crate::navigation::Navigator;

/// The pieces an application root owns, wired to one shared session store.
pub struct App {
    pub session: Arc<SessionContext>,
    pub pipeline: RequestPipeline,
    pub navigator: Navigator,
}

impl App {
    pub fn with_store(base_url: &str, store: Arc<SessionStore>) -> AppResult<Self> {
        let pipeline = RequestPipeline::new(base_url, store.clone())?;
        let session = Arc::new(SessionContext::new(store));
        let navigator = Navigator::new(session.clone());
        Ok(Self { session, pipeline, navigator })
    }

    pub fn from_config(cfg: &ClientConfig) -> AppResult<Self> {
        Self::with_store(&cfg.base_url, Arc::new(SessionStore::on_disk(&cfg.session_dir)))
    }
}
