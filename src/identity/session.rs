use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::principal::User;
use super::store::SessionStore;
use crate::error::{AppError, AppResult};

pub type SessionToken = String;

/// A complete session: identity plus bearer token. Never partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
    token: SessionToken,
}

impl Session {
    /// `None` when either half is empty; a partial session is no session.
    pub fn new(user: User, token: impl Into<SessionToken>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() || user.id.is_empty() { return None; }
        Some(Self { user, token })
    }

    pub fn user(&self) -> &User { &self.user }

    pub fn token(&self) -> &str { &self.token }
}

/// Capability flags the UI and the admission guard read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub is_authenticated: bool,
    pub is_instructor: bool,
}

impl SessionFlags {
    pub const LOGGED_OUT: SessionFlags = SessionFlags { is_authenticated: false, is_instructor: false };

    pub fn of(session: Option<&Session>) -> Self {
        match session {
            Some(s) => SessionFlags { is_authenticated: true, is_instructor: s.user.is_instructor() },
            None => Self::LOGGED_OUT,
        }
    }
}

#[derive(Debug)]
struct Synced {
    session: Option<Session>,
    /// Store generation this snapshot reflects.
    generation: u64,
}

/// Process-wide view of who is logged in. The only writer of session state.
///
/// Owned by the application root and handed out as `Arc<SessionContext>`. Reads
/// re-hydrate from the store when its generation moved, which is how a clear done by
/// the request pipeline after a 401 shows up here.
pub struct SessionContext {
    store: Arc<SessionStore>,
    state: RwLock<Synced>,
}

impl SessionContext {
    /// Hydrate once from the store. The token is trusted as-is until the backend
    /// rejects it.
    pub fn new(store: Arc<SessionStore>) -> Self {
        let generation = store.generation();
        let session = store.load().and_then(|(user, token)| Session::new(user, token));
        match &session {
            Some(s) => info!(target: "learnhub::session", user_id = %s.user.id, role = %s.user.role, "session restored"),
            None => debug!(target: "learnhub::session", "starting logged out"),
        }
        Self { store, state: RwLock::new(Synced { session, generation }) }
    }

    pub fn store(&self) -> &Arc<SessionStore> { &self.store }

    /// Replace the session wholesale and persist it.
    ///
    /// Call only after a successful authentication exchange. On a storage failure the
    /// new session is not installed and memory is re-read from whatever the store
    /// kept (the previous session, or nothing).
    pub fn login(&self, user: User, token: impl Into<SessionToken>) -> AppResult<()> {
        let Some(session) = Session::new(user, token) else {
            return Err(AppError::validation("invalid_session", "login requires a user id and a non-empty token"));
        };
        let mut st = self.state.write();
        match self.store.save(&session.user, &session.token) {
            Ok(generation) => {
                info!(target: "learnhub::session", user_id = %session.user.id, role = %session.user.role, "logged in");
                st.session = Some(session);
                st.generation = generation;
                Ok(())
            }
            Err(e) => {
                warn!(target: "learnhub::session", user_id = %session.user.id, "login not persisted: {}", e);
                st.generation = self.store.generation();
                st.session = self.store.load().and_then(|(user, token)| Session::new(user, token));
                Err(e.into())
            }
        }
    }

    /// Clear the session wholesale. Safe when already logged out.
    ///
    /// Memory is cleared even when the store cannot be; that failure is returned.
    pub fn logout(&self) -> AppResult<()> {
        let mut st = self.state.write();
        let was = st.session.take();
        let res = self.store.clear();
        if let Some(s) = was {
            info!(target: "learnhub::session", user_id = %s.user.id, "logged out");
        }
        match res {
            Ok(generation) => st.generation = generation,
            Err(e) => {
                st.generation = self.store.generation();
                warn!(target: "learnhub::session", "session storage not cleared: {}", e);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Current session, re-synced with the store if it was written behind our back.
    pub fn current(&self) -> Option<Session> {
        let generation = self.store.generation();
        {
            let st = self.state.read();
            if st.generation == generation {
                return st.session.clone();
            }
        }
        let mut st = self.state.write();
        // Re-check after acquiring write lock.
        let generation = self.store.generation();
        if st.generation != generation {
            let reloaded = self.store.load().and_then(|(user, token)| Session::new(user, token));
            if st.session.is_some() && reloaded.is_none() {
                info!(target: "learnhub::session", "session cleared externally");
            }
            st.session = reloaded;
            st.generation = generation;
        }
        st.session.clone()
    }

    pub fn current_user(&self) -> Option<User> { self.current().map(|s| s.user) }

    pub fn flags(&self) -> SessionFlags { SessionFlags::of(self.current().as_ref()) }

    pub fn is_authenticated(&self) -> bool { self.flags().is_authenticated }

    pub fn is_instructor(&self) -> bool { self.flags().is_instructor }
}
