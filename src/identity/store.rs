//! Persistent session store.
//!
//! Two durable string slots, `token` and `user`, behind a small `SlotBackend` trait.
//! `SessionStore` layers the session contract on top: both slots are written or
//! cleared together under one lock, and anything that does not load as a complete
//! pair is reported as absence.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::principal::User;

pub const TOKEN_SLOT: &str = "token";
pub const USER_SLOT: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session slot '{slot}' io: {source}")]
    Io {
        slot: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable string-keyed slots local to this client.
pub trait SlotBackend: Send + Sync {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, slot: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing slot succeeds.
    fn remove(&self, slot: &str) -> Result<(), StoreError>;
}

/// Process-local slots; nothing survives the process.
#[derive(Default)]
pub struct MemorySlots {
    map: RwLock<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self { Self::default() }
}

impl SlotBackend for MemorySlots {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.read().get(slot).cloned())
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        self.map.write().insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StoreError> {
        self.map.write().remove(slot);
        Ok(())
    }
}

/// One file per slot under a client-local directory.
///
/// Writes go to `<slot>.tmp` first and are renamed into place, so a crash mid-write
/// leaves either the old value or the new one.
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    fn slot_path(&self, slot: &str) -> PathBuf { self.dir.join(slot) }

    fn io_err(slot: &str, source: std::io::Error) -> StoreError {
        StoreError::Io { slot: slot.to_string(), source }
    }
}

impl SlotBackend for FileSlots {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(slot, e)),
        }
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_err(slot, e))?;
        let tmp = self.dir.join(format!("{}.tmp", slot));
        fs::write(&tmp, value.as_bytes()).map_err(|e| Self::io_err(slot, e))?;
        fs::rename(&tmp, self.slot_path(slot)).map_err(|e| Self::io_err(slot, e))?;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(slot, e)),
        }
    }
}

/// The session's durable half. Shared (`Arc`) between the session context and the
/// request pipeline; those are its only writers.
pub struct SessionStore {
    slots: Arc<dyn SlotBackend>,
    lock: Mutex<()>,
    generation: AtomicU64,
}

impl SessionStore {
    pub fn new(slots: Arc<dyn SlotBackend>) -> Self {
        Self { slots, lock: Mutex::new(()), generation: AtomicU64::new(0) }
    }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemorySlots::new())) }

    pub fn on_disk(dir: impl Into<PathBuf>) -> Self { Self::new(Arc::new(FileSlots::new(dir))) }

    /// Write both slots and return the generation this write produced.
    ///
    /// The old token goes first, then the user, then the new token, so an interrupted
    /// sequence leaves at most a user without a token. On failure the previous pair is
    /// put back, or both slots are cleared if that fails too.
    pub fn save(&self, user: &User, token: &str) -> Result<u64, StoreError> {
        let encoded = serde_json::to_string(user)?;
        let _g = self.lock.lock();
        let prior_user = self.slots.read(USER_SLOT).ok().flatten();
        let prior_token = self.slots.read(TOKEN_SLOT).ok().flatten();
        let written = self
            .slots
            .remove(TOKEN_SLOT)
            .and_then(|_| self.slots.write(USER_SLOT, &encoded))
            .and_then(|_| self.slots.write(TOKEN_SLOT, token));
        if let Err(e) = written {
            self.restore(prior_user.as_deref(), prior_token.as_deref());
            self.generation.fetch_add(1, Ordering::SeqCst);
            return Err(e);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(target: "learnhub::store", user_id = %user.id, "session saved");
        Ok(generation)
    }

    // Caller holds `lock`.
    fn restore(&self, user: Option<&str>, token: Option<&str>) {
        let put = |slot: &str, value: Option<&str>| match value {
            Some(v) => self.slots.write(slot, v),
            None => self.slots.remove(slot),
        };
        if let Err(e) = put(USER_SLOT, user).and_then(|_| put(TOKEN_SLOT, token)) {
            warn!(target: "learnhub::store", "previous session not restored, clearing: {}", e);
            let _ = self.slots.remove(TOKEN_SLOT);
            let _ = self.slots.remove(USER_SLOT);
        }
    }

    /// Both values when both are present and well-formed. Never an error.
    pub fn load(&self) -> Option<(User, String)> {
        let _g = self.lock.lock();
        let token = match self.slots.read(TOKEN_SLOT) {
            Ok(Some(t)) if !t.is_empty() => t,
            Ok(_) => return None,
            Err(e) => {
                debug!(target: "learnhub::store", "token slot unreadable, treating as absent: {}", e);
                return None;
            }
        };
        let raw = match self.slots.read(USER_SLOT) {
            Ok(Some(u)) => u,
            Ok(None) => {
                debug!(target: "learnhub::store", "token present without user, treating as absent");
                return None;
            }
            Err(e) => {
                debug!(target: "learnhub::store", "user slot unreadable, treating as absent: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) if user.id.is_empty() => {
                debug!(target: "learnhub::store", "user slot has no id, treating as absent");
                None
            }
            Ok(user) => Some((user, token)),
            Err(e) => {
                debug!(target: "learnhub::store", "user slot malformed, treating as absent: {}", e);
                None
            }
        }
    }

    /// Remove both slots and return the generation this produced. Clearing an empty
    /// store succeeds.
    ///
    /// The generation moves even when one removal fails, since the other may have
    /// gone through.
    pub fn clear(&self) -> Result<u64, StoreError> {
        let _g = self.lock.lock();
        let token_res = self.slots.remove(TOKEN_SLOT);
        let user_res = self.slots.remove(USER_SLOT);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        token_res?;
        user_res?;
        debug!(target: "learnhub::store", "session cleared");
        Ok(generation)
    }

    /// The raw token slot, for attaching to outbound requests.
    pub fn token(&self) -> Option<String> {
        let _g = self.lock.lock();
        match self.slots.read(TOKEN_SLOT) {
            Ok(Some(t)) if !t.is_empty() => Some(t),
            _ => None,
        }
    }

    /// Bumped on every successful `save`/`clear`.
    pub fn generation(&self) -> u64 { self.generation.load(Ordering::SeqCst) }
}
