//! Client identity: who is logged in, how that survives restarts, and the flags the
//! rest of the client reads. Keep the public surface thin and split implementation
//! across sub-modules.

mod principal;
mod session;
mod store;

pub use principal::{Role, User};
pub use session::{Session, SessionContext, SessionFlags, SessionToken};
pub use store::{FileSlots, MemorySlots, SessionStore, SlotBackend, StoreError, TOKEN_SLOT, USER_SLOT};
