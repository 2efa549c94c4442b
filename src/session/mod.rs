//! Session state, persistence and route guards

pub mod guard;
pub mod storage;
pub mod store;

pub use guard::{
    protected_route, redirect_if_authenticated, Guard, GuardOutcome, HOME_PATH, LOGIN_PATH,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{AuthTokens, Role, Session, SessionStore};
