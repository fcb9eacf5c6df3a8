//! Authentication module for managing user sessions.
//!
//! This module provides:
//! - `SessionStore`: the key-value capability the HTTP client reads tokens
//!   from, with in-memory and file-backed implementations
//! - `SessionData`: the persisted session record (token, user id, admin flag,
//!   login time)
//!
//! Sessions live under four literal keys (`token`, `userId`, `isAdmin`,
//! `loginTime`). There is no token refresh: sessions end on logout or on the
//! first 401 the client sees.

pub mod session;
pub mod store;

pub use session::{SessionData, SessionState};
pub use store::{keys, FileStore, MemoryStore, SessionStore};
