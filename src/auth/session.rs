//! Session state on top of a [`SessionStore`].
//!
//! A session is the four string keys written at login. Absence of `token`
//! means anonymous: requests go out without an Authorization header.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{keys, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Anonymous => write!(f, "Anonymous"),
            SessionState::Authenticated => write!(f, "Authenticated"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: i64,
    pub is_admin: bool,
    pub login_time: DateTime<Utc>,
}

impl SessionData {
    /// Write all four session keys to the store.
    pub fn persist(&self, store: &dyn SessionStore) {
        store.set(keys::TOKEN, &self.token);
        store.set(keys::USER_ID, &self.user_id.to_string());
        store.set(keys::IS_ADMIN, &self.is_admin.to_string());
        store.set(keys::LOGIN_TIME, &self.login_time.to_rfc3339());
    }

    /// Reassemble a session from the store, if a token is present.
    ///
    /// Missing or malformed companion keys fall back to defaults rather than
    /// failing: a token alone is enough to act authenticated, and the server
    /// is the authority on whether it still works.
    pub fn load(store: &dyn SessionStore) -> Option<Self> {
        let token = store.get(keys::TOKEN)?;
        let user_id = store
            .get(keys::USER_ID)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let is_admin = store
            .get(keys::IS_ADMIN)
            .map(|v| v == "true")
            .unwrap_or(false);
        let login_time = store
            .get(keys::LOGIN_TIME)
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Some(Self {
            token,
            user_id,
            is_admin,
            login_time,
        })
    }
}

/// Current state, derived purely from token presence.
pub fn state(store: &dyn SessionStore) -> SessionState {
    if store.get(keys::TOKEN).is_some() {
        SessionState::Authenticated
    } else {
        SessionState::Anonymous
    }
}

/// Remove every session key. Safe to call from any state, any number of
/// times: clearing an absent session is a no-op.
pub fn clear(store: &dyn SessionStore) {
    for key in keys::ALL {
        store.remove(key);
    }
    debug!("session state cleared");
}
