//! Session storage boundary.
//!
//! The pipeline only reads from the store. Sessions are written by the login
//! flow, which lives elsewhere.

use std::collections::HashMap;

use crate::application::ObjectId;
use crate::caller::{Preferences, PrimaryEmail};
use crate::error::StorageError;
use crate::secret::digest_session_key;

/// Lookup key for a web session.
#[derive(Debug, Clone, Copy)]
pub struct SessionQuery<'a> {
    /// Public identifier presented by the caller (the account name)
    pub user: &'a str,
    /// Digest of the presented secret session key
    pub key_digest: &'a str,
    /// Required prefix of the session type
    pub type_prefix: &'a str,
}

/// A stored account joined to a matching session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Object identifier of the account
    pub id: ObjectId,
    /// Public account name, matched against the session cookie
    pub username: String,
    /// Account disabled flag
    pub disabled: bool,
    /// Administrator flag
    pub admin: bool,
    /// Primary email, if the account has one
    pub primary_email: Option<PrimaryEmail>,
    /// Preferred language tag
    pub language: Option<String>,
}

impl UserRecord {
    /// Creates an enabled, non-admin account without email.
    pub fn new(id: impl Into<ObjectId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            disabled: false,
            admin: false,
            primary_email: None,
            language: None,
        }
    }
}

/// Read access to accounts, sessions and preferences.
pub trait SessionStore: Send + Sync {
    /// Finds the account owning a session that matches `query` exactly.
    fn find_session_user(&self, query: &SessionQuery<'_>) -> Result<Option<UserRecord>, StorageError>;

    /// Loads the stored preferences of an account.
    fn load_preferences(&self, user: &ObjectId) -> Result<Preferences, StorageError>;
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user: ObjectId,
    session_type: String,
    key_digest: String,
}

/// In-memory [`SessionStore`], populated up front and then shared read-only.
///
/// # Examples
///
/// ```
/// use request_gate::{MemorySessionStore, SessionQuery, SessionStore, UserRecord, digest_session_key};
///
/// let mut store = MemorySessionStore::new();
/// store.add_user(UserRecord::new("USER-1", "alice"));
/// store.add_session("USER-1", "web-1", "raw-key");
///
/// let digest = digest_session_key("raw-key");
/// let found = store
///     .find_session_user(&SessionQuery { user: "alice", key_digest: &digest, type_prefix: "web-" })
///     .unwrap();
/// assert_eq!(found.unwrap().username, "alice");
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    users: HashMap<ObjectId, UserRecord>,
    sessions: Vec<SessionRecord>,
    preferences: HashMap<ObjectId, Preferences>,
    failure: Option<StorageError>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an account.
    pub fn add_user(&mut self, user: UserRecord) {
        self.users.insert(user.id.clone(), user);
    }

    /// Adds a session for `user`, storing only the digest of `raw_key`.
    pub fn add_session(&mut self, user: impl Into<ObjectId>, session_type: impl Into<String>, raw_key: &str) {
        self.sessions.push(SessionRecord {
            user: user.into(),
            session_type: session_type.into(),
            key_digest: digest_session_key(raw_key),
        });
    }

    /// Stores preferences for `user`.
    pub fn set_preferences(&mut self, user: impl Into<ObjectId>, preferences: Preferences) {
        self.preferences.insert(user.into(), preferences);
    }

    /// Makes every subsequent read fail with `error`.
    pub fn fail_with(&mut self, error: StorageError) {
        self.failure = Some(error);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn find_session_user(&self, query: &SessionQuery<'_>) -> Result<Option<UserRecord>, StorageError> {
        self.check_available()?;

        let found = self
            .sessions
            .iter()
            .filter(|s| s.session_type.starts_with(query.type_prefix))
            .filter(|s| s.key_digest == query.key_digest)
            .filter_map(|s| self.users.get(&s.user))
            .find(|u| u.username == query.user);

        Ok(found.cloned())
    }

    fn load_preferences(&self, user: &ObjectId) -> Result<Preferences, StorageError> {
        self.check_available()?;
        Ok(self.preferences.get(user).cloned().unwrap_or_default())
    }
}
