//! The identity attached to a single request pass.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::ObjectId;

/// Stored user preferences, keyed by preference name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Creates an empty preference set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a preference, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns a preference value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A caller's primary email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryEmail {
    /// The address
    pub address: String,
    /// Whether the address has been verified
    pub verified: bool,
}

/// The identity making the current request.
///
/// A `Caller` is created once per pipeline pass, either from a session lookup
/// or as an anonymous placeholder, and is never mutated afterwards.
///
/// # Examples
///
/// ```
/// use request_gate::Caller;
///
/// let anon = Caller::anonymous();
/// assert!(!anon.is_authenticated());
///
/// let admin = Caller::builder("USER-1").admin(true).build();
/// assert!(admin.is_authenticated());
/// assert!(admin.is_admin());
/// ```
#[derive(Debug, Clone)]
pub struct Caller {
    id: ObjectId,
    authenticated: bool,
    disabled: bool,
    admin: bool,
    primary_email: Option<PrimaryEmail>,
    language: Option<String>,
    preferences: Arc<Preferences>,
}

impl Caller {
    /// Returns the anonymous, unauthenticated caller.
    pub fn anonymous() -> Self {
        Self {
            id: ObjectId::new(""),
            authenticated: false,
            disabled: false,
            admin: false,
            primary_email: None,
            language: None,
            preferences: Arc::new(Preferences::new()),
        }
    }

    /// Starts building an authenticated caller with the given identifier.
    pub fn builder(id: impl Into<ObjectId>) -> CallerBuilder {
        CallerBuilder {
            caller: Self {
                id: id.into(),
                authenticated: true,
                ..Self::anonymous()
            },
        }
    }

    /// Returns the caller's identifier (empty for anonymous callers).
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Returns `true` if the caller presented a valid session.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns `true` if the account has been disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns `true` for administrators.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Returns the primary email address, if the account has one.
    pub fn primary_email(&self) -> Option<&PrimaryEmail> {
        self.primary_email.as_ref()
    }

    /// Returns `true` if the primary email exists and is verified.
    pub fn is_email_verified(&self) -> bool {
        self.primary_email.as_ref().is_some_and(|e| e.verified)
    }

    /// Returns the preferred language tag.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the caller's stored preferences.
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }
}

/// Builder for [`Caller`].
#[derive(Debug, Clone)]
pub struct CallerBuilder {
    caller: Caller,
}

impl CallerBuilder {
    /// Marks the caller as authenticated or not.
    pub fn authenticated(mut self, yes: bool) -> Self {
        self.caller.authenticated = yes;
        self
    }

    /// Marks the account as disabled.
    pub fn disabled(mut self, yes: bool) -> Self {
        self.caller.disabled = yes;
        self
    }

    /// Marks the caller as an administrator.
    pub fn admin(mut self, yes: bool) -> Self {
        self.caller.admin = yes;
        self
    }

    /// Sets the primary email address.
    pub fn primary_email(mut self, address: impl Into<String>, verified: bool) -> Self {
        self.caller.primary_email = Some(PrimaryEmail {
            address: address.into(),
            verified,
        });
        self
    }

    /// Sets the preferred language tag.
    pub fn language(mut self, tag: impl Into<String>) -> Self {
        self.caller.language = Some(tag.into());
        self
    }

    /// Attaches stored preferences.
    pub fn preferences(mut self, preferences: Preferences) -> Self {
        self.caller.preferences = Arc::new(preferences);
        self
    }

    /// Finishes the caller.
    pub fn build(self) -> Caller {
        self.caller
    }
}
