use std::fmt;

use sha2::{Digest, Sha256};

/// The secret half of a session token, as presented in a cookie.
///
/// The raw value is only ever used to compute its digest; only digests are
/// persisted and compared. `Debug` and `Display` never show the value.
///
/// # Examples
///
/// ```
/// use request_gate::SessionSecret;
///
/// let key = SessionSecret::new("f2a9c0d1".to_string());
/// assert_eq!(format!("{:?}", key), "[REDACTED]");
/// assert_eq!(key.digest().len(), 64);
/// ```
// Do NOT derive Clone, Debug or Display; the value must not be duplicated or printed.
pub struct SessionSecret {
    inner: String,
}

impl SessionSecret {
    /// Wraps a secret session key.
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Returns `true` if no secret was presented.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Computes the one-way digest stored alongside the session.
    pub fn digest(&self) -> String {
        digest_session_key(&self.inner)
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// A session token read from request cookies.
#[derive(Debug)]
pub struct SessionToken {
    /// Public identifier of the session owner
    pub user: String,
    /// Secret session key
    pub secret: SessionSecret,
}

impl SessionToken {
    /// Builds a token when both halves are present and non-empty.
    pub fn from_parts(user: Option<&str>, secret: Option<&str>) -> Option<Self> {
        match (user, secret) {
            (Some(user), Some(secret)) if !user.is_empty() && !secret.is_empty() => Some(Self {
                user: user.to_string(),
                secret: SessionSecret::new(secret.to_string()),
            }),
            _ => None,
        }
    }
}

/// Digests a raw session key: SHA-256, lowercase hex.
pub fn digest_session_key(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug_and_display() {
        let key = SessionSecret::new("hunter2".to_string());

        assert_eq!(format!("{:?}", key), "[REDACTED]");
        assert_eq!(format!("{}", key), "[REDACTED]");
    }

    #[test]
    fn token_debug_does_not_leak_secret() {
        let token = SessionToken::from_parts(Some("alice"), Some("sk-123")).unwrap();
        let out = format!("{:?}", token);

        assert!(out.contains("alice"));
        assert!(!out.contains("sk-123"));
    }

    #[test]
    fn digest_is_stable_sha256_hex() {
        assert_eq!(
            digest_session_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let key = SessionSecret::new("abc".to_string());
        assert_eq!(key.digest(), digest_session_key("abc"));
    }

    #[test]
    fn token_requires_both_non_empty_halves() {
        assert!(SessionToken::from_parts(None, Some("k")).is_none());
        assert!(SessionToken::from_parts(Some("u"), None).is_none());
        assert!(SessionToken::from_parts(Some(""), Some("k")).is_none());
        assert!(SessionToken::from_parts(Some("u"), Some("")).is_none());
        assert!(SessionToken::from_parts(Some("u"), Some("k")).is_some());
    }
}
