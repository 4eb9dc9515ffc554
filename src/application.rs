//! Applications and the opaque object identifiers they are addressed by.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a stored object (user, application, document, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identifier.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An installed application that handlers belong to.
///
/// Handlers associated with an application are only reachable by viewers who
/// can see that application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    id: ObjectId,
    name: String,
    base_uri: String,
}

impl Application {
    /// Creates an application rooted at `base_uri` (for example `/files/`).
    pub fn new(id: impl Into<ObjectId>, name: impl Into<String>, base_uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_uri: base_uri.into(),
        }
    }

    /// Returns the application's object identifier.
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a URI below the application's base.
    pub fn uri(&self, path: &str) -> String {
        let base = self.base_uri.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_joins_base_and_path_with_single_slash() {
        let app = Application::new("APPL-files", "Files", "/files/");
        assert_eq!(app.uri("upload/"), "/files/upload/");
        assert_eq!(app.uri("/view/12"), "/files/view/12");
        assert_eq!(app.uri(""), "/files/");
    }

    #[test]
    fn object_id_displays_raw_value() {
        let id = ObjectId::from("USER-abc");
        assert_eq!(id.to_string(), "USER-abc");
        assert_eq!(id.as_str(), "USER-abc");
        assert!(!id.is_empty());
    }

    #[test]
    fn object_id_accepts_owned_strings() {
        let raw = format!("USER-{}", 42);
        let id: ObjectId = raw.clone().into();
        assert_eq!(id, ObjectId::from(raw.as_str()));

        let caller = crate::caller::Caller::builder(raw).build();
        assert_eq!(caller.id().as_str(), "USER-42");
    }
}
