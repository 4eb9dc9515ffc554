use std::fmt;

use crate::application::ObjectId;
use crate::capability::Capability;

/// Errors that can abort a request inside the pipeline.
///
/// Expected control flow (disabled users, missing login, unverified email,
/// non-admin callers) never shows up here; those are expressed as
/// [`Outcome`](crate::Outcome) values. Everything in this enum is fatal for
/// the request it occurred in.
#[derive(Debug)]
pub enum Error {
    /// The deployment or account data is inconsistent in a way no user can fix.
    Configuration(String),
    /// The viewer lacks a capability on an object.
    PolicyDenied(PolicyDenial),
    /// Reducing indirect responses revisited a response already seen.
    ResponseCycle {
        /// Kinds of every response visited, ending with the repeated one
        kinds: Vec<&'static str>,
    },
    /// A handle list was rendered with a style that does not exist.
    UnknownHandleStyle(String),
    /// A handle was read before it was loaded.
    HandleNotLoaded(ObjectId),
    /// Observers kept substituting handlers past the configured depth.
    DelegationExhausted {
        /// The depth at which substitution was abandoned
        depth: usize,
    },
    /// A request carried a pre-attached caller outside of a test harness.
    InjectedCallerOutsideTests,
    /// An operation needed the current application but the handler has none.
    NoApplication,
    /// The session or capability store failed.
    Storage(StorageError),
    /// A handler failed while producing its response.
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an arbitrary handler failure.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Handler(err.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::PolicyDenied(denial) => write!(f, "Policy denial: {}", denial),
            Error::ResponseCycle { kinds } => write!(
                f,
                "Cycle while reducing proxy responses: {}",
                kinds.join(" -> ")
            ),
            Error::UnknownHandleStyle(style) => {
                write!(f, "Unknown handle list style '{}'", style.escape_debug())
            }
            Error::HandleNotLoaded(id) => {
                write!(f, "Attempting to access handle which wasn't loaded: {}", id)
            }
            Error::DelegationExhausted { depth } => {
                write!(f, "Handler substitution exceeded depth {}", depth)
            }
            Error::InjectedCallerOutsideTests => {
                write!(f, "Requests may only carry a caller inside unit tests")
            }
            Error::NoApplication => write!(f, "No application!"),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
            Error::Handler(e) => write!(f, "Handler error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Storage(e) => Some(e),
            Error::PolicyDenied(d) => Some(d),
            Error::Handler(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<PolicyDenial> for Error {
    fn from(d: PolicyDenial) -> Self {
        Error::PolicyDenied(d)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

/// A viewer was refused a capability on an object.
///
/// This is handed to the denial-rendering layer as-is; it is never converted
/// into a generic error page by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDenial {
    /// The capability that was required
    pub capability: Capability,
    /// The object the capability was checked against
    pub object: ObjectId,
}

impl PolicyDenial {
    /// Creates a new denial.
    pub fn new(capability: Capability, object: ObjectId) -> Self {
        Self { capability, object }
    }
}

impl fmt::Display for PolicyDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "viewer lacks capability '{}' on {}",
            self.capability, self.object
        )
    }
}

impl std::error::Error for PolicyDenial {}

/// Error raised by a backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    kind: StorageErrorKind,
    message: Option<String>,
}

impl StorageError {
    /// Creates a storage error of the given kind.
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Creates a storage error with a custom message.
    pub fn with_message(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "{} ({})", self.kind, msg)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl std::error::Error for StorageError {}

/// Kind of storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// The store could not be reached.
    Unavailable,
    /// The store returned data that could not be interpreted.
    Corrupt,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageErrorKind::Unavailable => write!(f, "store unavailable"),
            StorageErrorKind::Corrupt => write!(f, "corrupt record"),
        }
    }
}
