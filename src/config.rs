//! Pipeline configuration.

use serde::Deserialize;

/// Global settings consulted by the pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Whether handlers that opt into public access may serve anonymous callers.
    pub allow_public: bool,
    /// Default email-verification requirement for handlers that don't set one.
    pub email_verification_required: bool,
    /// Maximum number of handler substitutions by observers per request.
    pub max_delegation_depth: usize,
    /// Whether requests may carry a pre-attached caller. Only test harnesses set this.
    pub allow_injected_caller: bool,
    /// Session cookie settings.
    pub session: SessionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allow_public: false,
            email_verification_required: false,
            max_delegation_depth: 8,
            allow_injected_caller: false,
            session: SessionConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Configuration for unit and integration tests: injected callers allowed.
    pub fn for_tests() -> Self {
        Self {
            allow_injected_caller: true,
            ..Self::default()
        }
    }
}

/// Names and scoping of the session cookies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Cookie carrying the public account name.
    pub user_cookie: String,
    /// Cookie carrying the secret session key.
    pub key_cookie: String,
    /// Session types accepted for web requests start with this prefix.
    pub session_type_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_cookie: "session_user".to_owned(),
            key_cookie: "session_key".to_owned(),
            session_type_prefix: "web-".to_owned(),
        }
    }
}
