//! The inbound request as the pipeline sees it.

use std::collections::HashMap;

use crate::caller::Caller;

/// Parameter the client script adds to every asynchronous request.
pub const BACKGROUND_PARAM: &str = "__ajax__";

/// How the caller issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Full page navigation.
    #[default]
    Foreground,
    /// Asynchronous request expecting a structured payload.
    Background,
}

/// Framework-agnostic view of an HTTP request.
///
/// Framework integrations build a `Request` from their own request type and
/// hand it to the [`Pipeline`](crate::Pipeline).
///
/// # Examples
///
/// ```
/// use request_gate::{Request, TransportMode};
///
/// let mut request = Request::new("req-001");
/// request.add_cookie("session_user", "alice");
/// request.set_transport(TransportMode::Background);
///
/// assert_eq!(request.cookie("session_user"), Some("alice"));
/// assert_eq!(request.transport(), TransportMode::Background);
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    request_id: String,
    path: String,
    cookies: HashMap<String, String>,
    params: HashMap<String, String>,
    transport: TransportMode,
    injected_caller: Option<Caller>,
}

impl Request {
    /// Creates a foreground request with no cookies.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            path: "/".to_string(),
            cookies: HashMap::new(),
            params: HashMap::new(),
            transport: TransportMode::Foreground,
            injected_caller: None,
        }
    }

    /// Sets the request path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Adds a cookie.
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Adds a query or form parameter.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Sets the transport mode.
    pub fn set_transport(&mut self, transport: TransportMode) {
        self.transport = transport;
    }

    /// Attaches a caller directly, bypassing session lookup.
    ///
    /// The pipeline only honours this when the configuration allows injected
    /// callers; otherwise the request fails.
    pub fn inject_caller(&mut self, caller: Caller) {
        self.injected_caller = Some(caller);
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a cookie value.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns a parameter value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns the transport mode.
    ///
    /// A request carrying [`BACKGROUND_PARAM`] is background even when the
    /// integration left the mode at its default.
    pub fn transport(&self) -> TransportMode {
        if self.param(BACKGROUND_PARAM).is_some() {
            return TransportMode::Background;
        }
        self.transport
    }

    /// Returns the injected caller, if any.
    pub fn injected_caller(&self) -> Option<&Caller> {
        self.injected_caller.as_ref()
    }
}
