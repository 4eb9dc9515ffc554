use std::fmt;

/// Request-scoped logger.
///
/// Every event carries the request id so decisions made for one request can
/// be correlated across the pipeline stages. Each method records one kind of
/// pipeline event with its own fields.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger bound to `request_id`.
    pub fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Opens a span covering one pipeline pass.
    pub fn pass_span(&self, handler: &str, depth: usize) -> tracing::Span {
        tracing::debug_span!("pipeline_pass", request_id = %self.request_id, handler, depth)
    }

    /// The caller was resolved; `source` says how.
    pub fn caller_resolved(&self, caller: &dyn fmt::Display, source: &str) {
        tracing::debug!(request_id = %self.request_id, %caller, source, "caller resolved");
    }

    /// Session cookies were present but matched no web session.
    pub fn session_mismatch(&self, user: &str) {
        tracing::warn!(request_id = %self.request_id, user, "session cookies matched no web session");
    }

    /// An observer replaced the handler.
    pub fn substituted(&self, from: &str, to: &str, depth: usize) {
        tracing::info!(request_id = %self.request_id, from, to, depth, "handler substituted");
    }

    /// Records the outcome of an authorization stage that short-circuited.
    pub fn stage(&self, stage: &str, outcome: &dyn fmt::Display) {
        tracing::info!(request_id = %self.request_id, stage, %outcome, "authorization stage short-circuited");
    }

    /// The request failed with `error`.
    pub fn failed(&self, error: &dyn fmt::Display) {
        tracing::error!(request_id = %self.request_id, %error, "request failed");
    }

    /// The final response is ready.
    pub fn responded(&self, kind: &str, status: u16) {
        tracing::debug!(request_id = %self.request_id, kind, status, "responding");
    }
}
