//! Page handlers and the context they run in.

use std::fmt;
use std::sync::Arc;

use crate::application::Application;
use crate::context::RequestContext;
use crate::error::Error;
use crate::policy::Requirements;
use crate::response::Response;

/// Produces a response for a request that passed the pipeline.
pub trait Handler: Send + Sync {
    /// Handles the request.
    fn handle(&self, ctx: &RequestContext<'_>) -> Result<Response, Error>;
}

struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&RequestContext<'_>) -> Result<Response, Error> + Send + Sync,
{
    fn handle(&self, ctx: &RequestContext<'_>) -> Result<Response, Error> {
        (self.0)(ctx)
    }
}

struct HandlerEntry {
    name: String,
    requirements: Requirements,
    application: Option<Application>,
    handler: Box<dyn Handler>,
}

/// A registered handler: its implementation plus the requirements and
/// application declared for it.
///
/// Clones refer to the same registration; two `HandlerRef`s are the same
/// handler only if they come from the same registration.
///
/// # Examples
///
/// ```
/// use request_gate::{HandlerRef, Requirements, Response};
///
/// let home = HandlerRef::builder("home")
///     .requirements(Requirements::default().allow_public())
///     .build_fn(|_ctx| Ok(Response::redirect("/feed/")));
///
/// assert_eq!(home.name(), "home");
/// assert!(home.same_as(&home.clone()));
/// ```
#[derive(Clone)]
pub struct HandlerRef(Arc<HandlerEntry>);

impl HandlerRef {
    /// Starts a registration named `name`.
    pub fn builder(name: impl Into<String>) -> HandlerBuilder {
        HandlerBuilder {
            name: name.into(),
            requirements: Requirements::default(),
            application: None,
        }
    }

    /// Returns the registration name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the declared requirements.
    pub fn requirements(&self) -> &Requirements {
        &self.0.requirements
    }

    /// Returns the application the handler belongs to.
    pub fn application(&self) -> Option<&Application> {
        self.0.application.as_ref()
    }

    /// Returns `true` if both refer to the same registration.
    pub fn same_as(&self, other: &HandlerRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Runs the handler.
    pub fn handle(&self, ctx: &RequestContext<'_>) -> Result<Response, Error> {
        self.0.handler.handle(ctx)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef")
            .field("name", &self.0.name)
            .field("requirements", &self.0.requirements)
            .field("application", &self.0.application.as_ref().map(|a| a.id()))
            .finish()
    }
}

/// Builder for [`HandlerRef`].
#[derive(Debug)]
pub struct HandlerBuilder {
    name: String,
    requirements: Requirements,
    application: Option<Application>,
}

impl HandlerBuilder {
    /// Sets the access requirements.
    pub fn requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    /// Associates the handler with an application.
    pub fn application(mut self, application: Application) -> Self {
        self.application = Some(application);
        self
    }

    /// Finishes the registration with a [`Handler`] implementation.
    pub fn build(self, handler: impl Handler + 'static) -> HandlerRef {
        HandlerRef(Arc::new(HandlerEntry {
            name: self.name,
            requirements: self.requirements,
            application: self.application,
            handler: Box::new(handler),
        }))
    }

    /// Finishes the registration with a closure.
    pub fn build_fn<F>(self, f: F) -> HandlerRef
    where
        F: Fn(&RequestContext<'_>) -> Result<Response, Error> + Send + Sync + 'static,
    {
        self.build(FnHandler(f))
    }
}

/// The handler currently selected to serve the request, and the application
/// it runs under.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    handler: HandlerRef,
    application: Option<Application>,
}

impl HandlerContext {
    /// Selects `handler` under its own application.
    pub fn new(handler: HandlerRef) -> Self {
        let application = handler.application().cloned();
        Self {
            handler,
            application,
        }
    }

    /// Switches the application the handler runs under.
    pub fn with_application(mut self, application: Option<Application>) -> Self {
        self.application = application;
        self
    }

    /// Returns the selected handler.
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Returns the current application.
    pub fn application(&self) -> Option<&Application> {
        self.application.as_ref()
    }
}

/// Handlers the pipeline hands requests to when a check fails.
///
/// They are opaque to the pipeline and run directly, without a pass of their
/// own.
#[derive(Debug, Clone)]
pub struct BuiltinHandlers {
    /// Serves disabled accounts
    pub disabled_user: HandlerRef,
    /// Starts the login flow
    pub login_start: HandlerRef,
    /// Asks the caller to verify their email address
    pub must_verify_email: HandlerRef,
    /// Application the login and verification handlers run under
    pub auth_application: Application,
}
