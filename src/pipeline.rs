//! The request pipeline: identity, interception, authorization, execution,
//! reduction and transport adaptation, in that order.

use std::fmt;
use std::sync::Arc;

use crate::caller::Caller;
use crate::capability::{CapabilityOracle, StaticOracle};
use crate::config::PipelineConfig;
use crate::context::RequestContext;
use crate::error::Error;
use crate::gate::{AuthorizationGate, Denial, Outcome};
use crate::handler::{BuiltinHandlers, HandlerContext, HandlerRef};
use crate::handles::{HandleLoader, StaticHandleLoader};
use crate::identity::resolve_caller;
use crate::intercept::{CheckRequestEvent, Observers, RequestObserver};
use crate::logging::RequestLog;
use crate::reduce::reduce_response;
use crate::request::Request;
use crate::response::Response;
use crate::store::{MemorySessionStore, SessionStore};
use crate::transport::adapt_response;

/// What the authorization phase decided for a request.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// Run this handler under this application.
    Execute(HandlerContext),
    /// Answer directly without running any handler.
    Respond(Response),
}

/// Processes requests for registered handlers.
///
/// The pipeline holds only shared, read-only collaborators; it can serve any
/// number of requests concurrently from multiple threads.
///
/// # Examples
///
/// ```
/// use request_gate::{
///     Application, BuiltinHandlers, HandlerRef, Pipeline, Request, Requirements, Response,
/// };
///
/// let stub = |name: &str| HandlerRef::builder(name).build_fn(|_| Ok(Response::redirect("/auth/start/")));
/// let pipeline = Pipeline::builder(BuiltinHandlers {
///     disabled_user: stub("disabled"),
///     login_start: stub("login"),
///     must_verify_email: stub("verify"),
///     auth_application: Application::new("APPL-auth", "Auth", "/auth/"),
/// })
/// .build();
///
/// let home = HandlerRef::builder("home")
///     .requirements(Requirements::default())
///     .build_fn(|_| Ok(Response::redirect("/feed/")));
///
/// // No session cookies: the login handler answers instead of `home`.
/// let response = pipeline.process(&Request::new("req-1"), &home).unwrap();
/// assert!(matches!(response, Response::Relocation(ref t) if t == "/auth/start/"));
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    store: Arc<dyn SessionStore>,
    oracle: Arc<dyn CapabilityOracle>,
    handles: Arc<dyn HandleLoader>,
    observers: Observers,
    builtins: BuiltinHandlers,
}

impl Pipeline {
    /// Starts building a pipeline around the built-in remediation handlers.
    pub fn builder(builtins: BuiltinHandlers) -> PipelineBuilder {
        PipelineBuilder {
            config: PipelineConfig::default(),
            store: Arc::new(MemorySessionStore::new()),
            oracle: Arc::new(StaticOracle::new()),
            handles: Arc::new(StaticHandleLoader::new()),
            observers: Observers::new(),
            builtins,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs `handler` for `request` through the whole pipeline and returns
    /// the response to send.
    ///
    /// # Errors
    ///
    /// Any [`Error`] is fatal for the request: storage failures, policy
    /// denials for invisible applications, configuration errors, runaway
    /// handler substitution, handler failures and response cycles.
    pub fn process(&self, request: &Request, handler: &HandlerRef) -> Result<Response, Error> {
        let log = RequestLog::new(request.request_id());

        let caller = self.resolve_caller(request)?;
        let raw = match self.authorize(request, &caller, HandlerContext::new(handler.clone()))? {
            Dispatch::Execute(ctx) => self.execute(request, &caller, &ctx)?,
            Dispatch::Respond(response) => response,
        };

        let reduced = reduce_response(raw).map_err(|e| {
            log.failed(&e);
            e
        })?;
        let adapted = adapt_response(reduced, request.transport());
        log.responded(adapted.kind(), adapted.status());
        Ok(adapted)
    }

    /// Resolves the caller for `request` from its session cookies.
    pub fn resolve_caller(&self, request: &Request) -> Result<Caller, Error> {
        resolve_caller(request, self.store.as_ref(), &self.config)
    }

    /// Runs interception and the authorization stages for `ctx`.
    ///
    /// When an observer substitutes a handler, the pass restarts for the
    /// substitute with the same caller, starting again at interception. At
    /// most `max_delegation_depth` substitutions are followed.
    pub fn authorize(&self, request: &Request, caller: &Caller, ctx: HandlerContext) -> Result<Dispatch, Error> {
        let log = RequestLog::new(request.request_id());
        let mut ctx = ctx;
        let mut depth = 0;

        loop {
            let _pass = log.pass_span(ctx.handler().name(), depth).entered();

            if let Some(substitute) = self
                .observers
                .check_request(request, caller, ctx.handler())?
            {
                depth += 1;
                if depth > self.config.max_delegation_depth {
                    let err = Error::DelegationExhausted {
                        depth: self.config.max_delegation_depth,
                    };
                    log.failed(&err);
                    return Err(err);
                }
                log.substituted(ctx.handler().name(), substitute.name(), depth);
                ctx = HandlerContext::new(substitute);
                continue;
            }

            let gate = AuthorizationGate::new(&self.config, &self.builtins, self.oracle.as_ref(), log);
            return Ok(match gate.evaluate(caller, &ctx)? {
                Outcome::Continue => Dispatch::Execute(ctx),
                Outcome::DelegateTo(next) => Dispatch::Execute(next),
                Outcome::Deny(Denial::Forbidden) => Dispatch::Respond(Response::Forbidden),
            });
        }
    }

    fn execute(&self, request: &Request, caller: &Caller, ctx: &HandlerContext) -> Result<Response, Error> {
        let rc = RequestContext::new(
            request,
            caller,
            ctx.application(),
            self.oracle.as_ref(),
            self.handles.as_ref(),
        );
        ctx.handler().handle(&rc)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("observers", &self.observers)
            .field("builtins", &self.builtins)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Pipeline`].
pub struct PipelineBuilder {
    config: PipelineConfig,
    store: Arc<dyn SessionStore>,
    oracle: Arc<dyn CapabilityOracle>,
    handles: Arc<dyn HandleLoader>,
    observers: Observers,
    builtins: BuiltinHandlers,
}

impl PipelineBuilder {
    /// Sets the configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the session store.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    /// Sets the capability oracle.
    pub fn capability_oracle(mut self, oracle: Arc<dyn CapabilityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Sets the handle loader.
    pub fn handle_loader(mut self, handles: Arc<dyn HandleLoader>) -> Self {
        self.handles = handles;
        self
    }

    /// Registers an observer. Observers run in registration order.
    pub fn observer(mut self, observer: impl RequestObserver + 'static) -> Self {
        self.observers.push(observer);
        self
    }

    /// Registers a closure observer.
    pub fn observer_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CheckRequestEvent<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.observers.push_fn(f);
        self
    }

    /// Finishes the pipeline.
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            store: self.store,
            oracle: self.oracle,
            handles: self.handles,
            observers: self.observers,
            builtins: self.builtins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use crate::policy::Requirements;
    use crate::response::Decorated;

    fn stub(name: &'static str) -> HandlerRef {
        HandlerRef::builder(name).build_fn(move |_| Ok(Response::redirect(format!("/{}/", name))))
    }

    fn builtins() -> BuiltinHandlers {
        BuiltinHandlers {
            disabled_user: stub("disabled"),
            login_start: stub("login"),
            must_verify_email: stub("verify"),
            auth_application: Application::new("APPL-auth", "Auth", "/auth/"),
        }
    }

    #[test]
    fn forbidden_is_a_response_not_an_error() {
        let pipeline = Pipeline::builder(builtins())
            .config(PipelineConfig::for_tests())
            .build();
        let admin_only = HandlerRef::builder("settings")
            .requirements(Requirements::default().require_admin())
            .build_fn(|_| Ok(Response::modal("secret settings")));

        let mut request = Request::new("req-forbidden");
        request.inject_caller(Caller::builder("USER-1").build());

        let response = pipeline.process(&request, &admin_only).unwrap();
        assert!(matches!(response, Response::Forbidden));
        assert_eq!(response.status(), 403);
    }

    #[test]
    fn authorize_reports_delegation() {
        let pipeline = Pipeline::builder(builtins()).build();
        let home = stub("home");

        let dispatch = pipeline
            .authorize(&Request::new("r"), &Caller::anonymous(), HandlerContext::new(home))
            .unwrap();
        match dispatch {
            Dispatch::Execute(ctx) => assert_eq!(ctx.handler().name(), "login"),
            other => panic!("unexpected dispatch: {:?}", other),
        }
    }

    #[test]
    fn handler_output_is_reduced_before_adaptation() {
        let pipeline = Pipeline::builder(builtins())
            .config(PipelineConfig::for_tests())
            .build();
        let wrapped = HandlerRef::builder("wrapped").build_fn(|_| {
            Ok(Response::indirect(Decorated::new("layout", Response::modal("<b>hi</b>"))))
        });

        let mut request = Request::new("req-reduce");
        request.inject_caller(Caller::builder("USER-1").build());
        request.set_transport(crate::request::TransportMode::Background);

        let response = pipeline.process(&request, &wrapped).unwrap();
        assert_eq!(response.body().as_deref(), Some(r#"{"dialog":"<b>hi</b>"}"#));
    }

    #[test]
    fn handler_errors_propagate() {
        let pipeline = Pipeline::builder(builtins())
            .config(PipelineConfig::for_tests())
            .build();
        let failing = HandlerRef::builder("failing").build_fn(|_| Err(Error::handler("boom")));

        let mut request = Request::new("req-fail");
        request.inject_caller(Caller::builder("USER-1").build());

        let err = pipeline.process(&request, &failing).unwrap_err();
        assert_eq!(err.to_string(), "Handler error: boom");
    }

    #[test]
    fn pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
