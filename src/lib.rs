//! Request authorization and response normalization for a web application.
//!
//! Every request flows through the same [`Pipeline`]:
//!
//! 1. **Identity**: the caller is resolved from the session cookies
//!    ([`resolve_caller`]). Anything short of a valid web session is the
//!    anonymous caller.
//! 2. **Interception**: registered [`RequestObserver`]s may swap the handler;
//!    the pass then restarts for the substitute, up to a fixed depth.
//! 3. **Authorization**: the [`AuthorizationGate`] runs each [`Stage`] in
//!    order. A stage may continue, delegate to a built-in handler (disabled
//!    account, login, email verification) or deny outright.
//! 4. **Execution**: the selected handler runs with a [`RequestContext`].
//! 5. **Reduction**: proxy responses are unwrapped until a terminal one
//!    remains ([`reduce_response`]), with cycle detection.
//! 6. **Transport**: modals and redirects are re-encoded for the request's
//!    [`TransportMode`] ([`adapt_response`]).
//!
//! # Core Types
//!
//! - [`Caller`]: the identity a request is served for
//! - [`HandlerRef`]: a shared handler with its [`Requirements`]
//! - [`Outcome`]: what one authorization stage decided
//! - [`Response`]: terminal or proxy handler output
//! - [`SessionSecret`]: session key wrapper that redacts itself in logs
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use request_gate::{
//!     Application, BuiltinHandlers, HandlerRef, MemorySessionStore, Pipeline, PipelineConfig,
//!     Request, Requirements, Response, StaticOracle, TransportMode, UserRecord,
//! };
//!
//! let stub = |name: &str| HandlerRef::builder(name).build_fn(|_| Ok(Response::Forbidden));
//! let builtins = BuiltinHandlers {
//!     disabled_user: stub("disabled"),
//!     login_start: stub("login"),
//!     must_verify_email: stub("verify"),
//!     auth_application: Application::new("APPL-auth", "Auth", "/auth/"),
//! };
//!
//! let mut store = MemorySessionStore::new();
//! store.add_user(UserRecord::new("USER-1", "alice"));
//! store.add_session("USER-1", "web-1", "k3y");
//!
//! let pipeline = Pipeline::builder(builtins)
//!     .config(PipelineConfig::default())
//!     .session_store(Arc::new(store))
//!     .capability_oracle(Arc::new(StaticOracle::new()))
//!     .build();
//!
//! let inbox = HandlerRef::builder("inbox")
//!     .requirements(Requirements::default())
//!     .build_fn(|ctx| Ok(Response::modal(format!("hello {}", ctx.caller().id()))));
//!
//! let mut request = Request::new("req-1");
//! request.add_cookie("session_user", "alice");
//! request.add_cookie("session_key", "k3y");
//! request.set_transport(TransportMode::Background);
//!
//! let response = pipeline.process(&request, &inbox).unwrap();
//! assert_eq!(response.body().as_deref(), Some(r#"{"dialog":"hello USER-1"}"#));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod application;
mod caller;
mod capability;
mod config;
mod context;
mod error;
mod gate;
mod handler;
mod handles;
mod identity;
mod intercept;
mod logging;
mod pipeline;
mod policy;
mod reduce;
mod request;
mod response;
mod secret;
mod store;
mod transport;

pub use application::{Application, ObjectId};
pub use caller::{Caller, CallerBuilder, Preferences, PrimaryEmail};
pub use capability::{Capability, CapabilityOracle, StaticOracle};
pub use config::{PipelineConfig, SessionConfig};
pub use context::RequestContext;
pub use error::{Error, PolicyDenial, StorageError, StorageErrorKind};
pub use gate::{AuthorizationGate, Denial, Outcome, Stage};
pub use handler::{BuiltinHandlers, Handler, HandlerBuilder, HandlerContext, HandlerRef};
pub use handles::{Handle, HandleListStyle, HandleLoader, LoadedHandles, StaticHandleLoader};
pub use identity::resolve_caller;
pub use intercept::{CheckRequestEvent, Observers, RequestObserver};
pub use logging::RequestLog;
pub use pipeline::{Dispatch, Pipeline, PipelineBuilder};
pub use policy::Requirements;
pub use reduce::reduce_response;
pub use request::{Request, TransportMode, BACKGROUND_PARAM};
pub use response::{AjaxPayload, Decorated, Dialog, Indirect, Page, ProxyResponse, Response, FORBIDDEN_BODY};
pub use secret::{digest_session_key, SessionSecret, SessionToken};
pub use store::{MemorySessionStore, SessionQuery, SessionStore, UserRecord};
pub use transport::{adapt_response, DIALOG_PAGE_TITLE};
