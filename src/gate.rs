use std::fmt;

use crate::caller::Caller;
use crate::capability::{Capability, CapabilityOracle};
use crate::config::PipelineConfig;
use crate::error::{Error, PolicyDenial};
use crate::handler::{BuiltinHandlers, HandlerContext, HandlerRef};
use crate::logging::RequestLog;

/// Result of one authorization stage.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Proceed to the next stage.
    Continue,
    /// Stop and serve the request with a different handler.
    DelegateTo(HandlerContext),
    /// Stop and answer with a fixed denial.
    Deny(Denial),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Continue`].
    pub fn is_continue(&self) -> bool {
        matches!(self, Outcome::Continue)
    }

    /// Name of the handler delegated to, if any.
    pub fn delegate_name(&self) -> Option<&str> {
        match self {
            Outcome::DelegateTo(ctx) => Some(ctx.handler().name()),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Continue => write!(f, "continue"),
            Outcome::DelegateTo(ctx) => write!(f, "delegate to '{}'", ctx.handler().name()),
            Outcome::Deny(denial) => write!(f, "deny ({})", denial),
        }
    }
}

/// Fixed denial results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The caller may not use this handler at all.
    Forbidden,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Forbidden => write!(f, "forbidden"),
        }
    }
}

/// The authorization stages, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turns away disabled accounts
    EnabledUser,
    /// Sends anonymous callers to log in
    Login,
    /// Sends callers with an unverified email to verify it
    EmailVerification,
    /// Requires the caller to see the handler's application
    ApplicationVisibility,
    /// Restricts admin handlers to administrators
    Admin,
}

impl Stage {
    /// Every stage, in evaluation order. Stages offering a remedy (log in,
    /// verify email) precede the admin denial.
    pub const ORDER: [Stage; 5] = [
        Stage::EnabledUser,
        Stage::Login,
        Stage::EmailVerification,
        Stage::ApplicationVisibility,
        Stage::Admin,
    ];

    /// Short stage name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Stage::EnabledUser => "enabled_user",
            Stage::Login => "login",
            Stage::EmailVerification => "email_verification",
            Stage::ApplicationVisibility => "application_visibility",
            Stage::Admin => "admin",
        }
    }
}

/// Runs the authorization stages for one pipeline pass.
///
/// # Examples
///
/// ```
/// use request_gate::{
///     Application, AuthorizationGate, BuiltinHandlers, Caller, HandlerContext, HandlerRef,
///     PipelineConfig, RequestLog, Response, StaticOracle,
/// };
///
/// let stub = |name: &str| HandlerRef::builder(name).build_fn(|_| Ok(Response::Forbidden));
/// let builtins = BuiltinHandlers {
///     disabled_user: stub("disabled"),
///     login_start: stub("login"),
///     must_verify_email: stub("verify"),
///     auth_application: Application::new("APPL-auth", "Auth", "/auth/"),
/// };
/// let config = PipelineConfig::default();
/// let oracle = StaticOracle::new();
///
/// let gate = AuthorizationGate::new(&config, &builtins, &oracle, RequestLog::new("req-1"));
/// let outcome = gate
///     .evaluate(&Caller::anonymous(), &HandlerContext::new(stub("home")))
///     .unwrap();
/// assert_eq!(outcome.delegate_name(), Some("login"));
/// ```
pub struct AuthorizationGate<'a> {
    config: &'a PipelineConfig,
    builtins: &'a BuiltinHandlers,
    oracle: &'a dyn CapabilityOracle,
    log: RequestLog<'a>,
}

impl<'a> AuthorizationGate<'a> {
    /// Creates a gate for one request.
    pub fn new(
        config: &'a PipelineConfig,
        builtins: &'a BuiltinHandlers,
        oracle: &'a dyn CapabilityOracle,
        log: RequestLog<'a>,
    ) -> Self {
        Self {
            config,
            builtins,
            oracle,
            log,
        }
    }

    /// Runs every stage in [`Stage::ORDER`], stopping at the first outcome
    /// that is not [`Outcome::Continue`].
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] for an authenticated caller without a primary email
    /// - [`Error::PolicyDenied`] if the caller can't see the handler's application
    /// - [`Error::Storage`] if the capability oracle fails
    pub fn evaluate(&self, caller: &Caller, ctx: &HandlerContext) -> Result<Outcome, Error> {
        for stage in Stage::ORDER {
            let outcome = self.run_stage(stage, caller, ctx)?;
            if !outcome.is_continue() {
                self.log.stage(stage.name(), &outcome);
                return Ok(outcome);
            }
        }
        Ok(Outcome::Continue)
    }

    /// Runs a single stage.
    pub fn run_stage(&self, stage: Stage, caller: &Caller, ctx: &HandlerContext) -> Result<Outcome, Error> {
        let reqs = ctx.handler().requirements();

        match stage {
            Stage::EnabledUser => {
                if caller.is_disabled() && reqs.requires_enabled_user {
                    return Ok(Outcome::DelegateTo(HandlerContext::new(
                        self.builtins.disabled_user.clone(),
                    )));
                }
            }
            Stage::Login => {
                if !reqs.requires_login {
                    return Ok(Outcome::Continue);
                }
                let allow_public = reqs.allows_public && self.config.allow_public;
                if !allow_public && !caller.is_authenticated() {
                    return Ok(self.delegate_under_auth(&self.builtins.login_start));
                }
            }
            Stage::EmailVerification => {
                if !reqs.requires_login
                    || !caller.is_authenticated()
                    || !reqs.requires_email_verification(self.config.email_verification_required)
                {
                    return Ok(Outcome::Continue);
                }
                let Some(email) = caller.primary_email() else {
                    return Err(Error::Configuration(format!(
                        "No primary email address associated with account {}",
                        caller.id()
                    )));
                };
                if !email.verified {
                    return Ok(self.delegate_under_auth(&self.builtins.must_verify_email));
                }
            }
            Stage::ApplicationVisibility => {
                if !reqs.requires_login {
                    return Ok(Outcome::Continue);
                }
                if let Some(application) = ctx.application() {
                    let visible =
                        self.oracle
                            .has_capability(caller, &Capability::View, application.id())?;
                    if !visible {
                        self.log.stage(stage.name(), &"policy denial");
                        return Err(PolicyDenial::new(Capability::View, application.id().clone()).into());
                    }
                }
            }
            Stage::Admin => {
                if reqs.requires_admin && !caller.is_admin() {
                    return Ok(Outcome::Deny(Denial::Forbidden));
                }
            }
        }

        Ok(Outcome::Continue)
    }

    fn delegate_under_auth(&self, handler: &HandlerRef) -> Outcome {
        Outcome::DelegateTo(
            HandlerContext::new(handler.clone())
                .with_application(Some(self.builtins.auth_application.clone())),
        )
    }
}
