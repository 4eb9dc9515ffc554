//! Resolves the caller of a request from its session cookies.

use crate::caller::{Caller, Preferences};
use crate::config::PipelineConfig;
use crate::error::Error;
use crate::logging::RequestLog;
use crate::request::Request;
use crate::secret::SessionToken;
use crate::store::{SessionQuery, SessionStore, UserRecord};

/// Produces the [`Caller`] for `request`.
///
/// A caller injected into the request is reused as-is, but only when the
/// configuration allows injected callers (test harnesses). Otherwise the
/// session cookies are read; when both are present the secret is digested and
/// looked up among web sessions. Anything short of a match yields the
/// anonymous caller.
///
/// # Errors
///
/// - [`Error::InjectedCallerOutsideTests`] if a caller was injected outside tests
/// - [`Error::Storage`] if the store fails; there are no retries
pub fn resolve_caller(
    request: &Request,
    store: &dyn SessionStore,
    config: &PipelineConfig,
) -> Result<Caller, Error> {
    let log = RequestLog::new(request.request_id());

    if let Some(caller) = request.injected_caller() {
        if !config.allow_injected_caller {
            let err = Error::InjectedCallerOutsideTests;
            log.failed(&err);
            return Err(err);
        }
        log.caller_resolved(caller.id(), "injected");
        return Ok(caller.clone());
    }

    let session = &config.session;
    let token = SessionToken::from_parts(
        request.cookie(&session.user_cookie),
        request.cookie(&session.key_cookie),
    );
    let Some(token) = token else {
        log.caller_resolved(&"anonymous", "no session cookies");
        return Ok(Caller::anonymous());
    };

    let digest = token.secret.digest();
    let query = SessionQuery {
        user: &token.user,
        key_digest: &digest,
        type_prefix: &session.session_type_prefix,
    };

    match store.find_session_user(&query)? {
        Some(record) => {
            let preferences = store.load_preferences(&record.id)?;
            log.caller_resolved(&record.id, "web session");
            Ok(caller_from_record(record, preferences))
        }
        None => {
            log.session_mismatch(&token.user);
            Ok(Caller::anonymous())
        }
    }
}

fn caller_from_record(record: UserRecord, preferences: Preferences) -> Caller {
    let mut builder = Caller::builder(record.id)
        .disabled(record.disabled)
        .admin(record.admin)
        .preferences(preferences);
    if let Some(email) = record.primary_email {
        builder = builder.primary_email(email.address, email.verified);
    }
    if let Some(language) = record.language {
        builder = builder.language(language);
    }
    builder.build()
}
