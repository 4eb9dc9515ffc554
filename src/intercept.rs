//! Lets registered observers take over a request before authorization.

use std::fmt;

use crate::caller::Caller;
use crate::error::Error;
use crate::handler::HandlerRef;
use crate::request::Request;

/// Event published once per pipeline pass, before the authorization stages.
///
/// Observers inspect the request and may replace the handler that will serve
/// it.
#[derive(Debug)]
pub struct CheckRequestEvent<'a> {
    request: &'a Request,
    caller: &'a Caller,
    handler: HandlerRef,
}

impl<'a> CheckRequestEvent<'a> {
    pub(crate) fn new(request: &'a Request, caller: &'a Caller, handler: HandlerRef) -> Self {
        Self {
            request,
            caller,
            handler,
        }
    }

    /// Returns the request being checked.
    pub fn request(&self) -> &'a Request {
        self.request
    }

    /// Returns the caller.
    pub fn caller(&self) -> &'a Caller {
        self.caller
    }

    /// Returns the handler currently selected.
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Replaces the handler that will serve the request.
    pub fn set_handler(&mut self, handler: HandlerRef) {
        self.handler = handler;
    }

    pub(crate) fn into_handler(self) -> HandlerRef {
        self.handler
    }
}

/// A trusted extension consulted on every request.
pub trait RequestObserver: Send + Sync {
    /// Inspects the event and optionally replaces its handler.
    fn check_request(&self, event: &mut CheckRequestEvent<'_>) -> Result<(), Error>;
}

struct FnObserver<F>(F);

impl<F> RequestObserver for FnObserver<F>
where
    F: Fn(&mut CheckRequestEvent<'_>) -> Result<(), Error> + Send + Sync,
{
    fn check_request(&self, event: &mut CheckRequestEvent<'_>) -> Result<(), Error> {
        (self.0)(event)
    }
}

/// Ordered list of observers. Later observers see replacements made by
/// earlier ones.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Box<dyn RequestObserver>>,
}

impl Observers {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observer.
    pub fn push(&mut self, observer: impl RequestObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Appends a closure observer.
    pub fn push_fn<F>(&mut self, f: F)
    where
        F: Fn(&mut CheckRequestEvent<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.push(FnObserver(f));
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Dispatches the check-request event.
    ///
    /// Returns the replacement handler if the observers left a different
    /// handler in the slot than `current`, or `None` to continue with it.
    pub fn check_request(
        &self,
        request: &Request,
        caller: &Caller,
        current: &HandlerRef,
    ) -> Result<Option<HandlerRef>, Error> {
        let mut event = CheckRequestEvent::new(request, caller, current.clone());
        for observer in &self.observers {
            observer.check_request(&mut event)?;
        }

        let selected = event.into_handler();
        if selected.same_as(current) {
            Ok(None)
        } else {
            Ok(Some(selected))
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    fn handler(name: &str) -> HandlerRef {
        HandlerRef::builder(name).build_fn(|_| Ok(Response::Forbidden))
    }

    #[test]
    fn no_observers_keeps_handler() {
        let observers = Observers::new();
        let current = handler("home");

        let replacement = observers
            .check_request(&Request::new("r"), &Caller::anonymous(), &current)
            .unwrap();
        assert!(replacement.is_none());
    }

    #[test]
    fn observer_can_replace_handler() {
        let maintenance = handler("maintenance");
        let target = maintenance.clone();

        let mut observers = Observers::new();
        observers.push_fn(move |event| {
            event.set_handler(target.clone());
            Ok(())
        });

        let replacement = observers
            .check_request(&Request::new("r"), &Caller::anonymous(), &handler("home"))
            .unwrap()
            .expect("handler replaced");
        assert!(replacement.same_as(&maintenance));
    }

    #[test]
    fn resetting_to_current_is_not_a_replacement() {
        let current = handler("home");
        let same = current.clone();

        let mut observers = Observers::new();
        observers.push_fn(move |event| {
            event.set_handler(same.clone());
            Ok(())
        });

        let replacement = observers
            .check_request(&Request::new("r"), &Caller::anonymous(), &current)
            .unwrap();
        assert!(replacement.is_none());
    }

    #[test]
    fn observer_errors_propagate() {
        let mut observers = Observers::new();
        observers.push_fn(|_| Err(Error::Configuration("observer misconfigured".into())));

        let result = observers.check_request(&Request::new("r"), &Caller::anonymous(), &handler("home"));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn later_observers_see_earlier_replacements() {
        let mut observers = Observers::new();
        let first = handler("first");
        observers.push_fn(move |event| {
            event.set_handler(first.clone());
            Ok(())
        });
        observers.push_fn(|event| {
            assert_eq!(event.handler().name(), "first");
            Ok(())
        });

        let replacement = observers
            .check_request(&Request::new("r"), &Caller::anonymous(), &handler("home"))
            .unwrap();
        assert_eq!(replacement.unwrap().name(), "first");
    }
}
