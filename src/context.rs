use crate::application::{Application, ObjectId};
use crate::caller::Caller;
use crate::capability::{Capability, CapabilityOracle};
use crate::error::{Error, PolicyDenial};
use crate::handles::{HandleLoader, LoadedHandles};
use crate::request::Request;

/// Everything a handler may look at while producing its response.
///
/// A `RequestContext` is only built by the [`Pipeline`](crate::Pipeline) once
/// the request has passed every authorization stage, so a handler holding one
/// knows its caller cleared the handler's requirements.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    request: &'a Request,
    caller: &'a Caller,
    application: Option<&'a Application>,
    oracle: &'a dyn CapabilityOracle,
    handles: &'a dyn HandleLoader,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(
        request: &'a Request,
        caller: &'a Caller,
        application: Option<&'a Application>,
        oracle: &'a dyn CapabilityOracle,
        handles: &'a dyn HandleLoader,
    ) -> Self {
        Self {
            request,
            caller,
            application,
            oracle,
            handles,
        }
    }

    /// Returns the request.
    pub fn request(&self) -> &'a Request {
        self.request
    }

    /// Returns the caller.
    pub fn caller(&self) -> &'a Caller {
        self.caller
    }

    /// Returns the application the handler runs under.
    pub fn application(&self) -> Option<&'a Application> {
        self.application
    }

    fn require_application(&self) -> Result<&'a Application, Error> {
        self.application.ok_or(Error::NoApplication)
    }

    /// Builds a URI below the current application.
    ///
    /// # Errors
    ///
    /// [`Error::NoApplication`] if the handler runs without an application.
    pub fn application_uri(&self, path: &str) -> Result<String, Error> {
        Ok(self.require_application()?.uri(path))
    }

    /// Asks whether the caller holds `capability` on the current application.
    pub fn has_application_capability(&self, capability: &Capability) -> Result<bool, Error> {
        let application = self.require_application()?;
        Ok(self
            .oracle
            .has_capability(self.caller, capability, application.id())?)
    }

    /// Like [`has_application_capability`](Self::has_application_capability),
    /// but a missing capability is a [`Error::PolicyDenied`].
    pub fn require_application_capability(&self, capability: &Capability) -> Result<(), Error> {
        if self.has_application_capability(capability)? {
            return Ok(());
        }
        let application = self.require_application()?;
        Err(PolicyDenial::new(capability.clone(), application.id().clone()).into())
    }

    /// Loads handles for `ids` as seen by the caller. Empty ids are skipped.
    pub fn load_handles(&self, ids: &[ObjectId]) -> Result<LoadedHandles, Error> {
        let ids: Vec<ObjectId> = ids.iter().filter(|id| !id.is_empty()).cloned().collect();
        let handles = self.handles.load_handles(self.caller, &ids)?;
        Ok(LoadedHandles::new(handles))
    }
}

impl std::fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request.request_id())
            .field("caller", &self.caller.id())
            .field("application", &self.application.map(|a| a.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::StaticOracle;
    use crate::handles::{Handle, StaticHandleLoader};

    struct Fixture {
        request: Request,
        caller: Caller,
        app: Application,
        oracle: StaticOracle,
        loader: StaticHandleLoader,
    }

    fn fixture() -> Fixture {
        Fixture {
            request: Request::new("req-ctx"),
            caller: Caller::builder("USER-1").build(),
            app: Application::new("APPL-files", "Files", "/files/"),
            oracle: StaticOracle::new().grant("USER-1", Capability::Edit, "APPL-files"),
            loader: StaticHandleLoader::new().with(Handle::new("F1", "F1", "/F1")),
        }
    }

    #[test]
    fn application_uri_requires_application() {
        let fx = fixture();
        let with_app = RequestContext::new(&fx.request, &fx.caller, Some(&fx.app), &fx.oracle, &fx.loader);
        assert_eq!(with_app.application_uri("new/").unwrap(), "/files/new/");

        let without = RequestContext::new(&fx.request, &fx.caller, None, &fx.oracle, &fx.loader);
        assert!(matches!(without.application_uri("new/"), Err(Error::NoApplication)));
    }

    #[test]
    fn application_capabilities_go_through_oracle() {
        let fx = fixture();
        let ctx = RequestContext::new(&fx.request, &fx.caller, Some(&fx.app), &fx.oracle, &fx.loader);

        assert!(ctx.has_application_capability(&Capability::Edit).unwrap());
        assert!(!ctx.has_application_capability(&Capability::View).unwrap());
        assert!(ctx.require_application_capability(&Capability::Edit).is_ok());

        match ctx.require_application_capability(&Capability::View) {
            Err(Error::PolicyDenied(denial)) => {
                assert_eq!(denial.capability, Capability::View);
                assert_eq!(denial.object.as_str(), "APPL-files");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn load_handles_skips_empty_ids() {
        let fx = fixture();
        let ctx = RequestContext::new(&fx.request, &fx.caller, None, &fx.oracle, &fx.loader);

        let handles = ctx
            .load_handles(&[ObjectId::new("F1"), ObjectId::new("")])
            .unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles.get(&ObjectId::new("F1")).unwrap().name, "F1");
    }
}
