use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::application::ObjectId;
use crate::caller::Caller;
use crate::error::StorageError;

/// A capability a viewer may hold on an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// May see the object at all
    View,
    /// May modify the object
    Edit,
    /// Application-defined capability
    Custom(String),
}

impl Capability {
    /// Returns the wire name of the capability.
    pub fn as_str(&self) -> &str {
        match self {
            Capability::View => "view",
            Capability::Edit => "edit",
            Capability::Custom(name) => name,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers "does viewer V have capability C on object O".
///
/// How capabilities are stored and evaluated is outside this crate; the
/// pipeline only consumes the yes/no answer or the failure.
pub trait CapabilityOracle: Send + Sync {
    /// Returns whether `viewer` holds `capability` on `object`.
    fn has_capability(
        &self,
        viewer: &Caller,
        capability: &Capability,
        object: &ObjectId,
    ) -> Result<bool, StorageError>;
}

/// Oracle backed by an explicit grant list.
///
/// Grants are keyed by viewer identifier, so anonymous callers share the
/// grants of the empty identifier. Objects listed as public are visible to
/// everyone for [`Capability::View`].
#[derive(Debug, Default, Clone)]
pub struct StaticOracle {
    grants: HashSet<(ObjectId, Capability, ObjectId)>,
    public: HashSet<ObjectId>,
}

impl StaticOracle {
    /// Creates an oracle that denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `capability` on `object` to the viewer `viewer`.
    pub fn grant(mut self, viewer: impl Into<ObjectId>, capability: Capability, object: impl Into<ObjectId>) -> Self {
        self.grants
            .insert((viewer.into(), capability, object.into()));
        self
    }

    /// Makes `object` viewable by any caller, including anonymous ones.
    pub fn public(mut self, object: impl Into<ObjectId>) -> Self {
        self.public.insert(object.into());
        self
    }
}

impl CapabilityOracle for StaticOracle {
    fn has_capability(
        &self,
        viewer: &Caller,
        capability: &Capability,
        object: &ObjectId,
    ) -> Result<bool, StorageError> {
        if *capability == Capability::View && self.public.contains(object) {
            return Ok(true);
        }
        Ok(self
            .grants
            .contains(&(viewer.id().clone(), capability.clone(), object.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_oracle_denies_by_default() {
        let oracle = StaticOracle::new();
        let viewer = Caller::anonymous();
        let allowed = oracle
            .has_capability(&viewer, &Capability::View, &ObjectId::new("APPL-x"))
            .unwrap();
        assert!(!allowed);
    }

    #[test]
    fn public_objects_are_viewable_but_not_editable() {
        let oracle = StaticOracle::new().public("APPL-x");
        let viewer = Caller::anonymous();
        let object = ObjectId::new("APPL-x");

        assert!(oracle.has_capability(&viewer, &Capability::View, &object).unwrap());
        assert!(!oracle.has_capability(&viewer, &Capability::Edit, &object).unwrap());
    }

    #[test]
    fn grants_are_per_viewer() {
        let oracle = StaticOracle::new().grant("USER-1", Capability::Edit, "DOC-1");
        let alice = Caller::builder("USER-1").build();
        let bob = Caller::builder("USER-2").build();
        let doc = ObjectId::new("DOC-1");

        assert!(oracle.has_capability(&alice, &Capability::Edit, &doc).unwrap());
        assert!(!oracle.has_capability(&bob, &Capability::Edit, &doc).unwrap());
    }

    #[test]
    fn custom_capability_displays_its_name() {
        assert_eq!(Capability::Custom("files.upload".into()).to_string(), "files.upload");
        assert_eq!(Capability::View.to_string(), "view");
    }
}
