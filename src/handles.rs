//! Display handles for objects, loaded in batches for the current viewer.

use std::collections::HashMap;

use crate::application::ObjectId;
use crate::caller::Caller;
use crate::error::{Error, StorageError};
use crate::response::escape_html;

/// Display information for one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    /// Object the handle describes
    pub id: ObjectId,
    /// Display name
    pub name: String,
    /// Link target
    pub uri: String,
}

impl Handle {
    /// Creates a handle.
    pub fn new(id: impl Into<ObjectId>, name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uri: uri.into(),
        }
    }

    /// Renders the handle as a link.
    pub fn render_link(&self) -> String {
        format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&self.uri),
            escape_html(&self.name)
        )
    }
}

/// Batch loader for handles, scoped to a viewer.
pub trait HandleLoader: Send + Sync {
    /// Loads handles for `ids`. Objects the viewer can't see may be omitted.
    fn load_handles(&self, viewer: &Caller, ids: &[ObjectId]) -> Result<HashMap<ObjectId, Handle>, StorageError>;
}

/// Loader serving a fixed set of handles to every viewer.
#[derive(Debug, Default, Clone)]
pub struct StaticHandleLoader {
    handles: HashMap<ObjectId, Handle>,
}

impl StaticHandleLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handle.
    pub fn with(mut self, handle: Handle) -> Self {
        self.handles.insert(handle.id.clone(), handle);
        self
    }
}

impl HandleLoader for StaticHandleLoader {
    fn load_handles(&self, _viewer: &Caller, ids: &[ObjectId]) -> Result<HashMap<ObjectId, Handle>, StorageError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.handles.get(id).map(|h| (id.clone(), h.clone())))
            .collect())
    }
}

/// Separator used when rendering a list of handle links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleListStyle {
    /// One link per line
    Lines,
    /// Links inline, comma separated
    Inline,
}

impl HandleListStyle {
    /// Parses the style marker: `"\n"` for lines, `","` for inline.
    pub fn parse(style: &str) -> Result<Self, Error> {
        match style {
            "\n" => Ok(HandleListStyle::Lines),
            "," => Ok(HandleListStyle::Inline),
            other => Err(Error::UnknownHandleStyle(other.to_string())),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            HandleListStyle::Lines => "<br />",
            HandleListStyle::Inline => ", ",
        }
    }
}

/// Handles loaded for the current request.
///
/// Reading a handle that was not part of the load is a programming error and
/// fails immediately.
#[derive(Debug, Default, Clone)]
pub struct LoadedHandles {
    handles: HashMap<ObjectId, Handle>,
}

impl LoadedHandles {
    /// Wraps a loaded batch.
    pub fn new(handles: HashMap<ObjectId, Handle>) -> Self {
        Self { handles }
    }

    /// Returns a loaded handle.
    pub fn get(&self, id: &ObjectId) -> Result<&Handle, Error> {
        self.handles
            .get(id)
            .ok_or_else(|| Error::HandleNotLoaded(id.clone()))
    }

    /// Number of loaded handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Renders links for `ids`, skipping empty identifiers.
    ///
    /// `style` is `"\n"` (one per line) or `","` (inline); anything else is an
    /// error.
    pub fn render_list(&self, ids: &[ObjectId], style: &str) -> Result<String, Error> {
        let style = HandleListStyle::parse(style)?;
        let links = ids
            .iter()
            .filter(|id| !id.is_empty())
            .map(|id| self.get(id).map(Handle::render_link))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links.join(style.separator()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> LoadedHandles {
        let loader = StaticHandleLoader::new()
            .with(Handle::new("D1", "D1: Fix parser", "/D1"))
            .with(Handle::new("T2", "T2 <urgent>", "/T2"));
        let ids = [ObjectId::new("D1"), ObjectId::new("T2"), ObjectId::new("X9")];
        LoadedHandles::new(loader.load_handles(&Caller::anonymous(), &ids).unwrap())
    }

    #[test]
    fn loader_omits_unknown_objects() {
        assert_eq!(loaded().len(), 2);
    }

    #[test]
    fn unloaded_handle_is_an_error() {
        let handles = loaded();
        match handles.get(&ObjectId::new("X9")) {
            Err(Error::HandleNotLoaded(id)) => assert_eq!(id.as_str(), "X9"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn render_list_styles() {
        let handles = loaded();
        let ids = [ObjectId::new("D1"), ObjectId::new(""), ObjectId::new("T2")];

        let lines = handles.render_list(&ids, "\n").unwrap();
        assert_eq!(
            lines,
            "<a href=\"/D1\">D1: Fix parser</a><br /><a href=\"/T2\">T2 &lt;urgent&gt;</a>"
        );

        let inline = handles.render_list(&ids, ",").unwrap();
        assert!(inline.contains("</a>, <a"));
    }

    #[test]
    fn unknown_style_is_rejected() {
        let err = loaded().render_list(&[], ";").unwrap_err();
        assert!(matches!(err, Error::UnknownHandleStyle(ref s) if s == ";"));
    }
}
