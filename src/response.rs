//! Handler results.
//!
//! A [`Response`] is a closed set of kinds. The reducer peels off
//! [`Response::Indirect`] layers and the transport adapter rewrites
//! [`Response::Modal`] and [`Response::Relocation`]; everything else is sent
//! as-is.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body text of the fixed forbidden response.
pub const FORBIDDEN_BODY: &str = "Access Forbidden";

const DIALOG_CLASS: &str = "dialog-view";

/// A value produced by a handler.
#[derive(Debug, Clone)]
pub enum Response {
    /// A full HTML page.
    Page(Page),
    /// The fixed "access forbidden" response.
    Forbidden,
    /// A structured payload for background requests.
    Payload(AjaxPayload),
    /// An interactive overlay.
    Modal(Dialog),
    /// A redirect to another location.
    Relocation(String),
    /// A wrapper that produces another response when reduced.
    Indirect(Indirect),
}

impl Response {
    /// Short name of the response kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Page(_) => "page",
            Response::Forbidden => "forbidden",
            Response::Payload(_) => "payload",
            Response::Modal(_) => "modal",
            Response::Relocation(_) => "relocation",
            Response::Indirect(proxy) => proxy.kind(),
        }
    }

    /// HTTP status code for terminal responses. Indirect responses report 200
    /// since their status is decided by what they reduce to.
    pub fn status(&self) -> u16 {
        match self {
            Response::Forbidden => 403,
            Response::Relocation(_) => 302,
            Response::Page(_) | Response::Payload(_) | Response::Modal(_) | Response::Indirect(_) => {
                200
            }
        }
    }

    /// Body to write on the wire, for kinds that have one.
    ///
    /// Relocations carry no body and indirect responses must be reduced first.
    pub fn body(&self) -> Option<String> {
        match self {
            Response::Page(page) => Some(page.render()),
            Response::Forbidden => Some(FORBIDDEN_BODY.to_string()),
            Response::Payload(payload) => Some(payload.to_json().to_string()),
            Response::Modal(dialog) => Some(dialog.render()),
            Response::Relocation(_) | Response::Indirect(_) => None,
        }
    }

    /// Convenience constructor for a redirect.
    pub fn redirect(target: impl Into<String>) -> Self {
        Response::Relocation(target.into())
    }

    /// Convenience constructor for a dialog with the given rendered body.
    pub fn modal(body: impl Into<String>) -> Self {
        Response::Modal(Dialog::new(body))
    }

    /// Wraps a proxy implementation.
    pub fn indirect(proxy: impl ProxyResponse + 'static) -> Self {
        Response::Indirect(Indirect::new(proxy))
    }
}

/// A full page: a title and the content placed inside the page shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: String,
    content: String,
}

impl Page {
    /// Creates a page.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Returns the page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the content placed inside the shell.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Renders the content inside a minimal HTML document.
    pub fn render(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\" /><title>{}</title></head><body>{}</body></html>",
            escape_html(&self.title),
            self.content
        )
    }
}

/// A modal dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    body: String,
    standalone: bool,
}

impl Dialog {
    /// Creates a dialog from its already-rendered body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            standalone: false,
        }
    }

    /// Marks the dialog as rendered outside of any page.
    pub fn set_standalone(&mut self, standalone: bool) {
        self.standalone = standalone;
    }

    /// Returns `true` once the dialog is rendered on its own.
    pub fn is_standalone(&self) -> bool {
        self.standalone
    }

    /// Returns the dialog body as the handler rendered it.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Renders the dialog markup.
    ///
    /// A standalone dialog is the bare body; the client script supplies the
    /// container. Otherwise the body is placed in a dialog container.
    pub fn render(&self) -> String {
        if self.standalone {
            self.body.clone()
        } else {
            format!("<div class=\"{}\">{}</div>", DIALOG_CLASS, self.body)
        }
    }
}

/// Payload sent to background requests in place of a page or redirect.
///
/// Serializes to an object with exactly one field.
///
/// ```
/// use request_gate::AjaxPayload;
///
/// let payload = AjaxPayload::Redirect("/D123".to_string());
/// assert_eq!(payload.to_json().to_string(), r#"{"redirect":"/D123"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AjaxPayload {
    /// Rendered dialog markup
    Dialog(String),
    /// Location the client script should navigate to
    Redirect(String),
}

impl AjaxPayload {
    /// Returns the payload as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AjaxPayload::Dialog(body) => json!({ "dialog": body }),
            AjaxPayload::Redirect(uri) => json!({ "redirect": uri }),
        }
    }
}

/// A response that stands in for another one.
///
/// Implementations are layers of decoration; [`reduce_proxy`](Self::reduce_proxy)
/// returns the next response in the chain.
pub trait ProxyResponse: Send + Sync {
    /// Short name of this layer, used in diagnostics.
    fn kind(&self) -> &'static str;

    /// Produces the wrapped response.
    fn reduce_proxy(&self) -> Response;
}

/// Shared handle to a [`ProxyResponse`].
///
/// Clones share identity: the reducer treats two clones as the same response.
#[derive(Clone)]
pub struct Indirect(Arc<dyn ProxyResponse>);

impl Indirect {
    /// Wraps a proxy.
    pub fn new(proxy: impl ProxyResponse + 'static) -> Self {
        Self(Arc::new(proxy))
    }

    /// Wraps an already shared proxy, keeping its identity.
    pub fn from_arc(proxy: Arc<dyn ProxyResponse>) -> Self {
        Self(proxy)
    }

    /// Identity of the underlying proxy object.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Short name of the wrapped layer.
    pub fn kind(&self) -> &'static str {
        self.0.kind()
    }

    /// Produces the wrapped response.
    pub fn reduce(&self) -> Response {
        self.0.reduce_proxy()
    }
}

impl fmt::Debug for Indirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Indirect").field(&self.kind()).finish()
    }
}

/// A named decoration layer around another response.
#[derive(Debug, Clone)]
pub struct Decorated {
    layer: &'static str,
    inner: Response,
}

impl Decorated {
    /// Wraps `inner` under the layer name `layer`.
    pub fn new(layer: &'static str, inner: Response) -> Self {
        Self { layer, inner }
    }
}

impl ProxyResponse for Decorated {
    fn kind(&self) -> &'static str {
        self.layer
    }

    fn reduce_proxy(&self) -> Response {
        self.inner.clone()
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_kinds() {
        assert_eq!(Response::Forbidden.status(), 403);
        assert_eq!(Response::redirect("/x").status(), 302);
        assert_eq!(Response::modal("m").status(), 200);
        assert_eq!(Response::Page(Page::new("t", "c")).status(), 200);
    }

    #[test]
    fn payload_serializes_with_single_field() {
        let payload = AjaxPayload::Dialog("<b>hi</b>".to_string());
        let serialized = serde_json::to_string(&payload).unwrap();

        assert_eq!(serialized, r#"{"dialog":"<b>hi</b>"}"#);
        assert_eq!(serde_json::to_value(&payload).unwrap(), payload.to_json());
    }

    #[test]
    fn page_shell_escapes_title_but_not_content() {
        let page = Page::new("<Files>", "<p>ok</p>");
        let html = page.render();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>&lt;Files&gt;</title>"));
        assert!(html.contains("<body><p>ok</p></body>"));
    }

    #[test]
    fn decorated_reduces_to_inner() {
        let response = Response::indirect(Decorated::new("layout", Response::redirect("/home")));
        assert_eq!(response.kind(), "layout");

        match response {
            Response::Indirect(proxy) => {
                assert!(matches!(proxy.reduce(), Response::Relocation(ref t) if t == "/home"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn indirect_clones_share_identity() {
        let a = Indirect::new(Decorated::new("layer", Response::Forbidden));
        let b = a.clone();
        let c = Indirect::new(Decorated::new("layer", Response::Forbidden));

        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn dialog_standalone_flag() {
        let mut dialog = Dialog::new("<b>hi</b>");
        assert!(!dialog.is_standalone());
        assert_eq!(dialog.render(), "<div class=\"dialog-view\"><b>hi</b></div>");

        dialog.set_standalone(true);
        assert!(dialog.is_standalone());
        assert_eq!(dialog.render(), "<b>hi</b>");
        assert_eq!(dialog.body(), "<b>hi</b>");
    }
}
