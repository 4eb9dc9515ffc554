//! Rewrites terminal responses for the caller's transport mode.

use crate::request::TransportMode;
use crate::response::{AjaxPayload, Page, Response};

/// Title of the page a foreground dialog is embedded in.
pub const DIALOG_PAGE_TITLE: &str = "Dialog";

/// Adapts a reduced response to the transport the request arrived on.
///
/// - Modal, background: the dialog is marked standalone and sent as
///   `{"dialog": ...}`.
/// - Modal, foreground: the dialog is embedded in a full page.
/// - Relocation, background: sent as `{"redirect": ...}` so the client script
///   can navigate itself.
/// - Anything else passes through.
///
/// # Examples
///
/// ```
/// use request_gate::{adapt_response, AjaxPayload, Response, TransportMode};
///
/// let adapted = adapt_response(Response::redirect("/D123"), TransportMode::Background);
/// assert!(matches!(adapted, Response::Payload(AjaxPayload::Redirect(ref t)) if t == "/D123"));
/// ```
pub fn adapt_response(response: Response, mode: TransportMode) -> Response {
    match (response, mode) {
        (Response::Modal(mut dialog), TransportMode::Background) => {
            dialog.set_standalone(true);
            Response::Payload(AjaxPayload::Dialog(dialog.render()))
        }
        (Response::Modal(dialog), TransportMode::Foreground) => {
            let content = format!("<div style=\"padding: 2em 0;\">{}</div>", dialog.render());
            Response::Page(Page::new(DIALOG_PAGE_TITLE, content))
        }
        (Response::Relocation(target), TransportMode::Background) => {
            Response::Payload(AjaxPayload::Redirect(target))
        }
        (other, _) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_modal_becomes_dialog_payload() {
        let adapted = adapt_response(Response::modal("<b>hi</b>"), TransportMode::Background);

        match adapted {
            Response::Payload(payload) => {
                assert_eq!(payload.to_json().to_string(), r#"{"dialog":"<b>hi</b>"}"#);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn foreground_modal_becomes_page() {
        let adapted = adapt_response(Response::modal("<b>hi</b>"), TransportMode::Foreground);

        match adapted {
            Response::Page(page) => {
                assert_eq!(
                    page.content(),
                    "<div style=\"padding: 2em 0;\"><div class=\"dialog-view\"><b>hi</b></div></div>"
                );
                let html = page.render();
                assert!(html.starts_with("<!DOCTYPE html>"));
                assert!(html.contains("<b>hi</b>"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn background_relocation_becomes_redirect_payload() {
        let adapted = adapt_response(Response::redirect("/D123"), TransportMode::Background);
        assert!(matches!(adapted, Response::Payload(AjaxPayload::Redirect(ref t)) if t == "/D123"));
    }

    #[test]
    fn foreground_relocation_passes_through() {
        let adapted = adapt_response(Response::redirect("/D123"), TransportMode::Foreground);
        assert!(matches!(adapted, Response::Relocation(ref t) if t == "/D123"));
        assert_eq!(adapted.status(), 302);
    }

    #[test]
    fn other_kinds_pass_through_in_both_modes() {
        for mode in [TransportMode::Foreground, TransportMode::Background] {
            assert!(matches!(adapt_response(Response::Forbidden, mode), Response::Forbidden));
            let page = adapt_response(Response::Page(Page::new("t", "c")), mode);
            assert!(matches!(page, Response::Page(ref p) if p.content() == "c"));
        }
    }
}
