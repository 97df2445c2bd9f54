//! Live-preview document assembly.
//!
//! `render_isolated` is the whole renderer: a pure, synchronous transformation
//! of the student's buffer into a standalone document, regenerated wholesale
//! on every call. There is no incremental patching of previously rendered
//! output, no validation, and no network or storage access. Malformed markup
//! is left to the embedding engine's native recovery.
//!
//! Isolation contract: the document is meant for a separate browsing context
//! (iframe `srcdoc` on the client, or an HTTP response carrying the CSP
//! `sandbox` directive). The only capabilities granted are script execution
//! inside that context and same-origin resource loads. That grant is
//! deliberate and is safe only while each user's buffer renders in that same
//! user's own client; widen the audience and the grant must be revisited.

/// Capabilities granted to the isolated context, in attribute order.
pub const SANDBOX_GRANTS: [&str; 2] = ["allow-scripts", "allow-same-origin"];

/// A regenerated preview document. Ephemeral: build, ship, discard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewDocument {
    pub html: String,
}

/// Turn the raw buffer into a standalone document.
///
/// Buffers that already declare a doctype are treated as complete documents
/// and pass through verbatim; anything else is embedded into the minimal
/// body shell the editor has always used.
pub fn render_isolated(code: &str) -> PreviewDocument {
    let html = if has_doctype(code) {
        code.to_string()
    } else {
        format!("<body style='color:#111;'>{code}</body>")
    };
    PreviewDocument { html }
}

/// Value for an iframe `sandbox` attribute.
pub fn sandbox_attribute() -> String {
    SANDBOX_GRANTS.join(" ")
}

/// Value for a `Content-Security-Policy` header carrying the same grant.
pub fn csp_sandbox_header() -> String {
    format!("sandbox {}", SANDBOX_GRANTS.join(" "))
}

fn has_doctype(code: &str) -> bool {
    let head: String = code.trim_start().chars().take(9).collect();
    head.eq_ignore_ascii_case("<!doctype")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_is_wrapped_in_the_body_shell() {
        let doc = render_isolated("<h1>Hi</h1>");
        assert_eq!(doc.html, "<body style='color:#111;'><h1>Hi</h1></body>");
    }

    #[test]
    fn full_documents_pass_through_verbatim() {
        let code = "  <!DOCTYPE html>\n<html><body>x</body></html>";
        assert_eq!(render_isolated(code).html, code);
        // case-insensitive, as browsers accept it
        assert_eq!(render_isolated("<!doctype html><p>y</p>").html, "<!doctype html><p>y</p>");
    }

    #[test]
    fn scripts_are_carried_not_interpreted() {
        // The renderer never inspects or strips the buffer; a hostile script
        // ends up inside the isolated document, where the sandbox confines it.
        let code = "<script>window.top.document.title='hacked'</script>";
        let doc = render_isolated(code);
        assert!(doc.html.contains(code));
    }

    #[test]
    fn rendering_is_a_pure_rebuild() {
        let a = render_isolated("<p>one</p>");
        let b = render_isolated("<p>one</p>");
        assert_eq!(a, b);
    }

    #[test]
    fn capability_grant_is_exactly_scripts_and_same_origin() {
        assert_eq!(sandbox_attribute(), "allow-scripts allow-same-origin");
        assert_eq!(csp_sandbox_header(), "sandbox allow-scripts allow-same-origin");
    }

    #[test]
    fn malformed_markup_is_tolerated() {
        let doc = render_isolated("<div><span>unclosed");
        assert!(doc.html.ends_with("<div><span>unclosed</body>"));
    }
}
