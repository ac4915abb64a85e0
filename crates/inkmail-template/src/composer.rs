//! Composer - merges rendered content into a master layout

use std::sync::LazyLock;

use regex::Regex;

/// Marker in the master layout replaced by the rendered body
pub const DEFAULT_CONTENT_MARKER: &str = "[#content#]";

/// Outer layout shared by a family of emails
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterTemplate {
    /// Layout markup holding the content marker
    pub body_markup: String,
    /// Stylesheet applied to the composed email
    pub css: String,
    /// Emit the stylesheet as a `<style>` block instead of inlining it
    pub inline_css_disabled: bool,
}

/// How the master template's CSS reaches the email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssMode<'a> {
    /// Inline into `style` attributes
    Inline(&'a str),
    /// Append as a `<style>` element to the head
    StyleBlock(&'a str),
    /// Nothing to apply
    None,
}

impl MasterTemplate {
    pub fn new(body_markup: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            body_markup: body_markup.into(),
            css: css.into(),
            inline_css_disabled: false,
        }
    }

    /// Builder: keep the CSS as a style block
    pub fn with_inlining_disabled(mut self) -> Self {
        self.inline_css_disabled = true;
        self
    }

    pub fn css_mode(&self) -> CssMode<'_> {
        if self.css.trim().is_empty() {
            CssMode::None
        } else if self.inline_css_disabled {
            CssMode::StyleBlock(&self.css)
        } else {
            CssMode::Inline(&self.css)
        }
    }
}

impl CssMode<'_> {
    /// `<style>` element markup for the style block mode
    pub fn style_element(&self) -> Option<String> {
        match self {
            CssMode::StyleBlock(css) => Some(format!("<style>{css}</style>")),
            _ => None,
        }
    }
}

/// Place `content` at the first `marker` of the master layout
pub fn compose_body(content: &str, master: Option<&str>, marker: &str) -> String {
    let Some(master) = master.filter(|m| !m.is_empty()) else {
        return content.to_string();
    };
    if marker.is_empty() || !master.contains(marker) {
        tracing::debug!("Master template has no content marker {:?}", marker);
        return master.to_string();
    }
    master.replacen(marker, content, 1)
}

/// Doctype of the envelope around bare bodies
pub const ENVELOPE_DOCTYPE: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#;

/// Markup that already is a complete document
static DOCUMENT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*<(!doctype|html)[\s>]").expect("static regex"));

/// Complete document for the transport: full documents get `head_markup`
/// before their `</head>`, bare bodies are wrapped. A document that opens
/// with `<html>` but lacks a doctype gets the envelope doctype.
pub fn wrap_document(body: &str, head_markup: &str) -> String {
    let Some(caps) = DOCUMENT_START.captures(body) else {
        return format!("{ENVELOPE_DOCTYPE}<html><head>{head_markup}</head><body>{body}</body></html>");
    };
    let doctype = if caps[1].eq_ignore_ascii_case("html") {
        ENVELOPE_DOCTYPE
    } else {
        ""
    };

    let mut document = String::with_capacity(doctype.len() + body.len() + head_markup.len());
    document.push_str(doctype);
    match body.find("</head>") {
        Some(index) => {
            document.push_str(&body[..index]);
            document.push_str(head_markup);
            document.push_str(&body[index..]);
        }
        None => document.push_str(body),
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_with_master() {
        let out = compose_body("<p>Hi</p>", Some("<div>[#content#]</div>"), DEFAULT_CONTENT_MARKER);
        assert_eq!(out, "<div><p>Hi</p></div>");
    }

    #[test]
    fn test_only_first_marker_replaced() {
        let out = compose_body("X", Some("[#content#]|[#content#]"), DEFAULT_CONTENT_MARKER);
        assert_eq!(out, "X|[#content#]");
    }

    #[test]
    fn test_without_master() {
        assert_eq!(compose_body("<p>Hi</p>", None, DEFAULT_CONTENT_MARKER), "<p>Hi</p>");
        assert_eq!(compose_body("<p>Hi</p>", Some(""), DEFAULT_CONTENT_MARKER), "<p>Hi</p>");
    }

    #[test]
    fn test_master_without_marker_returned() {
        let out = compose_body("<p>Hi</p>", Some("<div>layout</div>"), DEFAULT_CONTENT_MARKER);
        assert_eq!(out, "<div>layout</div>");
    }

    #[test]
    fn test_css_mode() {
        let master = MasterTemplate::new("[#content#]", "p{color:red}");
        assert_eq!(master.css_mode(), CssMode::Inline("p{color:red}"));

        let master = master.with_inlining_disabled();
        assert_eq!(master.css_mode(), CssMode::StyleBlock("p{color:red}"));
        assert_eq!(
            master.css_mode().style_element().as_deref(),
            Some("<style>p{color:red}</style>")
        );

        assert_eq!(MasterTemplate::new("x", "  ").css_mode(), CssMode::None);
    }

    #[test]
    fn test_wrap_bare_body() {
        let out = wrap_document("<p>x</p>", "<style>p{}</style>");
        assert_eq!(
            out,
            format!("{ENVELOPE_DOCTYPE}<html><head><style>p{{}}</style></head><body><p>x</p></body></html>")
        );
    }

    #[test]
    fn test_wrap_full_document() {
        let body = "<!DOCTYPE html><html><head><title>t</title></head><body></body></html>";
        assert_eq!(
            wrap_document(body, "<style>p{}</style>"),
            "<!DOCTYPE html><html><head><title>t</title><style>p{}</style></head><body></body></html>"
        );
        let headless = "<!doctype html><p>x</p>";
        assert_eq!(wrap_document(headless, "<style>p{}</style>"), headless);
    }

    #[test]
    fn test_wrap_document_without_doctype() {
        let body = "<html><head></head><body><p>x</p></body></html>";
        assert_eq!(
            wrap_document(body, "<style>p{}</style>"),
            format!("{ENVELOPE_DOCTYPE}<html><head><style>p{{}}</style></head><body><p>x</p></body></html>")
        );

        let out = wrap_document("  <HTML lang=\"en\"><body>x</body></HTML>", "");
        assert!(out.starts_with(ENVELOPE_DOCTYPE));
        assert!(!out.contains("<body><html"));
        assert_eq!(out.matches("<body>").count(), 1);

        // only a leading <html> counts as a document
        let out = wrap_document("<p>see <html> docs</p>", "");
        assert!(out.ends_with("<body><p>see <html> docs</p></body></html>"));
    }
}
