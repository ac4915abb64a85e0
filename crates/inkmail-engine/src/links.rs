//! Link & asset rewriting
//!
//! Mail clients have no base URL, so every relative reference is made
//! absolute. Hyperlinks additionally open in a new window and, with tracking,
//! route through the click redirect.

use std::sync::LazyLock;

use inkmail_dom::Document;
use inkmail_template::TAG_PREFIX;
use regex::Regex;

use crate::collaborators::ContentLinkResolver;
use crate::tracking::click_url;

/// Internal content reference stored by the rich-text editor
static LOCAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\{localLink:([^}]*)\}").expect("static regex"));

/// Attributes made absolute by the final string pass
const URL_ATTRIBUTES: &[&str] = &["src", "href", "background"];

/// Rewrite hyperlinks, then absolutize assets
pub fn rewrite_links_and_assets(
    doc: &mut Document,
    tracking_id: Option<&str>,
    base_url: &str,
    resolver: &dyn ContentLinkResolver,
) {
    let links = rewrite_hyperlinks(doc, tracking_id, base_url, resolver);
    let assets = absolutize_assets(doc, base_url);
    tracing::debug!("Rewrote {} links and {} asset URLs", links, assets);
}

/// Prefix relative `src` (or, without `src`, `background`) URLs with the site URL
pub fn absolutize_assets(doc: &mut Document, base_url: &str) -> usize {
    let tree = doc.tree_mut();
    let mut rewritten = 0;

    for node in tree.elements() {
        let attr = if tree.attr(node, "src").is_some() {
            "src"
        } else if tree.attr(node, "background").is_some() {
            "background"
        } else {
            continue;
        };
        let Some(value) = tree.attr(node, attr).filter(|v| v.starts_with('/')) else {
            continue;
        };
        let absolute = format!("{base_url}{value}");
        if tree.set_attr(node, attr, absolute).is_ok() {
            rewritten += 1;
        }
    }
    rewritten
}

/// Open every `<a>` in a new window and normalize its `href`
pub fn rewrite_hyperlinks(
    doc: &mut Document,
    tracking_id: Option<&str>,
    base_url: &str,
    resolver: &dyn ContentLinkResolver,
) -> usize {
    let tree = doc.tree_mut();
    let anchors = tree.elements_by_tag(&["a"]);

    for &anchor in &anchors {
        if let Err(e) = tree.set_attr(anchor, "target", "_blank") {
            tracing::debug!("Cannot set link target: {}", e);
            continue;
        }
        let Some(href) = tree.attr(anchor, "href").filter(|h| !h.is_empty()) else {
            continue;
        };
        let rewritten = rewrite_href(href, tracking_id, base_url, resolver);
        if let Err(e) = tree.set_attr(anchor, "href", rewritten) {
            tracing::debug!("Cannot rewrite link: {}", e);
        }
    }
    anchors.len()
}

/// New value for one non-empty `href`
pub fn rewrite_href(
    href: &str,
    tracking_id: Option<&str>,
    base_url: &str,
    resolver: &dyn ContentLinkResolver,
) -> String {
    let mut url = resolve_local_link(href, resolver).unwrap_or_else(|| href.to_string());

    // Left-over tag token: keep it intact for the web version
    if url.contains(TAG_PREFIX) {
        if let Some(start) = url.find('[') {
            url.drain(..start);
        }
        return url;
    }

    // Editor artifacts: "//http://..." and "/http://..."
    if url.starts_with("//") || url.starts_with("/http") {
        url.remove(0);
    }
    if url.starts_with('/') {
        url.insert_str(0, base_url);
    }

    match tracking_id {
        Some(id) => click_url(base_url, id, &url),
        None => url,
    }
}

fn resolve_local_link(href: &str, resolver: &dyn ContentLinkResolver) -> Option<String> {
    let caps = LOCAL_LINK.captures(href)?;
    let content_id = caps[1].trim().parse::<u64>().ok()?;
    match resolver.resolve(content_id) {
        Ok(Some(url)) => Some(url),
        Ok(None) => {
            tracing::debug!("Content link {} could not be resolved", content_id);
            None
        }
        Err(e) => {
            tracing::warn!("Resolving content link {} failed: {}", content_id, e);
            None
        }
    }
}

/// String-level pass over the serialized email. Also reaches markup the DOM
/// never sees, such as Outlook conditional comments.
pub fn absolutize_markup(html: &str, base_url: &str) -> String {
    let mut output = html.to_string();
    for attr in URL_ATTRIBUTES {
        let relative = format!("{attr}=\"/");
        if output.contains(&relative) {
            output = output.replace(&relative, &format!("{attr}=\"{base_url}/"));
        }
    }
    output
}

/// Drop the editor path the rich-text editor puts in front of tag tokens,
/// e.g. `href="/umbraco/[#url#]"` becomes `href="[#url#]"`
pub fn strip_editor_prefix(html: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return html.to_string();
    }
    let mut output = html.to_string();
    for attr in ["href", "src"] {
        let prefixed = format!("{attr}=\"{prefix}{TAG_PREFIX}");
        if output.contains(&prefixed) {
            output = output.replace(&prefixed, &format!("{attr}=\"{TAG_PREFIX}"));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ContentLinkMap, NoContentLinks};

    const BASE: &str = "https://example.com";

    #[test]
    fn test_relative_href_absolutized() {
        assert_eq!(rewrite_href("/promo", None, BASE, &NoContentLinks), "https://example.com/promo");
        assert_eq!(
            rewrite_href("https://other.org/x", None, BASE, &NoContentLinks),
            "https://other.org/x"
        );
    }

    #[test]
    fn test_click_tracking() {
        assert_eq!(
            rewrite_href("/promo", Some("42"), BASE, &NoContentLinks),
            "https://example.com?i=42&a=click&v=https%3A%2F%2Fexample.com%2Fpromo"
        );
    }

    #[test]
    fn test_editor_slash_artifacts() {
        assert_eq!(
            rewrite_href("/http://other.org", None, BASE, &NoContentLinks),
            "http://other.org"
        );
        assert_eq!(
            rewrite_href("//other.org", None, BASE, &NoContentLinks),
            "https://example.com/other.org"
        );
    }

    #[test]
    fn test_tag_token_truncation() {
        assert_eq!(
            rewrite_href("/umbraco/[#link#]", Some("42"), BASE, &NoContentLinks),
            "[#link#]"
        );
    }

    #[test]
    fn test_local_link_resolution() {
        let links = ContentLinkMap::new().with_link(1234, "/news/spring");
        assert_eq!(
            rewrite_href("/{localLink:1234}", None, BASE, &links),
            "https://example.com/news/spring"
        );
        assert_eq!(
            rewrite_href("/{localLink:99}", None, BASE, &links),
            "https://example.com/{localLink:99}"
        );
    }

    #[test]
    fn test_absolutize_markup() {
        let html = r#"<!--[if mso]><v:image src="/bg.png" /><![endif]--><a href="/x">x</a><td background="/y.png"></td>"#;
        assert_eq!(
            absolutize_markup(html, BASE),
            r#"<!--[if mso]><v:image src="https://example.com/bg.png" /><![endif]--><a href="https://example.com/x">x</a><td background="https://example.com/y.png"></td>"#
        );
    }

    #[test]
    fn test_strip_editor_prefix() {
        let html = r#"<a href="/umbraco/[#url#]">x</a><img src="/umbraco/[#img#]"><a href="/umbraco/page">p</a>"#;
        assert_eq!(
            strip_editor_prefix(html, "/umbraco/"),
            r#"<a href="[#url#]">x</a><img src="[#img#]"><a href="/umbraco/page">p</a>"#
        );
        assert_eq!(strip_editor_prefix(html, ""), html);
    }
}
