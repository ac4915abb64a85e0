//! Legacy attribute backfill
//!
//! Several mail clients ignore inline CSS on table markup, so the resolved
//! alignment and background of `table`, `tr`, `td` and `p` are mirrored into
//! `valign`, `align` and `bgcolor` attributes.

use std::sync::LazyLock;

use inkmail_dom::Document;
use regex::Regex;

use crate::style::ElementStyle;

static IMPORTANT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*!\s*important").expect("static regex"));

const BACKFILL_TAGS: &[&str] = &["table", "tr", "td", "p"];

/// Legacy attribute written for a style property on element `tag`
fn legacy_attribute(tag: &str, property: &str) -> Option<&'static str> {
    match property {
        "vertical-align" if tag != "table" && tag != "tr" => Some("valign"),
        "text-align" => Some("align"),
        "background" | "background-color" => Some("bgcolor"),
        _ => None,
    }
}

/// Write `valign`/`align`/`bgcolor` from inline styles, then strip every
/// `!important` marker from the document
pub fn backfill_legacy_attributes(doc: &mut Document) {
    let tree = doc.tree_mut();
    let mut written = 0usize;

    for node in tree.elements_by_tag(BACKFILL_TAGS) {
        let Some(tag) = tree.tag_name(node).map(str::to_string) else {
            continue;
        };
        let Some(style) = tree.attr(node, "style").map(ElementStyle::parse) else {
            continue;
        };

        for decl in style.iter().rev() {
            let Some(attr) = legacy_attribute(&tag, &decl.property) else {
                continue;
            };
            if tree.attr(node, attr).is_none() || decl.important {
                if let Err(e) = tree.set_attr(node, attr, decl.value.clone()) {
                    tracing::debug!("Backfill of {} failed: {}", attr, e);
                    continue;
                }
                written += 1;
            }
        }
    }

    tracing::debug!("Backfilled {} legacy attributes", written);
    strip_important(doc);
}

/// Remove `!important` from every `style` attribute
pub fn strip_important(doc: &mut Document) {
    let tree = doc.tree_mut();
    for node in tree.elements() {
        let Some(style) = tree.attr(node, "style") else {
            continue;
        };
        if !IMPORTANT_MARKER.is_match(style) {
            continue;
        }
        let stripped = IMPORTANT_MARKER.replace_all(style, "").into_owned();
        if let Err(e) = tree.set_attr(node, "style", stripped) {
            tracing::debug!("Stripping !important failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmail_dom::NodeId;

    fn element(doc: &mut Document, tag: &str, style: &str) -> NodeId {
        let tree = doc.tree_mut();
        let node = tree.create_element(tag);
        tree.append_child(NodeId::ROOT, node).unwrap();
        tree.set_attr(node, "style", style).unwrap();
        node
    }

    #[test]
    fn test_text_align_to_align() {
        let mut doc = Document::empty();
        let td = element(&mut doc, "td", "text-align:center");
        backfill_legacy_attributes(&mut doc);
        assert_eq!(doc.tree().attr(td, "align"), Some("center"));
    }

    #[test]
    fn test_valign_not_on_table_or_tr() {
        let mut doc = Document::empty();
        let table = element(&mut doc, "table", "vertical-align:top;text-align:left");
        let tr = element(&mut doc, "tr", "vertical-align:top");
        let td = element(&mut doc, "td", "vertical-align:top");
        backfill_legacy_attributes(&mut doc);
        assert_eq!(doc.tree().attr(table, "valign"), None);
        assert_eq!(doc.tree().attr(table, "align"), Some("left"));
        assert_eq!(doc.tree().attr(tr, "valign"), None);
        assert_eq!(doc.tree().attr(td, "valign"), Some("top"));
    }

    #[test]
    fn test_bgcolor_from_background() {
        let mut doc = Document::empty();
        let p = element(&mut doc, "p", "background-color:#fff");
        backfill_legacy_attributes(&mut doc);
        assert_eq!(doc.tree().attr(p, "bgcolor"), Some("#fff"));
    }

    #[test]
    fn test_existing_attribute_kept_unless_important() {
        let mut doc = Document::empty();
        let td = element(&mut doc, "td", "text-align:center");
        doc.tree_mut().set_attr(td, "align", "left").unwrap();
        let th = element(&mut doc, "td", "text-align:right !important");
        doc.tree_mut().set_attr(th, "align", "left").unwrap();

        backfill_legacy_attributes(&mut doc);
        assert_eq!(doc.tree().attr(td, "align"), Some("left"));
        assert_eq!(doc.tree().attr(th, "align"), Some("right"));
        assert_eq!(doc.tree().attr(th, "style"), Some("text-align:right"));
    }

    #[test]
    fn test_earlier_declaration_written_last() {
        let mut doc = Document::empty();
        let td = element(&mut doc, "td", "background:#000!important;background-color:#fff");
        backfill_legacy_attributes(&mut doc);
        // background-color is written first, then background overrides as important
        assert_eq!(doc.tree().attr(td, "bgcolor"), Some("#000"));
    }

    #[test]
    fn test_strip_important_everywhere() {
        let mut doc = Document::empty();
        let div = element(&mut doc, "div", "color:red !IMPORTANT;margin:0!important");
        strip_important(&mut doc);
        assert_eq!(doc.tree().attr(div, "style"), Some("color:red;margin:0"));
    }
}
