//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM.

use std::sync::LazyLock;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use inkmail_dom::{Document, DomTree, NodeId};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use regex::Regex;

use crate::HtmlError;

/// Markup that carries its own document structure
static DOCUMENT_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:!doctype|html|head|body)[\s>/]").expect("static regex")
});

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document.
    ///
    /// Never fails: unreadable input yields an empty document so the email can
    /// still be composed.
    pub fn parse(&self, html: &str) -> Document {
        match self.try_parse(html) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("HTML parsing failed, continuing with empty document: {}", e);
                let mut doc = Document::empty();
                doc.set_fragment(true);
                doc
            }
        }
    }

    /// Parse HTML string into a Document, reporting reader failures
    pub fn try_parse(&self, html: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document ({} bytes)", html.len());

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty();
        self.convert_node(&dom.document, document.tree_mut(), NodeId::ROOT)?;
        document.finalize();
        document.set_fragment(!DOCUMENT_MARKUP.is_match(html));

        tracing::debug!(
            "Parsed {} nodes (fragment: {})",
            document.tree().len(),
            document.is_fragment()
        );
        Ok(document)
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), HtmlError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                let id = tree.create_doctype(name, public_id, system_id);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let id = tree.create_text(&contents.borrow());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                if let Some(elem) = tree.element_mut(id) {
                    for attr in attrs.borrow().iter() {
                        elem.set_attr(&attr.name.local, attr.value.to_string());
                    }
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {
                // Not meaningful in HTML email bodies
            }
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html);

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert!(!doc.is_fragment());
        let title = doc.tree().elements_by_tag(&["title"])[0];
        assert_eq!(doc.tree().text_content(title), "Test");
    }

    #[test]
    fn test_parse_fragment() {
        let html = "<div><span>Text</span></div>";
        let doc = HtmlParser::new().parse(html);

        // Fragments still get wrapped in html/head/body by html5ever
        assert!(doc.is_fragment());
        assert!(doc.body().is_valid());
        assert_eq!(doc.tree().elements_by_tag(&["span"]).len(), 1);
    }

    #[test]
    fn test_attributes_preserved_in_order() {
        let doc = HtmlParser::new().parse(r#"<a href="/x" class="btn" target="_self">go</a>"#);
        let a = doc.tree().elements_by_tag(&["a"])[0];
        let names: Vec<_> = doc
            .tree()
            .element(a)
            .unwrap()
            .attrs
            .iter()
            .map(|attr| attr.name.clone())
            .collect();
        assert_eq!(names, vec!["href", "class", "target"]);
    }

    #[test]
    fn test_header_tag_is_not_document_markup() {
        let doc = HtmlParser::new().parse("<header>Top</header>");
        assert!(doc.is_fragment());
    }
}
