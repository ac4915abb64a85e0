//! HTML Serialization
//!
//! Serializes the processed DOM back to an HTML string.
//!
//! - Attribute values are always quoted
//! - Void elements are written self-closed (`<img ... />`), which both HTML
//!   and XHTML mail clients accept
//! - Documents parsed from a fragment drop the implied html/head/body wrappers

use inkmail_dom::{Document, DomTree, NodeData, NodeId};

/// Void elements (self-closing, no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Wrappers html5ever adds around fragment markup
const IMPLIED_WRAPPERS: &[&str] = &["head", "body"];

/// HTML serializer
#[derive(Debug, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a whole document
    pub fn serialize_document(&self, doc: &Document) -> String {
        let tree = doc.tree();
        let mut output = String::new();
        if !doc.is_fragment() {
            self.serialize_children(tree, tree.root(), &mut output);
            return output;
        }

        for (child_id, child) in tree.children(tree.root()) {
            if child_id == doc.document_element() {
                self.serialize_unwrapped(tree, child_id, &mut output);
            } else if !matches!(child.data, NodeData::Doctype { .. }) {
                self.serialize_node(tree, child_id, &mut output);
            }
        }
        output
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output);
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    /// Children of <html>, with <head>/<body> replaced by their contents
    fn serialize_unwrapped(&self, tree: &DomTree, html: NodeId, output: &mut String) {
        for (child_id, _) in tree.children(html) {
            match tree.tag_name(child_id) {
                Some(tag) if IMPLIED_WRAPPERS.contains(&tag) => {
                    self.serialize_children(tree, child_id, output)
                }
                _ => self.serialize_node(tree, child_id, output),
            }
        }
    }

    /// Serialize a node and its descendants
    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                self.serialize_children(tree, node_id, output);
            }
            NodeData::Element(elem) => {
                let tag = elem.name.as_str();

                output.push('<');
                output.push_str(tag);
                for attr in elem.attrs.iter() {
                    output.push(' ');
                    output.push_str(&attr.name);
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }

                if VOID_ELEMENTS.contains(&tag) {
                    output.push_str(" />");
                    return;
                }
                output.push('>');

                if RAW_TEXT_ELEMENTS.contains(&tag) {
                    self.serialize_children_raw(tree, node_id, output);
                } else {
                    self.serialize_children(tree, node_id, output);
                }

                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => {
                escape_text(&text.content, output);
            }
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                if !public_id.is_empty() {
                    output.push_str(" PUBLIC \"");
                    output.push_str(public_id);
                    output.push('"');
                }
                if !system_id.is_empty() {
                    if public_id.is_empty() {
                        output.push_str(" SYSTEM");
                    }
                    output.push_str(" \"");
                    output.push_str(system_id);
                    output.push('"');
                }
                output.push('>');
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output);
        }
    }

    fn serialize_children_raw(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (_child_id, child) in tree.children(parent_id) {
            if let NodeData::Text(text) = &child.data {
                output.push_str(&text.content);
            }
        }
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}
