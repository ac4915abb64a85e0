//! Parsed email document
//!
//! Wraps the [`DomTree`] and remembers where the `<html>` and `<body>`
//! elements sit, plus whether the source was a bare fragment.

use crate::{DomTree, NodeId};

/// One email document, owned by a single render call
#[derive(Debug, Clone)]
pub struct Document {
    pub tree: DomTree,
    html: NodeId,
    body: NodeId,
    /// Source markup had no `<html>`/`<head>`/`<body>` of its own
    fragment: bool,
}

impl Document {
    /// Document holding only the root node
    pub fn empty() -> Self {
        Self {
            tree: DomTree::new(),
            html: NodeId::NONE,
            body: NodeId::NONE,
            fragment: false,
        }
    }

    /// Record the `<html>` and `<body>` ids once the tree is built
    pub fn finalize(&mut self) {
        self.html = NodeId::NONE;
        self.body = NodeId::NONE;

        let Some(html) = self
            .tree
            .element_children(self.tree.root())
            .find(|&id| self.tree.tag_name(id) == Some("html"))
        else {
            return;
        };
        self.html = html;

        self.body = self
            .tree
            .element_children(html)
            .find(|&id| self.tree.tag_name(id) == Some("body"))
            .unwrap_or(NodeId::NONE);
    }

    /// Serialization of a fragment leaves out the wrappers the parser implied
    pub fn set_fragment(&mut self, fragment: bool) {
        self.fragment = fragment;
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment
    }

    /// The `<html>` element, or [`NodeId::NONE`]
    pub fn document_element(&self) -> NodeId {
        self.html
    }

    /// The `<body>` element, or [`NodeId::NONE`]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// First element whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .elements()
            .into_iter()
            .find(|&node| self.tree.element(node).and_then(|e| e.id()) == Some(id))
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_finds_structure() {
        let mut doc = Document::empty();
        let tree = doc.tree_mut();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let title = tree.create_element("title");
        let text = tree.create_text("Newsletter");
        let body = tree.create_element("body");
        tree.append_child(NodeId::ROOT, html).unwrap();
        tree.append_child(html, head).unwrap();
        tree.append_child(head, title).unwrap();
        tree.append_child(title, text).unwrap();
        tree.append_child(html, body).unwrap();

        doc.finalize();
        assert_eq!(doc.document_element(), html);
        assert_eq!(doc.body(), body);
        assert_eq!(doc.tree().text_content(title), "Newsletter");
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::empty();
        let div = doc.tree.create_element("div");
        doc.tree.append_child(NodeId::ROOT, div).unwrap();
        doc.tree.set_attr(div, "id", "main").unwrap();
        assert_eq!(doc.get_element_by_id("main"), Some(div));
        assert_eq!(doc.get_element_by_id("other"), None);
    }
}
