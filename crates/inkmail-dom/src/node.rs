//! Arena nodes
//!
//! Links between nodes are [`NodeId`]s into the owning
//! [`DomTree`](crate::DomTree); [`NodeId::NONE`] marks a missing link.

use crate::{Attributes, NodeId};

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: NodeId,
    pub first_child: NodeId,
    /// Kept so appends do not walk the sibling chain
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    /// Unlinked node holding `data`
    pub fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    pub fn element(name: &str) -> Self {
        Self::new(NodeData::Element(ElementData::new(name)))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeData::Text(TextData {
            content: content.into(),
        }))
    }

    pub fn document() -> Self {
        Self::new(NodeData::Document)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Content of a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// What a node holds
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    Text(TextData),
    /// Outlook conditional comments are kept here verbatim
    Comment(String),
}

/// Tag name and attributes of an element
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased local tag name
    pub name: String,
    /// Attributes in source order
    pub attrs: Attributes,
}

impl ElementData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Attributes::new(),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.set(name, value);
    }

    /// Value of the `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Whitespace separated entries of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs.get("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_name_lowercased() {
        let node = Node::element("TD");
        assert_eq!(node.as_element().map(|e| e.name.as_str()), Some("td"));
    }

    #[test]
    fn test_classes() {
        let mut elem = ElementData::new("p");
        elem.set_attr("class", "  intro   lead ");
        let classes: Vec<_> = elem.classes().collect();
        assert_eq!(classes, vec!["intro", "lead"]);
        assert!(elem.has_class("lead"));
        assert!(!elem.has_class("lea"));
    }
}
