//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Arena-based DOM tree. Node 0 is always the document node.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::new(NodeData::Comment(text.to_string())))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(Node::new(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    /// Append a detached node as last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if parent == child || child == NodeId::ROOT {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let last = self.get(parent).ok_or(DomError::NotFound(parent))?.last_child;
        {
            let node = self.get_mut(child).ok_or(DomError::NotFound(child))?;
            if node.parent.is_valid() {
                return Err(DomError::HierarchyRequest { parent, child });
            }
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            if let Some(prev) = self.get_mut(last) {
                prev.next_sibling = child;
            }
        }
        if let Some(p) = self.get_mut(parent) {
            if !p.first_child.is_valid() {
                p.first_child = child;
            }
            p.last_child = child;
        }
        Ok(child)
    }

    /// Iterate over direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Direct element children of a node
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Closest preceding sibling that is an element
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.prev_sibling;
        while current.is_valid() {
            let node = self.get(current)?;
            if node.is_element() {
                return Some(current);
            }
            current = node.prev_sibling;
        }
        None
    }

    /// Closest following sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.next_sibling;
        while current.is_valid() {
            let node = self.get(current)?;
            if node.is_element() {
                return Some(current);
            }
            current = node.next_sibling;
        }
        None
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let start = stack.len();
            stack.extend(self.children(current).map(|(c, _)| c));
            stack[start..].reverse();
        }
        out
    }

    /// Every element of the document in document order
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(Node::is_element))
            .collect()
    }

    /// Every element whose tag name is one of `tags`, in document order
    pub fn elements_by_tag(&self, tags: &[&str]) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.tag_name(id).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data of a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Attribute value of an element node
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    /// Set an attribute on an element node
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> DomResult<()> {
        let elem = self.element_mut(id).ok_or(DomError::NotAnElement(id))?;
        elem.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute from an element node, returning its value
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id)
            .and_then(|e| e.attrs.remove(name))
            .map(|a| a.value)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let Some(t) = self.get(id).and_then(Node::as_text) {
            text.push_str(t);
        }
        for child in self.descendants(id) {
            if let Some(t) = self.get(child).and_then(Node::as_text) {
                text.push_str(t);
            }
        }
        text
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of one node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let table = tree.create_element("table");
        let tr = tree.create_element("tr");
        let td = tree.create_element("td");
        let text = tree.create_text("cell");
        tree.append_child(tree.root(), table).unwrap();
        tree.append_child(table, tr).unwrap();
        tree.append_child(tr, td).unwrap();
        tree.append_child(td, text).unwrap();
        (tree, table, tr, td)
    }

    #[test]
    fn test_descendants_document_order() {
        let (tree, table, tr, td) = sample();
        let desc = tree.descendants(tree.root());
        assert_eq!(&desc[..3], &[table, tr, td]);
        assert_eq!(desc.len(), 4);
    }

    #[test]
    fn test_append_twice_is_rejected() {
        let (mut tree, table, _, td) = sample();
        assert!(matches!(
            tree.append_child(table, td),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_element_siblings() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        tree.append_child(tree.root(), ul).unwrap();
        let a = tree.create_element("li");
        let gap = tree.create_text(" ");
        let b = tree.create_element("li");
        tree.append_child(ul, a).unwrap();
        tree.append_child(ul, gap).unwrap();
        tree.append_child(ul, b).unwrap();

        assert_eq!(tree.next_element_sibling(a), Some(b));
        assert_eq!(tree.prev_element_sibling(b), Some(a));
        assert_eq!(tree.prev_element_sibling(a), None);
        assert_eq!(tree.element_children(ul).count(), 2);
    }

    #[test]
    fn test_text_content_and_attrs() {
        let (mut tree, _, _, td) = sample();
        assert_eq!(tree.text_content(td), "cell");
        tree.set_attr(td, "valign", "top").unwrap();
        assert_eq!(tree.attr(td, "VALIGN"), Some("top"));
        assert_eq!(tree.remove_attr(td, "valign").as_deref(), Some("top"));
        assert!(tree.set_attr(NodeId::ROOT, "x", "y").is_err());
    }
}
