//! inkmail DOM - Document Object Model
//!
//! Arena-allocated DOM tree holding one email document for the duration of a
//! render call. Nodes are addressed by [`NodeId`] and linked through
//! parent/child/sibling ids instead of pointers.

mod attributes;
mod document;
mod node;
mod operations;
mod tree;

pub use attributes::{Attribute, Attributes};
pub use document::Document;
pub use node::{ElementData, Node, NodeData, TextData};
pub use operations::{DomError, DomResult};
pub use tree::{Children, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check whether this id points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
