//! DOM Node Operations - error types

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),

    #[error("Hierarchy request error: cannot append {child:?} to {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),
}
