//! Visitor contract for passes over a template tree
//!
//! A visitor is called on the way down (`enter`) and on the way back up
//! (`leave`) for every node. Per-traversal bookkeeping lives in
//! [`NodeVisitor::State`], which the driver creates fresh for each tree, so a
//! single visitor can serve many traversals at once.

use crate::ast::Node;
use crate::environment::Environment;

/// Highest priority a pass can have; larger values are treated as this one.
/// Passes run in ascending priority order, so a pass at this priority sees
/// the tree after every other pass.
pub const MAX_PRIORITY: i32 = 255;

/// What `leave` wants done with the node it was handed
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Keep the node in its slot (it may have been modified)
    Keep(Node),
    /// Put a different node in the slot
    Replace(Node),
    /// Drop the slot from the parent
    Remove,
}

impl Visit {
    pub fn into_node(self) -> Option<Node> {
        match self {
            Visit::Keep(node) | Visit::Replace(node) => Some(node),
            Visit::Remove => None,
        }
    }
}

pub trait NodeVisitor: Send + Sync {
    /// Bookkeeping for one traversal of one tree
    type State: Default;

    fn name(&self) -> &'static str;

    /// Ordering among registered passes, lowest first
    fn priority(&self) -> i32 {
        0
    }

    /// Called before the node's children are visited
    fn enter(&self, node: Node, state: &mut Self::State, env: &Environment) -> Node;

    /// Called after every child has been visited and its outcome applied
    fn leave(&self, node: Node, state: &mut Self::State, env: &Environment) -> Visit;
}
