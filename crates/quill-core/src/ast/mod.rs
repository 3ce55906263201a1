pub mod expression;
pub mod statement;

pub use expression::{ConstantValue, ReferenceForm};

use crate::span::{Source, Span};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Name bound to the per-iteration loop metadata inside a loop body
pub const LOOP_VARIABLE: &str = "loop";

/// Loops as handed over by the parser build their metadata
fn loop_metadata_by_default() -> bool {
    true
}

/// Every kind of node a template tree can hold.
///
/// Attributes live on the variant; child nodes live in the owning [`Node`]'s
/// slot map so traversal can treat every kind uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Plain sequence of children without meaning of its own
    Nodes,
    Text {
        data: String,
    },
    /// Slots: `expr`
    Print,
    Constant {
        value: ConstantValue,
    },
    /// Slots: `node`, `filter`, `arguments`
    Filter,
    /// Slots: `key_target`, `value_target`, `seq`, `body`, optional `else`
    Loop {
        #[serde(default = "loop_metadata_by_default")]
        with_loop: bool,
    },
    Name {
        name: String,
        #[serde(default)]
        always_defined: bool,
    },
    AssignName {
        name: String,
    },
    /// Slots: `node`, `attribute`, optional `arguments`
    AttributeAccess,
    /// Slots: `expr`, optional `variables`
    Include {
        #[serde(default)]
        only: bool,
    },
    /// Slots: `arguments`, keyed by argument name
    FunctionCall {
        name: String,
    },
    BlockReference {
        name: String,
        form: ReferenceForm,
        #[serde(default)]
        output: bool,
    },
    ParentCall {
        name: String,
        #[serde(default)]
        output: bool,
    },
    /// Slots: `body`
    Block {
        name: String,
    },
    /// Slots: `left`, `right`
    Binary {
        operator: String,
    },
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Nodes => write!(f, "Nodes"),
            NodeKind::Text { data } => write!(f, "Text({:?})", data),
            NodeKind::Print => write!(f, "Print"),
            NodeKind::Constant { value } => write!(f, "Constant({})", value),
            NodeKind::Filter => write!(f, "Filter"),
            NodeKind::Loop { with_loop } => write!(f, "Loop(with_loop: {})", with_loop),
            NodeKind::Name {
                name,
                always_defined,
            } => write!(f, "Name({:?}, always_defined: {})", name, always_defined),
            NodeKind::AssignName { name } => write!(f, "AssignName({:?})", name),
            NodeKind::AttributeAccess => write!(f, "AttributeAccess"),
            NodeKind::Include { only } => write!(f, "Include(only: {})", only),
            NodeKind::FunctionCall { name } => write!(f, "FunctionCall({:?})", name),
            NodeKind::BlockReference { name, form, output } => write!(
                f,
                "BlockReference({:?}, {}, output: {})",
                name, form, output
            ),
            NodeKind::ParentCall { name, output } => {
                write!(f, "ParentCall({:?}, output: {})", name, output)
            }
            NodeKind::Block { name } => write!(f, "Block({:?})", name),
            NodeKind::Binary { operator } => write!(f, "Binary({:?})", operator),
        }
    }
}

/// A template tree node: kind plus ordered, named child slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    children: IndexMap<String, Node>,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Arc<Source>>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node {
            kind,
            children: IndexMap::new(),
            span,
            source: None,
        }
    }

    pub fn with_child(mut self, slot: impl Into<String>, child: Node) -> Self {
        self.set_child(slot, child);
        self
    }

    pub fn with_source(mut self, source: Arc<Source>) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach `source` to this node and every descendant
    pub fn with_source_recursive(mut self, source: &Arc<Source>) -> Self {
        self.assign_source(source);
        self
    }

    fn assign_source(&mut self, source: &Arc<Source>) {
        self.source = Some(Arc::clone(source));
        for child in self.children.values_mut() {
            child.assign_source(source);
        }
    }

    pub fn child(&self, slot: &str) -> Option<&Node> {
        self.children.get(slot)
    }

    pub fn has_child(&self, slot: &str) -> bool {
        self.children.contains_key(slot)
    }

    /// Set a slot. Replacing an existing slot keeps its position.
    pub fn set_child(&mut self, slot: impl Into<String>, child: Node) -> Option<Node> {
        self.children.insert(slot.into(), child)
    }

    /// Remove a slot, keeping the order of the remaining siblings
    pub fn remove_child(&mut self, slot: &str) -> Option<Node> {
        self.children.shift_remove(slot)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(slot, node)| (slot.as_str(), node))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn take_children(&mut self) -> IndexMap<String, Node> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn restore_children(&mut self, children: IndexMap<String, Node>) {
        self.children = children;
    }

    pub fn text_data(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { data } => Some(data),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// True for a `Name` node referencing `name`
    pub fn is_name(&self, name: &str) -> bool {
        matches!(&self.kind, NodeKind::Name { name: n, .. } if n == name)
    }

    pub fn constant_value(&self) -> Option<&ConstantValue> {
        match &self.kind {
            NodeKind::Constant { value } => Some(value),
            _ => None,
        }
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(Node::node_count).sum::<usize>()
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize, slot: Option<&str>) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        if let Some(slot) = slot {
            write!(f, "{}: ", slot)?;
        }
        write!(f, "{}", self.kind)?;
        for (child_slot, child) in &self.children {
            writeln!(f)?;
            child.fmt_tree(f, depth + 1, Some(child_slot))?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0, None)
    }
}
