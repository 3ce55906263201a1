//! Mock passes for testing pass ordering

use quill_core::ast::{Node, NodeKind};
use quill_core::{Environment, NodeVisitor, Visit};

/// Stand-in for an escaping pass: marks every printed expression safe by
/// wrapping it in a `raw` filter
#[derive(Debug, Default)]
pub struct MockEscaperPass;

impl NodeVisitor for MockEscaperPass {
    type State = ();

    fn name(&self) -> &'static str {
        "mock-escaper"
    }

    fn enter(&self, node: Node, _state: &mut (), _env: &Environment) -> Node {
        node
    }

    fn leave(&self, mut node: Node, _state: &mut (), _env: &Environment) -> Visit {
        if !matches!(node.kind, NodeKind::Print) {
            return Visit::Keep(node);
        }
        match node.remove_child("expr") {
            Some(expr) => {
                node.set_child("expr", Node::filter(expr, "raw", vec![]));
                Visit::Keep(node)
            }
            None => Visit::Keep(node),
        }
    }
}
