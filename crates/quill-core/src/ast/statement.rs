use super::{Node, NodeKind};
use crate::span::Span;

impl Node {
    /// Container whose slots are numbered `"0"`, `"1"`, ... in order
    pub fn nodes(children: Vec<Node>) -> Self {
        let mut node = Node::new(NodeKind::Nodes, Span::dummy());
        for (i, child) in children.into_iter().enumerate() {
            node.set_child(i.to_string(), child);
        }
        node
    }

    pub fn text(data: impl Into<String>) -> Self {
        Node::new(NodeKind::Text { data: data.into() }, Span::dummy())
    }

    pub fn print(expr: Node) -> Self {
        Node::new(NodeKind::Print, Span::dummy()).with_child("expr", expr)
    }

    /// `{% for key_target, value_target in seq %}body{% endfor %}`
    pub fn loop_over(key_target: &str, value_target: &str, seq: Node, body: Node) -> Self {
        Node::new(NodeKind::Loop { with_loop: true }, Span::dummy())
            .with_child("key_target", Node::assign_name(key_target))
            .with_child("value_target", Node::assign_name(value_target))
            .with_child("seq", seq)
            .with_child("body", body)
    }

    pub fn include(template: Node, only: bool) -> Self {
        Node::new(NodeKind::Include { only }, Span::dummy()).with_child("expr", template)
    }

    pub fn block(name: impl Into<String>, body: Node) -> Self {
        Node::new(NodeKind::Block { name: name.into() }, Span::dummy()).with_child("body", body)
    }

    /// Same node, relocated to `span`
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}
