use crate::ast::{Node, NodeKind};
use tracing::debug;

/// Merge a node's children into one text node when they are all text.
///
/// A bare `Nodes` container is replaced by the merged text (returns `true`).
/// Any other node keeps its kind: the first text slot receives the merged
/// text and the remaining text slots are removed.
pub(crate) fn merge_text_nodes(node: &mut Node) -> bool {
    let mut merged = String::new();
    for (_, child) in node.children() {
        match child.text_data() {
            Some(data) => merged.push_str(data),
            None => return false,
        }
    }
    // Also covers childless nodes
    if merged.is_empty() {
        return false;
    }

    let Some((first_slot, first)) = node.children().next() else {
        return false;
    };
    let mut text = Node::new(NodeKind::Text { data: merged }, first.span);
    text.source = first.source.clone();
    let first_slot = first_slot.to_string();

    if matches!(node.kind, NodeKind::Nodes) {
        debug!(
            "Merged {} text node(s) at {}",
            node.child_count(),
            text.span
        );
        *node = text;
        return true;
    }

    if node.child_count() == 1 {
        return false;
    }

    let merged_slots: Vec<String> = node
        .children()
        .filter(|(_, child)| child.is_text())
        .map(|(slot, _)| slot.to_string())
        .collect();
    debug!(
        "Collapsed {} text slot(s) of {} into '{}'",
        merged_slots.len(),
        node.kind,
        first_slot
    );
    for slot in merged_slots.iter().filter(|slot| **slot != first_slot) {
        node.remove_child(slot);
    }
    node.set_child(first_slot, text);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Source, Span};
    use std::sync::Arc;

    #[test]
    fn test_container_replaced_by_merged_text() {
        let source = Arc::new(Source::new("page.html"));
        let mut node = Node::nodes(vec![
            Node::text("Hello, ").at(Span::at_line(3)).with_source(source.clone()),
            Node::text("world").at(Span::at_line(4)),
        ]);

        assert!(merge_text_nodes(&mut node));
        assert_eq!(node.text_data(), Some("Hello, world"));
        assert_eq!(node.span.line, 3);
        assert_eq!(node.source, Some(source));
    }

    #[test]
    fn test_mixed_children_untouched() {
        let original = Node::nodes(vec![Node::text("a"), Node::print(Node::name("x"))]);
        let mut node = original.clone();
        assert!(!merge_text_nodes(&mut node));
        assert_eq!(node, original);
    }

    #[test]
    fn test_all_empty_text_untouched() {
        let original = Node::nodes(vec![Node::text(""), Node::text("")]);
        let mut node = original.clone();
        assert!(!merge_text_nodes(&mut node));
        assert_eq!(node, original);
    }

    #[test]
    fn test_childless_node_untouched() {
        let mut node = Node::nodes(vec![]);
        assert!(!merge_text_nodes(&mut node));
        assert_eq!(node.child_count(), 0);
    }

    #[test]
    fn test_semantic_node_collapsed_in_place() {
        let mut node = Node::new(
            NodeKind::Block {
                name: "content".into(),
            },
            Span::dummy(),
        )
        .with_child("head", Node::text("<h1>"))
        .with_child("tail", Node::text("</h1>"));

        assert!(!merge_text_nodes(&mut node));
        assert!(matches!(&node.kind, NodeKind::Block { name } if name == "content"));
        assert_eq!(node.child_count(), 1);
        assert_eq!(node.child("head").and_then(Node::text_data), Some("<h1></h1>"));
        assert!(!node.has_child("tail"));
    }

    #[test]
    fn test_single_text_child_of_semantic_node_is_stable() {
        let original = Node::block("content", Node::text("body"));
        let mut node = original.clone();
        assert!(!merge_text_nodes(&mut node));
        assert_eq!(node, original);
    }
}
