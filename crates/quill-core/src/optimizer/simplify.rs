use crate::ast::{ConstantValue, Node, NodeKind, ReferenceForm};
use tracing::debug;

const RAW_FILTER: &str = "raw";

/// Replace `expr|raw` by `expr`.
///
/// Escaping has been decided by the time the optimizer runs, so the filter
/// no longer does anything at render time.
pub(crate) fn remove_raw_filter(node: &mut Node) -> bool {
    if !matches!(node.kind, NodeKind::Filter) {
        return false;
    }
    let filter_name = node
        .child("filter")
        .and_then(Node::constant_value)
        .and_then(ConstantValue::as_str);
    if filter_name != Some(RAW_FILTER) {
        return false;
    }

    match node.remove_child("node") {
        Some(operand) => {
            debug!("Removed raw filter at {}", node.span);
            *node = operand;
            true
        }
        None => false,
    }
}

enum PrintRewrite {
    Text(String),
    Hoist,
}

/// Fold `{{ "literal" }}` into text, and drop the print around block and
/// parent calls since those write their own output
pub(crate) fn simplify_print(node: &mut Node) -> bool {
    if !matches!(node.kind, NodeKind::Print) {
        return false;
    }

    let rewrite = match node.child("expr").map(|expr| &expr.kind) {
        Some(NodeKind::Constant {
            value: ConstantValue::String(data),
        }) => PrintRewrite::Text(data.clone()),
        Some(NodeKind::BlockReference {
            form: ReferenceForm::Expression,
            ..
        })
        | Some(NodeKind::ParentCall { .. }) => PrintRewrite::Hoist,
        _ => return false,
    };

    match rewrite {
        PrintRewrite::Text(data) => {
            debug!("Folded constant print at {} into text", node.span);
            let mut text = Node::new(NodeKind::Text { data }, node.span);
            text.source = node.source.take();
            *node = text;
            true
        }
        PrintRewrite::Hoist => {
            let Some(mut expr) = node.remove_child("expr") else {
                return false;
            };
            if let NodeKind::BlockReference { output, .. } | NodeKind::ParentCall { output, .. } =
                &mut expr.kind
            {
                *output = true;
            }
            debug!("Hoisted {} out of print at {}", expr.kind, node.span);
            *node = expr;
            true
        }
    }
}
