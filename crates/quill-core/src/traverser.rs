use crate::ast::Node;
use crate::environment::Environment;
use crate::visitor::{NodeVisitor, Visit, MAX_PRIORITY};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Object-safe view of a visitor, so passes with different state types can
/// be registered side by side
pub trait TreePass: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32;

    /// Run the pass over a whole tree. `None` means the root was removed.
    fn run(&self, node: Node, env: &Environment) -> Option<Node>;
}

impl<V: NodeVisitor> TreePass for V {
    fn name(&self) -> &'static str {
        NodeVisitor::name(self)
    }

    fn priority(&self) -> i32 {
        NodeVisitor::priority(self)
    }

    fn run(&self, node: Node, env: &Environment) -> Option<Node> {
        let mut state = V::State::default();
        traverse(self, &mut state, node, env)
    }
}

/// Depth-first walk applying `visitor` to `node` and its descendants
pub fn traverse<V: NodeVisitor + ?Sized>(
    visitor: &V,
    state: &mut V::State,
    node: Node,
    env: &Environment,
) -> Option<Node> {
    let mut node = visitor.enter(node, state, env);

    let children = node.take_children();
    let mut kept = IndexMap::with_capacity(children.len());
    for (slot, child) in children {
        if let Some(child) = traverse(visitor, state, child, env) {
            kept.insert(slot, child);
        }
    }
    node.restore_children(kept);

    visitor.leave(node, state, env).into_node()
}

/// Runs registered passes over a tree, one full traversal per pass
pub struct NodeTraverser<'env> {
    env: &'env Environment,
    passes: Vec<Arc<dyn TreePass>>,
}

impl<'env> NodeTraverser<'env> {
    pub fn new(env: &'env Environment, passes: Vec<Arc<dyn TreePass>>) -> Self {
        let mut traverser = Self {
            env,
            passes: Vec::with_capacity(passes.len()),
        };
        for pass in passes {
            traverser.add_pass(pass);
        }
        traverser
    }

    /// Register a pass. Equal priorities keep registration order, and
    /// priorities above [`MAX_PRIORITY`] count as `MAX_PRIORITY`.
    pub fn add_pass(&mut self, pass: Arc<dyn TreePass>) {
        let priority = effective_priority(pass.as_ref());
        let position = self
            .passes
            .partition_point(|existing| effective_priority(existing.as_ref()) <= priority);
        self.passes.insert(position, pass);
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn traverse(&self, node: Node) -> Option<Node> {
        let mut current = node;
        for pass in &self.passes {
            match pass.run(current, self.env) {
                Some(node) => current = node,
                None => {
                    debug!("Pass '{}' removed the root node", pass.name());
                    return None;
                }
            }
        }
        Some(current)
    }
}

fn effective_priority(pass: &dyn TreePass) -> i32 {
    pass.priority().min(MAX_PRIORITY)
}

/// Outcome of `leave` when a rewrite may or may not have happened
pub(crate) fn keep_or_replace(node: Node, replaced: bool) -> Visit {
    if replaced {
        Visit::Replace(node)
    } else {
        Visit::Keep(node)
    }
}
