//! Loop metadata elision
//!
//! Every loop starts with its metadata disabled. While walking a loop body we
//! look for anything that could observe the metadata and switch it back on,
//! either for the innermost loop or for every loop that encloses the use.

use crate::ast::{ConstantValue, Node, NodeKind, LOOP_VARIABLE};
use tracing::trace;

const INCLUDE_FUNCTION: &str = "include";
const PARENT_ATTRIBUTE: &str = "parent";

#[derive(Debug, Default)]
struct LoopFrame {
    with_loop: bool,
}

/// What a node inside a loop body means for the enclosing loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopUsage {
    /// A read of the loop metadata variable itself
    LoopVariable,
    /// A read of a key/value target of an open loop
    LoopTarget,
    /// May read the innermost loop's metadata
    Innermost,
    /// May read the metadata of any enclosing loop
    AllLoops,
    Unrelated,
}

/// Loops open at the current point of one traversal, innermost last
#[derive(Debug, Default)]
pub struct LoopContext {
    loops: Vec<LoopFrame>,
    /// Value target then key target for each open loop
    targets: Vec<String>,
}

impl LoopContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty() && self.targets.is_empty()
    }

    pub(crate) fn enter(&mut self, node: &mut Node) {
        if let NodeKind::Loop { with_loop } = &mut node.kind {
            *with_loop = false;
            let value_target = target_name(node, "value_target");
            let key_target = target_name(node, "key_target");
            trace!(
                "Open loop #{} over ({}, {}) at {}",
                self.loops.len() + 1,
                key_target,
                value_target,
                node.span
            );
            self.loops.push(LoopFrame::default());
            self.targets.push(value_target);
            self.targets.push(key_target);
            return;
        }

        if self.loops.is_empty() {
            return;
        }

        match self.classify(node) {
            LoopUsage::LoopVariable => {
                mark_always_defined(node);
                self.enable_innermost();
            }
            LoopUsage::LoopTarget => mark_always_defined(node),
            LoopUsage::Innermost => self.enable_innermost(),
            LoopUsage::AllLoops => self.enable_all(),
            LoopUsage::Unrelated => {}
        }
    }

    pub(crate) fn leave(&mut self, node: &mut Node) {
        let NodeKind::Loop { with_loop } = &mut node.kind else {
            return;
        };
        let frame = self.loops.pop();
        debug_assert!(frame.is_some(), "loop left without being entered");
        self.targets.truncate(self.targets.len().saturating_sub(2));

        *with_loop = frame.is_some_and(|frame| frame.with_loop);
        trace!(
            "Close loop at {} (with_loop: {})",
            node.span,
            *with_loop
        );
    }

    fn classify(&self, node: &Node) -> LoopUsage {
        match &node.kind {
            NodeKind::Name { name, .. } if name == LOOP_VARIABLE => LoopUsage::LoopVariable,
            NodeKind::Name { name, .. } if self.is_target(name) => LoopUsage::LoopTarget,
            NodeKind::BlockReference { .. } => LoopUsage::Innermost,
            NodeKind::Include { only: false } => LoopUsage::AllLoops,
            NodeKind::FunctionCall { name }
                if name == INCLUDE_FUNCTION && include_inherits_context(node) =>
            {
                LoopUsage::AllLoops
            }
            NodeKind::AttributeAccess if self.reaches_enclosing_metadata(node) => {
                LoopUsage::AllLoops
            }
            NodeKind::Nodes
            | NodeKind::Text { .. }
            | NodeKind::Print
            | NodeKind::Constant { .. }
            | NodeKind::Filter
            | NodeKind::Loop { .. }
            | NodeKind::Name { .. }
            | NodeKind::AssignName { .. }
            | NodeKind::AttributeAccess
            | NodeKind::Include { .. }
            | NodeKind::FunctionCall { .. }
            | NodeKind::ParentCall { .. }
            | NodeKind::Block { .. }
            | NodeKind::Binary { .. } => LoopUsage::Unrelated,
        }
    }

    fn is_target(&self, name: &str) -> bool {
        self.targets.iter().any(|target| target == name)
    }

    /// `x[dynamic]` or `x.parent`, where `x` is loop metadata or the
    /// innermost loop already exposes it
    fn reaches_enclosing_metadata(&self, access: &Node) -> bool {
        let dynamic_or_parent = match access.child("attribute").map(|attr| &attr.kind) {
            Some(NodeKind::Constant { value }) => value.as_str() == Some(PARENT_ATTRIBUTE),
            _ => true,
        };
        if !dynamic_or_parent {
            return false;
        }

        self.innermost_enabled()
            || access
                .child("node")
                .is_some_and(|base| base.is_name(LOOP_VARIABLE))
    }

    fn innermost_enabled(&self) -> bool {
        self.loops.last().is_some_and(|frame| frame.with_loop)
    }

    fn enable_innermost(&mut self) {
        if let Some(frame) = self.loops.last_mut() {
            frame.with_loop = true;
        }
    }

    fn enable_all(&mut self) {
        for frame in &mut self.loops {
            frame.with_loop = true;
        }
    }
}

fn target_name(loop_node: &Node, slot: &str) -> String {
    let name = loop_node.child(slot).and_then(|target| match &target.kind {
        NodeKind::AssignName { name } | NodeKind::Name { name, .. } => Some(name.clone()),
        _ => None,
    });
    debug_assert!(name.is_some(), "loop without a `{}` target", slot);
    name.unwrap_or_default()
}

/// `include()` shares the caller's variables unless `with_context` is literally false
fn include_inherits_context(call: &Node) -> bool {
    let with_context = call
        .child("arguments")
        .and_then(|args| args.child("with_context"))
        .and_then(Node::constant_value);
    !matches!(with_context, Some(ConstantValue::Bool(false)))
}

fn mark_always_defined(node: &mut Node) {
    if let NodeKind::Name { always_defined, .. } = &mut node.kind {
        *always_defined = true;
    }
}
