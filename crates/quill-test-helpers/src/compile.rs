//! Helpers for running the optimizer in tests

use quill_core::ast::{Node, NodeKind};
use quill_core::config::{EnvironmentOptions, OptimizationFlags, Optimizations};
use quill_core::Environment;

/// Build an environment with the given optimizations
pub fn environment(optimizations: impl Into<Optimizations>) -> Environment {
    Environment::new(EnvironmentOptions::with_optimizations(optimizations.into()))
        .expect("valid optimizations")
}

/// Run every pass of a fresh environment over `tree`
///
/// # Panics
/// If the root node was removed
pub fn optimize_with(optimizations: impl Into<Optimizations>, tree: Node) -> Node {
    environment(optimizations)
        .optimize(tree)
        .expect("root node removed")
}

pub fn optimize_all(tree: Node) -> Node {
    optimize_with(Optimizations::All, tree)
}

pub fn optimize_loops(tree: Node) -> Node {
    optimize_with(OptimizationFlags::FOR, tree)
}

/// Follow a path of slot names from `node`
///
/// # Panics
/// If any slot along the path is missing
pub fn at<'a>(node: &'a Node, path: &[&str]) -> &'a Node {
    path.iter().fold(node, |current, slot| {
        current
            .child(slot)
            .unwrap_or_else(|| panic!("missing slot '{}' in:\n{}", slot, current))
    })
}

/// The `with_loop` attribute of a loop node
///
/// # Panics
/// If `node` is not a loop
pub fn with_loop(node: &Node) -> bool {
    match node.kind {
        NodeKind::Loop { with_loop } => with_loop,
        ref other => panic!("expected a loop, found {}", other),
    }
}

/// The `always_defined` attribute of a name node
///
/// # Panics
/// If `node` is not a name
pub fn always_defined(node: &Node) -> bool {
    match node.kind {
        NodeKind::Name { always_defined, .. } => always_defined,
        ref other => panic!("expected a name, found {}", other),
    }
}
