//! Template tree optimizer
//!
//! Runs once, after every other pass, and rewrites the tree into a form that
//! is cheaper to render:
//!
//! - `FOR`: only build loop metadata (`loop.index`, `loop.last`, ...) for
//!   loops whose body can observe it
//! - `RAW_FILTER`: drop `raw` filters, which are no-ops once escaping is decided
//! - `PRINT`: fold constant-string prints into text and unwrap block/parent
//!   calls that already write their output
//! - `TEXT_NODES`: merge runs of text into a single node
//!
//! Rewrites that happen on the way back up run in that order, so a node that
//! one rule produces is seen by the rules after it.

mod loop_context;
mod simplify;
mod text_merge;

pub use loop_context::LoopContext;

use crate::ast::Node;
use crate::config::{OptimizationFlags, Optimizations};
use crate::environment::Environment;
use crate::errors::CompilationError;
use crate::traverser::{keep_or_replace, traverse};
use crate::visitor::{NodeVisitor, Visit, MAX_PRIORITY};

#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizerNodeVisitor {
    optimizations: Optimizations,
}

impl OptimizerNodeVisitor {
    pub fn new(optimizations: Optimizations) -> Self {
        Self { optimizations }
    }

    /// Build from an integer mask (`-1` for everything)
    pub fn from_mask(mask: i64) -> Result<Self, CompilationError> {
        Ok(Self::new(Optimizations::from_mask(mask)?))
    }

    pub fn optimizations(&self) -> Optimizations {
        self.optimizations
    }

    /// Optimize one tree with fresh loop bookkeeping
    pub fn optimize(&self, tree: Node, env: &Environment) -> Option<Node> {
        let mut loops = LoopContext::new();
        let result = traverse(self, &mut loops, tree, env);
        debug_assert!(loops.is_empty(), "unbalanced loop context after traversal");
        result
    }

    fn enabled(&self, flag: OptimizationFlags) -> bool {
        self.optimizations.is_enabled(flag)
    }
}

impl NodeVisitor for OptimizerNodeVisitor {
    type State = LoopContext;

    fn name(&self) -> &'static str {
        "optimizer"
    }

    fn priority(&self) -> i32 {
        MAX_PRIORITY
    }

    fn enter(&self, mut node: Node, loops: &mut LoopContext, _env: &Environment) -> Node {
        if self.enabled(OptimizationFlags::FOR) {
            loops.enter(&mut node);
        }
        node
    }

    fn leave(&self, mut node: Node, loops: &mut LoopContext, _env: &Environment) -> Visit {
        if self.enabled(OptimizationFlags::FOR) {
            loops.leave(&mut node);
        }

        let mut replaced = false;
        if self.enabled(OptimizationFlags::RAW_FILTER) {
            replaced |= simplify::remove_raw_filter(&mut node);
        }
        if self.enabled(OptimizationFlags::PRINT) {
            replaced |= simplify::simplify_print(&mut node);
        }
        if self.enabled(OptimizationFlags::TEXT_NODES) {
            replaced |= text_merge::merge_text_nodes(&mut node);
        }

        keep_or_replace(node, replaced)
    }
}
