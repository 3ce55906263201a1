use crate::ast::Node;
use crate::config::{EnvironmentOptions, Optimizations};
use crate::errors::CompilationError;
use crate::optimizer::OptimizerNodeVisitor;
use crate::traverser::{NodeTraverser, TreePass};
use std::sync::Arc;
use tracing::info;

/// Shared compilation settings and the passes registered against them.
///
/// An environment holds no per-tree state; trees can be optimized from
/// several threads at once.
pub struct Environment {
    optimizations: Optimizations,
    /// Registered last so that it runs after every pass sharing its priority
    optimizer: Option<Arc<dyn TreePass>>,
    passes: Vec<Arc<dyn TreePass>>,
}

impl Environment {
    /// Create an environment, rejecting invalid optimization settings up front
    pub fn new(options: EnvironmentOptions) -> Result<Self, CompilationError> {
        let optimizations = options.optimizations()?;
        let optimizer: Option<Arc<dyn TreePass>> = if optimizations.is_none() {
            None
        } else {
            Some(Arc::new(OptimizerNodeVisitor::new(optimizations)))
        };

        Ok(Self {
            optimizations,
            optimizer,
            passes: Vec::new(),
        })
    }

    pub fn optimizations(&self) -> Optimizations {
        self.optimizations
    }

    /// Register an additional pass (an escaper, a sandbox check, ...)
    pub fn add_node_visitor(&mut self, pass: Arc<dyn TreePass>) {
        self.passes.push(pass);
    }

    pub fn node_traverser(&self) -> NodeTraverser<'_> {
        let passes = self.passes.iter().chain(&self.optimizer).cloned().collect();
        NodeTraverser::new(self, passes)
    }

    /// Run every registered pass over `tree`, lowest priority first
    pub fn optimize(&self, tree: Node) -> Option<Node> {
        let traverser = self.node_traverser();
        info!(
            "Running {} pass(es) over {} node(s) (optimizations: {})",
            traverser.pass_names().len(),
            tree.node_count(),
            self.optimizations
        );
        traverser.traverse(tree)
    }
}
