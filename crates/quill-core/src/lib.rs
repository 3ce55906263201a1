pub mod ast;
pub mod config;
pub mod environment;
pub mod errors;
pub mod optimizer;
pub mod span;
pub mod traverser;
pub mod visitor;

pub use ast::{ConstantValue, Node, NodeKind, ReferenceForm};
pub use config::{EnvironmentOptions, OptimizationFlags, Optimizations, QuillConfig};
pub use environment::Environment;
pub use errors::CompilationError;
pub use optimizer::{LoopContext, OptimizerNodeVisitor};
pub use span::{Source, Span};
pub use traverser::{NodeTraverser, TreePass};
pub use visitor::{NodeVisitor, Visit, MAX_PRIORITY};
