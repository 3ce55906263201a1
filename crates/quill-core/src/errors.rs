use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilationError {
    #[error("Optimizer mode \"{0}\" is not valid.")]
    InvalidOptimizations(i64),

    #[error("Unknown optimization \"{0}\" (expected one of: print, for, raw_filter, text_nodes)")]
    UnknownOptimization(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CompilationError>;
