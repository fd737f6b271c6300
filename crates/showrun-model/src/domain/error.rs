use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown tool kind: {0} (expected: code|api|database|integration)")]
    InvalidToolKind(String),
}
