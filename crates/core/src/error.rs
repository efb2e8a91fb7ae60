//! Error types for the tokenization and detokenization nodes.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type shared by every bpenode crate.
#[derive(Error, Debug)]
pub enum NodeError {
    /// Missing or out-of-range node parameter
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error loading vocabulary, merges or reverse vocabulary
    #[error("Load error: {0}")]
    Load(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Merge table line that does not hold exactly two symbols
    #[error("Invalid merge rule at line {line}: '{content}'")]
    InvalidMerge { line: usize, content: String },

    /// Tensor shape, precision or layout violation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Subword that has no vocabulary entry
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Token id that has no reverse vocabulary entry
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(i64),

    /// BPE was asked to merge an empty segment
    #[error("Cannot run BPE on an empty token")]
    EmptyToken,

    /// Output buffer could not be reserved
    #[error("Allocation failed: {0}")]
    Allocation(String),
}

impl NodeError {
    /// Status code reported to the host for this error.
    ///
    /// Zero is reserved for success.
    pub fn status_code(&self) -> i32 {
        match self {
            NodeError::Config(_) => 1,
            NodeError::Load(_)
            | NodeError::Io { .. }
            | NodeError::Json(_)
            | NodeError::InvalidMerge { .. } => 2,
            NodeError::Validation(_) => 3,
            NodeError::UnknownToken(_) | NodeError::UnknownTokenId(_) | NodeError::EmptyToken => {
                4
            }
            NodeError::Allocation(_) => 5,
        }
    }
}

impl From<std::collections::TryReserveError> for NodeError {
    fn from(err: std::collections::TryReserveError) -> Self {
        NodeError::Allocation(err.to_string())
    }
}

/// Result type alias for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_non_zero() {
        let errors = [
            NodeError::Config("max_buffer_length".into()),
            NodeError::Load("vocab".into()),
            NodeError::InvalidMerge {
                line: 3,
                content: "a b c".into(),
            },
            NodeError::Validation("rank".into()),
            NodeError::UnknownToken("zz</w>".into()),
            NodeError::UnknownTokenId(-1),
            NodeError::EmptyToken,
            NodeError::Allocation("oom".into()),
        ];

        for err in &errors {
            assert_ne!(err.status_code(), 0, "{err}");
        }
    }

    #[test]
    fn test_try_reserve_maps_to_allocation() {
        let mut buf: Vec<u8> = Vec::new();
        let err: NodeError = buf.try_reserve_exact(usize::MAX).unwrap_err().into();
        assert!(matches!(err, NodeError::Allocation(_)));
        assert_eq!(err.status_code(), 5);
    }
}
