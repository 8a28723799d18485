//! Error type shared by the feature, snapshot and dataset modules.

use std::io;
use std::path::PathBuf;

/// Errors raised while computing or exporting node features
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Two vectors that must share a layout have different sizes
    #[error("feature vector size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Vector was never computed (depth 0)
    #[error("feature vector has not been computed (depth 0)")]
    Uncomputed,

    /// Max depth normalizer not set
    #[error("max depth normalizer is not set")]
    MaxDepthUnset,

    /// Max depth too small to split into depth buckets
    #[error("max depth {max_depth} is below the {buckets} depth buckets")]
    MaxDepthTooSmall { max_depth: u32, buckets: u32 },

    /// Features are only defined below the root
    #[error("cannot compute features for the root node")]
    RootNode,

    /// Node carries no branching bound change
    #[error("node has no branching bound change recorded")]
    MissingBranchingChange,

    /// Vector cannot hold every feature slot
    #[error("feature vector of size {size} cannot hold {required} feature slots")]
    LayoutTooSmall { size: usize, required: usize },

    /// Feature layout version or hash differs from the compiled one
    #[error("feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})")]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    /// An earlier write failed, the file may end in a partial line
    #[error("dataset writer for {path:?} is poisoned by an earlier write failure")]
    WriterPoisoned { path: PathBuf },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed sample line
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for this crate
pub type FeatureResult<T> = Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FeatureError::SizeMismatch { expected: 13, actual: 11 };
        assert_eq!(err.to_string(), "feature vector size mismatch: expected 13, got 11");

        let err = FeatureError::MaxDepthTooSmall { max_depth: 5, buckets: 10 };
        assert!(err.to_string().contains("max depth 5"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: FeatureError = io_err.into();
        assert!(matches!(err, FeatureError::Io(_)));
    }
}
