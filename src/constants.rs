//! Central Configuration Constants
//!
//! Single source of truth for all numeric defaults used by the feature
//! calculator and the sparse exporter.

use std::path::PathBuf;

/// Default search-wide maximum depth normalizer
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// Default number of decimals written per sparse value (same as C `%f`)
pub const DEFAULT_PRECISION: usize = 6;

/// Largest precision accepted by the exporter
pub const MAX_PRECISION: usize = 17;

/// Substituted for a root lower bound of exactly zero
pub const ROOT_BOUND_FALLBACK: f64 = 0.1;

/// Substituted for an empty column when normalizing the objective coefficient
pub const COLUMN_SIZE_FALLBACK: f64 = 0.1;

/// Fraction of the bound gap used as cutoff before any solution is found
pub const CUTOFF_SHRINK: f64 = 0.2;

/// Number of depth buckets the sparse index space is split into
pub const DEPTH_BUCKETS: u32 = 10;

/// App name (used for the default data directory)
pub const APP_NAME: &str = "nodesel";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get max depth from environment or use default
pub fn get_max_depth() -> u32 {
    std::env::var("NODESEL_MAX_DEPTH")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_MAX_DEPTH)
}

/// Get sparse value precision from environment or use default
pub fn get_precision() -> usize {
    std::env::var("NODESEL_PRECISION")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PRECISION)
}

/// Get dataset output directory from environment or use the local data dir
pub fn get_output_dir() -> PathBuf {
    std::env::var("NODESEL_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_output_dir())
}

/// `<data_local_dir>/nodesel/dataset`
pub fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("dataset")
}
