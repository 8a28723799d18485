//! Dataset Module - Node Selection Training Data
//!
//! Serializes computed feature vectors (or pairwise differences) as sparse
//! rows for offline training of a node selection policy.

pub mod sparse;
pub mod writer;


pub use sparse::SparseExporter;
pub use writer::DatasetWriter;
