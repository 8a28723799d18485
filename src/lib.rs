//! nodesel-features: node features for learned node selection.
//!
//! Computes a fixed feature vector for each branched node of a
//! branch-and-bound search and writes vectors, or pairwise differences
//! of them, as sparse `label idx:val` training rows.

pub mod constants;
pub mod logic;

pub use logic::config::ExportConfig;
pub use logic::dataset::{DatasetWriter, SparseExporter};
pub use logic::error::{FeatureError, FeatureResult};
pub use logic::features::{FeatureCalculator, FeatureVector, LayoutInfo, NodeselFeature};
pub use logic::solver::{BoundType, BranchDirection, NodeInfo, NodeType, SearchState, VariableInfo};
