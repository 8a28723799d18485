//! Feature Layout - Node Selection Feature Schema
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Training files written with one layout cannot be mixed with another,
//! the sidecar manifest carries version and hash for that check.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::error::FeatureError;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE SLOTS
// ============================================================================

/// Named feature slots, discriminant == position in the vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeselFeature {
    LowerBoundRatio = 0,
    EstimateRatio = 1,
    RelativeBound = 2,
    TypeSibling = 3,
    TypeChild = 4,
    TypeLeaf = 5,
    BranchVarObjRatio = 6,
    BranchVarBoundLpDiff = 7,
    BranchVarRootLpDiff = 8,
    BranchPrioDown = 9,
    BranchPrioUp = 10,
    BranchVarPseudocost = 11,
    BranchVarAvgInference = 12,
}

impl NodeselFeature {
    pub const ALL: [NodeselFeature; FEATURE_COUNT] = [
        NodeselFeature::LowerBoundRatio,
        NodeselFeature::EstimateRatio,
        NodeselFeature::RelativeBound,
        NodeselFeature::TypeSibling,
        NodeselFeature::TypeChild,
        NodeselFeature::TypeLeaf,
        NodeselFeature::BranchVarObjRatio,
        NodeselFeature::BranchVarBoundLpDiff,
        NodeselFeature::BranchVarRootLpDiff,
        NodeselFeature::BranchPrioDown,
        NodeselFeature::BranchPrioUp,
        NodeselFeature::BranchVarPseudocost,
        NodeselFeature::BranchVarAvgInference,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        FEATURE_LAYOUT[self.index()]
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Bounds (0-2) ===
    "lower_bound_ratio",         // 0: node lower bound / root lower bound
    "estimate_ratio",            // 1: node estimate / root lower bound
    "relative_bound",            // 2: position of node bound inside the global gap

    // === Node type (3-5) ===
    "type_sibling",              // 3
    "type_child",                // 4
    "type_leaf",                 // 5

    // === Branching variable (6-12) ===
    "branch_var_obj_ratio",      // 6: objective coefficient / column nonzeros
    "branch_var_bound_lp_diff",  // 7: new bound - LP value
    "branch_var_root_lp_diff",   // 8: root LP value - LP value
    "branch_prio_down",          // 9
    "branch_prio_up",            // 10
    "branch_var_pseudocost",     // 11: pseudocost / |objective coefficient|
    "branch_var_avg_inference",  // 12: average inferences / max depth
];

/// Total number of features
pub const FEATURE_COUNT: usize = 13;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over version and slot names
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout manifest written next to every dataset file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
    /// Vector size used for the sparse offsets (may exceed feature_count)
    pub vector_size: usize,
    pub max_depth: u32,
}

impl LayoutInfo {
    pub fn current(vector_size: usize, max_depth: u32) -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            vector_size,
            max_depth,
        }
    }

    pub fn validate(&self) -> Result<(), FeatureError> {
        validate_layout(self.version, self.hash)
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Validate that incoming data matches the compiled layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), FeatureError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(FeatureError::LayoutMismatch {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}
