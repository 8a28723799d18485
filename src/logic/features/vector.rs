//! Feature Vector - per-node feature storage
//!
//! A vector is either fresh (all zeros, depth 0) or computed (depth set,
//! slots filled by the calculator). Slots the calculator does not touch
//! stay at zero.

use serde::{Deserialize, Serialize};

use super::layout::{feature_index, NodeselFeature, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::constants::DEPTH_BUCKETS;
use crate::logic::error::{FeatureError, FeatureResult};
use crate::logic::solver::BoundType;

// ============================================================================
// FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
    depth: u32,
    max_depth: u32,
    bound_type: BoundType,
    root_lp_objective: f64,
    sum_objective_coeff: f64,
    num_constraints: u32,
}

impl FeatureVector {
    /// Create a zeroed vector with `size` slots
    pub fn new(size: usize) -> Self {
        Self {
            values: vec![0.0; size],
            depth: 0,
            max_depth: 0,
            bound_type: BoundType::None,
            root_lp_objective: 0.0,
            sum_objective_coeff: 0.0,
            num_constraints: 0,
        }
    }

    /// Create a zeroed vector sized for the node selection layout
    pub fn for_layout() -> Self {
        Self::new(FEATURE_COUNT)
    }

    /// Overwrite metadata and every slot of `self` with `source`.
    ///
    /// Both vectors must have the same size.
    pub fn copy_from(&mut self, source: &FeatureVector) -> FeatureResult<()> {
        if self.size() != source.size() {
            return Err(FeatureError::SizeMismatch {
                expected: self.size(),
                actual: source.size(),
            });
        }

        self.max_depth = source.max_depth;
        self.depth = source.depth;
        self.bound_type = source.bound_type;
        self.root_lp_objective = source.root_lp_objective;
        self.sum_objective_coeff = source.sum_objective_coeff;
        self.num_constraints = source.num_constraints;
        self.values.copy_from_slice(&source.values);

        Ok(())
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    pub fn root_lp_objective(&self) -> f64 {
        self.root_lp_objective
    }

    pub fn sum_objective_coeff(&self) -> f64 {
        self.sum_objective_coeff
    }

    pub fn num_constraints(&self) -> u32 {
        self.num_constraints
    }

    /// True once the calculator has filled the vector
    pub fn is_computed(&self) -> bool {
        self.depth != 0
    }

    pub fn get(&self, slot: NodeselFeature) -> f64 {
        self.values.get(slot.index()).copied().unwrap_or(0.0)
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.values.get(i).copied())
    }

    /// Set a slot; ignored when the vector is too short to hold it
    pub fn set(&mut self, slot: NodeselFeature, value: f64) {
        if let Some(v) = self.values.get_mut(slot.index()) {
            *v = value;
        }
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    pub fn set_root_lp_objective(&mut self, root_lp_objective: f64) {
        self.root_lp_objective = root_lp_objective;
    }

    pub fn set_sum_objective_coeff(&mut self, sum_objective_coeff: f64) {
        self.sum_objective_coeff = sum_objective_coeff;
    }

    pub fn set_num_constraints(&mut self, num_constraints: u32) {
        self.num_constraints = num_constraints;
    }

    pub(crate) fn mark_computed(&mut self, depth: u32, bound_type: BoundType) {
        self.depth = depth;
        self.bound_type = bound_type;
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Start of this vector's block in the sparse index space.
    ///
    /// Every (depth bucket, bound type) pair gets its own block of `size`
    /// indices: `size * 2 * (depth / (max_depth / 10)) + size * partition`.
    pub fn offset(&self) -> FeatureResult<usize> {
        if !self.is_computed() {
            return Err(FeatureError::Uncomputed);
        }
        if self.max_depth == 0 {
            return Err(FeatureError::MaxDepthUnset);
        }

        let bucket_width = self.max_depth / DEPTH_BUCKETS;
        if bucket_width == 0 {
            return Err(FeatureError::MaxDepthTooSmall {
                max_depth: self.max_depth,
                buckets: DEPTH_BUCKETS,
            });
        }

        let size = self.size();
        let bucket = (self.depth / bucket_width) as usize;
        Ok(size * 2 * bucket + size * self.bound_type.partition())
    }

    /// JSON form for debug logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "depth": self.depth,
            "max_depth": self.max_depth,
            "bound_type": self.bound_type,
            "values": self.values,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::for_layout()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(size: usize, depth: u32, max_depth: u32, bound_type: BoundType) -> FeatureVector {
        let mut vector = FeatureVector::new(size);
        vector.set_max_depth(max_depth);
        vector.mark_computed(depth, bound_type);
        vector
    }

    #[test]
    fn test_feature_vector_new() {
        let vector = FeatureVector::new(7);
        assert_eq!(vector.size(), 7);
        assert!(vector.values().iter().all(|&v| v == 0.0));
        assert_eq!(vector.depth(), 0);
        assert_eq!(vector.max_depth(), 0);
        assert_eq!(vector.bound_type(), BoundType::None);
        assert!(!vector.is_computed());
    }

    #[test]
    fn test_copy_from_is_deep() {
        let mut source = computed(FEATURE_COUNT, 12, 100, BoundType::Lower);
        source.set(NodeselFeature::EstimateRatio, 2.5);
        source.set_root_lp_objective(-3.0);
        source.set_sum_objective_coeff(40.0);
        source.set_num_constraints(17);

        let mut copy = FeatureVector::for_layout();
        copy.copy_from(&source).unwrap();
        assert_eq!(copy, source);

        source.set(NodeselFeature::EstimateRatio, 9.0);
        source.set_num_constraints(1);
        assert_eq!(copy.get(NodeselFeature::EstimateRatio), 2.5);
        assert_eq!(copy.num_constraints(), 17);
    }

    #[test]
    fn test_copy_from_size_mismatch() {
        let source = FeatureVector::new(11);
        let mut dest = FeatureVector::new(13);
        let err = dest.copy_from(&source).unwrap_err();
        assert!(matches!(err, FeatureError::SizeMismatch { expected: 13, actual: 11 }));
    }

    #[test]
    fn test_offset_example() {
        let vector = computed(11, 25, 100, BoundType::Lower);
        assert_eq!(vector.offset().unwrap(), 55);
    }

    #[test]
    fn test_offset_upper_bound_first_bucket() {
        let vector = computed(13, 3, 100, BoundType::Upper);
        assert_eq!(vector.offset().unwrap(), 0);
    }

    #[test]
    fn test_offset_preconditions() {
        let fresh = FeatureVector::new(11);
        assert!(matches!(fresh.offset(), Err(FeatureError::Uncomputed)));

        let unset = computed(11, 5, 0, BoundType::Lower);
        assert!(matches!(unset.offset(), Err(FeatureError::MaxDepthUnset)));

        let shallow = computed(11, 5, 9, BoundType::Lower);
        assert!(matches!(
            shallow.offset(),
            Err(FeatureError::MaxDepthTooSmall { max_depth: 9, .. })
        ));
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut vector = FeatureVector::new(2);
        vector.set(NodeselFeature::BranchPrioUp, 1.0);
        assert_eq!(vector.get(NodeselFeature::BranchPrioUp), 0.0);
        assert_eq!(vector.values(), &[0.0, 0.0]);
    }

    #[test]
    fn test_get_by_name() {
        let mut vector = FeatureVector::for_layout();
        vector.set(NodeselFeature::TypeLeaf, 1.0);
        assert_eq!(vector.get_by_name("type_leaf"), Some(1.0));
        assert_eq!(vector.get_by_name("nonexistent"), None);
    }

    #[test]
    fn test_to_log_entry() {
        let mut vector = computed(FEATURE_COUNT, 4, 100, BoundType::Upper);
        vector.set(NodeselFeature::RelativeBound, 0.5);

        let log = vector.to_log_entry();
        assert_eq!(log["depth"], 4);
        assert_eq!(log["bound_type"], "upper");
        assert_eq!(log["named_values"]["relative_bound"], 0.5);
    }
}
