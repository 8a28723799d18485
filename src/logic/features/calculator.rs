//! Node Feature Calculation
//!
//! Turns the state of a freshly branched node into the normalized
//! node selection features described in `layout.rs`.

use super::layout::{NodeselFeature, FEATURE_COUNT};
use super::vector::FeatureVector;
use crate::constants::{COLUMN_SIZE_FALLBACK, CUTOFF_SHRINK, ROOT_BOUND_FALLBACK};
use crate::logic::error::{FeatureError, FeatureResult};
use crate::logic::solver::{
    BoundChangeKind, BoundType, BranchDirection, NodeInfo, NodeType, SearchState, VariableInfo,
};

/// Root lower bound used as normalizer, `ROOT_BOUND_FALLBACK` when zero
pub fn normalized_root_bound(root_lower_bound: f64) -> f64 {
    if root_lower_bound == 0.0 {
        ROOT_BOUND_FALLBACK
    } else {
        root_lower_bound
    }
}

/// Cutoff bound used for the relative bound feature.
///
/// Before the first solution the cutoff carries no information, so only
/// a fraction of the gap above the global lower bound is used.
pub fn adjusted_cutoff(global_lower_bound: f64, cutoff_bound: f64, solutions_found: u64) -> f64 {
    if solutions_found == 0 {
        global_lower_bound + CUTOFF_SHRINK * (cutoff_bound - global_lower_bound)
    } else {
        cutoff_bound
    }
}

/// Computes node features against one search state
pub struct FeatureCalculator<'a, S> {
    search: &'a S,
}

impl<'a, S: SearchState> FeatureCalculator<'a, S> {
    pub fn new(search: &'a S) -> Self {
        Self { search }
    }

    /// Fill `vector` for `node`.
    ///
    /// The node must sit below the root and carry a branching change of its
    /// lower or upper bound as its first bound change; `vector` needs its
    /// max depth set. Sets the vector's depth and bound type, leaves the
    /// auxiliary scalars alone.
    pub fn calculate<N: NodeInfo>(&self, node: &N, vector: &mut FeatureVector) -> FeatureResult<()> {
        let depth = node.depth();
        if depth == 0 {
            return Err(FeatureError::RootNode);
        }
        if vector.max_depth() == 0 {
            return Err(FeatureError::MaxDepthUnset);
        }
        if vector.size() < FEATURE_COUNT {
            return Err(FeatureError::LayoutTooSmall {
                size: vector.size(),
                required: FEATURE_COUNT,
            });
        }

        // only single-variable branching is supported, and a branching
        // decision always tightens one of the two bounds
        let change = node
            .branching_bound_change()
            .filter(|c| c.kind == BoundChangeKind::Branching && c.bound_type != BoundType::None)
            .ok_or(FeatureError::MissingBranchingChange)?;
        let var = change.variable;

        let node_lower_bound = node.lower_bound();
        let root_lower_bound = normalized_root_bound(self.search.root_lower_bound());
        let lower_bound = self.search.global_lower_bound();
        let cutoff_bound = adjusted_cutoff(
            lower_bound,
            self.search.global_cutoff_bound(),
            self.search.solutions_found_count(),
        );

        let var_obj = var.objective_coefficient();
        let col_size = match var.column_nonzero_count() {
            0 => COLUMN_SIZE_FALLBACK,
            n => n as f64,
        };
        let has_lp = self.search.has_active_relaxation_at(node);
        let var_sol = var.solution_value(has_lp);
        let var_root_sol = var.root_solution_value();
        let max_depth = f64::from(vector.max_depth());

        vector.values_mut().fill(0.0);
        vector.mark_computed(depth, change.bound_type);

        vector.set(NodeselFeature::LowerBoundRatio, node_lower_bound / root_lower_bound);
        vector.set(NodeselFeature::EstimateRatio, node.estimate() / root_lower_bound);

        let gap = cutoff_bound - lower_bound;
        if gap != 0.0 {
            vector.set(NodeselFeature::RelativeBound, (node_lower_bound - lower_bound) / gap);
        }

        match node.node_type() {
            NodeType::Sibling => vector.set(NodeselFeature::TypeSibling, 1.0),
            NodeType::Child => vector.set(NodeselFeature::TypeChild, 1.0),
            NodeType::Leaf => vector.set(NodeselFeature::TypeLeaf, 1.0),
            _ => {}
        }

        vector.set(NodeselFeature::BranchVarObjRatio, var_obj / col_size);
        vector.set(NodeselFeature::BranchVarBoundLpDiff, change.new_bound - var_sol);
        vector.set(NodeselFeature::BranchVarRootLpDiff, var_root_sol - var_sol);

        match var.preferred_branch_direction() {
            BranchDirection::Downwards => vector.set(NodeselFeature::BranchPrioDown, 1.0),
            BranchDirection::Upwards => vector.set(NodeselFeature::BranchPrioUp, 1.0),
            BranchDirection::Auto => {}
        }

        if var_obj != 0.0 {
            let pseudocost = var.pseudocost(change.new_bound - var_sol);
            vector.set(NodeselFeature::BranchVarPseudocost, pseudocost / var_obj.abs());
        } else {
            log::debug!("branching variable has zero objective, pseudocost feature left at 0");
        }

        let inference_dir = if change.bound_type == BoundType::Lower {
            BranchDirection::Upwards
        } else {
            BranchDirection::Downwards
        };
        vector.set(
            NodeselFeature::BranchVarAvgInference,
            var.avg_inferences(inference_dir) / max_depth,
        );

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("node features at depth {}: {}", depth, vector.to_log_entry());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_root_bound() {
        assert_eq!(normalized_root_bound(0.0), 0.1);
        assert_eq!(normalized_root_bound(-4.0), -4.0);
    }

    #[test]
    fn test_adjusted_cutoff_without_solutions() {
        assert!((adjusted_cutoff(10.0, 50.0, 0) - 18.0).abs() < 1e-12);
        assert_eq!(adjusted_cutoff(10.0, 50.0, 3), 50.0);
    }
}
