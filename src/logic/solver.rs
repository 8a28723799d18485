//! Solver Interfaces
//!
//! Narrow read-only views onto the branch-and-bound engine. The feature
//! calculator only ever sees the search through these traits, so any
//! solver (or a recorded snapshot) can drive it.

use serde::{Deserialize, Serialize};

// ============================================================================
// VALUE TYPES
// ============================================================================

/// Role of a node in the search tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    FocusNode,
    ProbingNode,
    Sibling,
    Child,
    Leaf,
    DeadEnd,
    Junction,
    Pseudofork,
    Fork,
    Subroot,
    Refocusnode,
}

/// Bound tightened by a bound change
///
/// `None` is the state of a fresh feature vector. The partition index is
/// what places a computed vector into its block of the sparse index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundType {
    #[default]
    None,
    Upper,
    Lower,
}

impl BoundType {
    pub fn partition(self) -> usize {
        match self {
            BoundType::Lower => 1,
            BoundType::Upper | BoundType::None => 0,
        }
    }
}

/// Preferred branching direction of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchDirection {
    Downwards,
    #[default]
    Auto,
    Upwards,
}

/// Origin of a bound change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundChangeKind {
    #[default]
    Branching,
    ConsInfer,
    PropInfer,
}

/// A recorded bound change on a node
pub struct BoundChange<'a, V: ?Sized> {
    pub variable: &'a V,
    pub new_bound: f64,
    pub bound_type: BoundType,
    pub kind: BoundChangeKind,
}

impl<V: ?Sized> Clone for BoundChange<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: ?Sized> Copy for BoundChange<'_, V> {}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Per-variable statistics
pub trait VariableInfo {
    /// Current solution value; LP value if the relaxation is active
    fn solution_value(&self, has_relaxation: bool) -> f64;
    fn root_solution_value(&self) -> f64;
    fn preferred_branch_direction(&self) -> BranchDirection;
    /// Expected bound gain for moving the variable by `delta`
    fn pseudocost(&self, delta: f64) -> f64;
    fn avg_inferences(&self, direction: BranchDirection) -> f64;
    fn objective_coefficient(&self) -> f64;
    fn column_nonzero_count(&self) -> usize;
}

/// Node under evaluation
pub trait NodeInfo {
    type Var: VariableInfo + ?Sized;

    fn node_type(&self) -> NodeType;
    fn depth(&self) -> u32;
    fn lower_bound(&self) -> f64;
    fn estimate(&self) -> f64;
    /// First recorded bound change on the node, if any
    fn branching_bound_change(&self) -> Option<BoundChange<'_, Self::Var>>;
}

/// Global search state
pub trait SearchState {
    fn root_lower_bound(&self) -> f64;
    fn global_lower_bound(&self) -> f64;
    fn global_cutoff_bound(&self) -> f64;
    fn solutions_found_count(&self) -> u64;
    fn has_active_relaxation_at<N: NodeInfo>(&self, node: &N) -> bool;
}
