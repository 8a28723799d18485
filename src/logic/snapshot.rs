//! Recorded Solver State
//!
//! Plain serde records of what the feature calculator reads from a live
//! solver. Used to replay node visits offline and as test fixtures.
//! One `TrainingSample` per JSONL line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{FeatureError, FeatureResult};
use super::features::FeatureVector;
use super::solver::{
    BoundChange, BoundChangeKind, BoundType, BranchDirection, NodeInfo, NodeType, SearchState,
    VariableInfo,
};

// ============================================================================
// VARIABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    #[serde(default)]
    pub name: String,
    /// Value in the LP relaxation at the node
    pub lp_solution: f64,
    /// Value in the pseudo solution (used when no LP is active)
    #[serde(default)]
    pub pseudo_solution: f64,
    pub root_solution: f64,
    #[serde(default)]
    pub branch_direction: BranchDirection,
    /// Per-unit pseudocosts
    #[serde(default)]
    pub pscost_down: f64,
    #[serde(default)]
    pub pscost_up: f64,
    #[serde(default)]
    pub avg_inferences_down: f64,
    #[serde(default)]
    pub avg_inferences_up: f64,
    pub objective: f64,
    pub column_nonzeros: usize,
}

impl VariableInfo for VariableSnapshot {
    fn solution_value(&self, has_relaxation: bool) -> f64 {
        if has_relaxation {
            self.lp_solution
        } else {
            self.pseudo_solution
        }
    }

    fn root_solution_value(&self) -> f64 {
        self.root_solution
    }

    fn preferred_branch_direction(&self) -> BranchDirection {
        self.branch_direction
    }

    fn pseudocost(&self, delta: f64) -> f64 {
        if delta >= 0.0 {
            delta * self.pscost_up
        } else {
            -delta * self.pscost_down
        }
    }

    fn avg_inferences(&self, direction: BranchDirection) -> f64 {
        match direction {
            BranchDirection::Upwards => self.avg_inferences_up,
            BranchDirection::Downwards => self.avg_inferences_down,
            BranchDirection::Auto => 0.5 * (self.avg_inferences_up + self.avg_inferences_down),
        }
    }

    fn objective_coefficient(&self) -> f64 {
        self.objective
    }

    fn column_nonzero_count(&self) -> usize {
        self.column_nonzeros
    }
}

// ============================================================================
// NODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundChangeSnapshot {
    pub variable: VariableSnapshot,
    pub new_bound: f64,
    pub bound_type: BoundType,
    #[serde(default)]
    pub kind: BoundChangeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub node_type: NodeType,
    pub depth: u32,
    pub lower_bound: f64,
    pub estimate: f64,
    /// Bound changes in the order they were applied to the node
    #[serde(default)]
    pub bound_changes: Vec<BoundChangeSnapshot>,
}

impl NodeInfo for NodeSnapshot {
    type Var = VariableSnapshot;

    fn node_type(&self) -> NodeType {
        self.node_type
    }

    fn depth(&self) -> u32 {
        self.depth
    }

    fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    fn estimate(&self) -> f64 {
        self.estimate
    }

    fn branching_bound_change(&self) -> Option<BoundChange<'_, VariableSnapshot>> {
        self.bound_changes.first().map(|c| BoundChange {
            variable: &c.variable,
            new_bound: c.new_bound,
            bound_type: c.bound_type,
            kind: c.kind,
        })
    }
}

// ============================================================================
// SEARCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub root_lower_bound: f64,
    pub global_lower_bound: f64,
    pub cutoff_bound: f64,
    #[serde(default)]
    pub solutions_found: u64,
    /// LP relaxation solved at the focus node
    #[serde(default = "default_has_lp")]
    pub has_lp: bool,

    // Normalizers copied onto the vector, not used by the calculator
    #[serde(default)]
    pub root_lp_objective: f64,
    #[serde(default)]
    pub sum_objective_coeff: f64,
    #[serde(default)]
    pub num_constraints: u32,
}

fn default_has_lp() -> bool {
    true
}

impl SearchSnapshot {
    /// Copy the auxiliary normalizers onto `vector`
    pub fn apply_normalizers(&self, vector: &mut FeatureVector) {
        vector.set_root_lp_objective(self.root_lp_objective);
        vector.set_sum_objective_coeff(self.sum_objective_coeff);
        vector.set_num_constraints(self.num_constraints);
    }
}

impl SearchState for SearchSnapshot {
    fn root_lower_bound(&self) -> f64 {
        self.root_lower_bound
    }

    fn global_lower_bound(&self) -> f64 {
        self.global_lower_bound
    }

    fn global_cutoff_bound(&self) -> f64 {
        self.cutoff_bound
    }

    fn solutions_found_count(&self) -> u64 {
        self.solutions_found
    }

    // A snapshot is recorded at its focus node
    fn has_active_relaxation_at<N: NodeInfo>(&self, _node: &N) -> bool {
        self.has_lp
    }
}

// ============================================================================
// SAMPLES
// ============================================================================

/// Labeled node visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub label: i32,
    pub node: NodeSnapshot,
    pub search: SearchSnapshot,
}

/// Read all samples from a JSONL file
pub fn read_samples(path: &Path) -> FeatureResult<Vec<TrainingSample>> {
    let reader = BufReader::new(File::open(path)?);
    let mut samples = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let sample = serde_json::from_str::<TrainingSample>(&line).map_err(|e| FeatureError::Parse {
            line: i + 1,
            message: e.to_string(),
        })?;
        samples.push(sample);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn variable() -> VariableSnapshot {
        VariableSnapshot {
            name: "x3".to_string(),
            lp_solution: 2.4,
            pseudo_solution: 1.0,
            root_solution: 2.0,
            branch_direction: BranchDirection::Auto,
            pscost_down: 0.5,
            pscost_up: 2.0,
            avg_inferences_down: 4.0,
            avg_inferences_up: 8.0,
            objective: 3.0,
            column_nonzeros: 5,
        }
    }

    #[test]
    fn test_pseudocost_direction() {
        let var = variable();
        assert!((var.pseudocost(0.6) - 1.2).abs() < 1e-12);
        assert!((var.pseudocost(-0.4) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_solution_value_without_lp() {
        let var = variable();
        assert_eq!(var.solution_value(true), 2.4);
        assert_eq!(var.solution_value(false), 1.0);
    }

    #[test]
    fn test_first_bound_change_is_branching_change() {
        let node = NodeSnapshot {
            node_type: NodeType::Child,
            depth: 1,
            lower_bound: 0.0,
            estimate: 0.0,
            bound_changes: vec![BoundChangeSnapshot {
                variable: variable(),
                new_bound: 3.0,
                bound_type: BoundType::Lower,
                kind: BoundChangeKind::Branching,
            }],
        };

        let change = node.branching_bound_change().unwrap();
        assert_eq!(change.new_bound, 3.0);
        assert_eq!(change.variable.name, "x3");

        let empty = NodeSnapshot { bound_changes: vec![], ..node };
        assert!(empty.branching_bound_change().is_none());
    }

    #[test]
    fn test_read_samples_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        let line = r#"{"label":1,"node":{"node_type":"leaf","depth":2,"lower_bound":1.0,"estimate":1.5},"search":{"root_lower_bound":1.0,"global_lower_bound":1.0,"cutoff_bound":4.0}}"#;
        writeln!(file, "{}", line).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", line).unwrap();

        let samples = read_samples(file.path()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].node.node_type, NodeType::Leaf);
        assert!(samples[0].search.has_lp);
        assert!(samples[0].node.bound_changes.is_empty());
    }

    #[test]
    fn test_read_samples_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{{not json").unwrap();

        let err = read_samples(file.path()).unwrap_err();
        assert!(matches!(err, FeatureError::Parse { line: 2, .. }));
    }
}
