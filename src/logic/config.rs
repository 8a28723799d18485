//! Export Configuration
//!
//! Values come from the environment (see `constants.rs`) and are checked
//! once up front, so the calculator and exporter never see a max depth
//! that cannot be split into depth buckets.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{self, DEPTH_BUCKETS, MAX_PRECISION};
use crate::logic::dataset::SparseExporter;
use crate::logic::error::{FeatureError, FeatureResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Max depth normalizer stamped onto every vector
    pub max_depth: u32,
    /// Decimals per sparse value
    pub precision: usize,
    /// Directory for timestamped dataset files
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            precision: constants::DEFAULT_PRECISION,
            output_dir: constants::default_output_dir(),
        }
    }
}

impl ExportConfig {
    pub fn from_env() -> Self {
        Self {
            max_depth: constants::get_max_depth(),
            precision: constants::get_precision(),
            output_dir: constants::get_output_dir(),
        }
    }

    pub fn validate(&self) -> FeatureResult<()> {
        if self.max_depth < DEPTH_BUCKETS {
            return Err(FeatureError::InvalidConfig(format!(
                "max_depth must be at least {}, got {}",
                DEPTH_BUCKETS, self.max_depth
            )));
        }
        if self.precision > MAX_PRECISION {
            return Err(FeatureError::InvalidConfig(format!(
                "precision must be at most {}, got {}",
                MAX_PRECISION, self.precision
            )));
        }
        Ok(())
    }

    pub fn exporter(&self) -> SparseExporter {
        SparseExporter::new(self.precision)
    }
}
