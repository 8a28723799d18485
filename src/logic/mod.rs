//! Logic Module - Feature Engine & Training Data Export
//!
//! - `solver` - read-only views onto the branch-and-bound engine
//! - `snapshot` - recorded solver state implementing those views
//! - `features` - layout, vector and calculator
//! - `dataset` - sparse rows and the shared dataset writer

pub mod config;
pub mod error;
pub mod solver;
pub mod snapshot;
pub mod features;
pub mod dataset;
