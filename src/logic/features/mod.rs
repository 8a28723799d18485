//! Features Module - Node Selection Feature Engine
//!
//! - `layout.rs` - slot schema, version and layout hash
//! - `vector.rs` - per-node feature storage and sparse offsets
//! - `calculator.rs` - fills a vector from solver state

pub mod layout;
pub mod vector;
pub mod calculator;


pub use layout::{NodeselFeature, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
pub use calculator::FeatureCalculator;
