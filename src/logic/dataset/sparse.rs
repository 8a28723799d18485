//! Sparse Row Export
//!
//! Writes feature vectors as `label idx:val idx:val ...` lines with
//! 1-based indices, the format read by libsvm-style rankers.
//! Every line is built in memory first and written with a single call.

use std::fmt::Write as _;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PRECISION;
use crate::logic::error::{FeatureError, FeatureResult};
use crate::logic::features::FeatureVector;

/// Fixed-precision sparse row formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseExporter {
    precision: usize,
}

impl Default for SparseExporter {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl SparseExporter {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Row for a single computed vector
    pub fn format_single(&self, vector: &FeatureVector, label: i32) -> FeatureResult<String> {
        let offset = vector.offset()?;

        let mut line = label.to_string();
        self.push_block(&mut line, offset, vector.values().iter().copied());
        line.push('\n');

        Ok(line)
    }

    /// Row for `a - b`.
    ///
    /// With `negate` the vectors swap places and the label flips sign, which
    /// gives the row of the opposite pair orientation. Vectors sharing an
    /// offset are merged slot by slot; otherwise `a` and `-b` are written as
    /// two blocks, lower offset first.
    pub fn format_diff(
        &self,
        a: &FeatureVector,
        b: &FeatureVector,
        label: i32,
        negate: bool,
    ) -> FeatureResult<String> {
        let (a, b, label) = if negate { (b, a, -label) } else { (a, b, label) };

        let offset_a = a.offset()?;
        let offset_b = b.offset()?;
        if a.size() != b.size() {
            return Err(FeatureError::SizeMismatch {
                expected: a.size(),
                actual: b.size(),
            });
        }

        let positive = a.values().iter().copied();
        let negated = b.values().iter().map(|v| -v);

        let mut line = label.to_string();
        if offset_a == offset_b {
            let diff = a.values().iter().zip(b.values()).map(|(x, y)| x - y);
            self.push_block(&mut line, offset_a, diff);
        } else if offset_a < offset_b {
            self.push_block(&mut line, offset_a, positive);
            self.push_block(&mut line, offset_b, negated);
        } else {
            self.push_block(&mut line, offset_b, negated);
            self.push_block(&mut line, offset_a, positive);
        }
        line.push('\n');

        Ok(line)
    }

    pub fn write_single<W: Write>(
        &self,
        out: &mut W,
        vector: &FeatureVector,
        label: i32,
    ) -> FeatureResult<()> {
        let line = self.format_single(vector, label)?;
        out.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn write_diff<W: Write>(
        &self,
        out: &mut W,
        a: &FeatureVector,
        b: &FeatureVector,
        label: i32,
        negate: bool,
    ) -> FeatureResult<()> {
        let line = self.format_diff(a, b, label, negate)?;
        out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn push_block(&self, line: &mut String, offset: usize, values: impl Iterator<Item = f64>) {
        for (i, value) in values.enumerate() {
            // print -0.0 as 0
            let value = if value == 0.0 { 0.0 } else { value };
            let _ = write!(line, " {}:{:.*}", i + offset + 1, self.precision, value);
        }
    }
}
