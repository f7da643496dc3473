//! Numeric normalizer: standard scaling with stored per-field statistics

use crate::error::{Error, Result};
use crate::record::FieldValue;
use std::collections::HashMap;

/// Mean and scale for one numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationStats {
    pub mean: f64,
    pub scale: f64,
}

impl NormalizationStats {
    pub fn new(mean: f64, scale: f64) -> Self {
        Self { mean, scale }
    }

    /// `(x - mean) / scale`. No range checks; scale is trusted to be positive.
    pub fn apply(&self, x: f64) -> f64 {
        (x - self.mean) / self.scale
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    stats: HashMap<String, NormalizationStats>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, field: impl Into<String>, stats: NormalizationStats) {
        self.stats.insert(field.into(), stats);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.stats.contains_key(field)
    }

    pub fn stats(&self, field: &str) -> Option<&NormalizationStats> {
        self.stats.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.stats.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Standardizes `value` for `field`.
    pub fn normalize(&self, field: &str, value: &FieldValue) -> Result<f64> {
        let stats = self.stats.get(field).ok_or_else(|| Error::UnregisteredField {
            field: field.to_string(),
        })?;
        Ok(stats.apply(value.as_f64(field)?))
    }
}
