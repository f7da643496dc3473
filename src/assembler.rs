//! Feature vector assembly in the exact column layout the model was trained on

use crate::encoder::EncoderBank;
use crate::error::{Error, Result};
use crate::normalizer::Normalizer;
use crate::record::CustomerRecord;
use ndarray::Array1;
use std::collections::HashSet;

/// Canonical positional layout of the model input vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOrder {
    fields: Vec<String>,
}

impl FeatureOrder {
    /// Fails on an empty layout or a field listed twice.
    pub fn new(fields: Vec<String>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::invalid_artifact("feature order", "no fields"));
        }
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(Error::invalid_artifact(
                    "feature order",
                    format!("field '{}' listed more than once", field),
                ));
            }
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Builds the model input for `record`, one entry per field of `order`.
///
/// Each position is taken from the encoder bank when the field has a codec,
/// from the normalizer when it has stats, and otherwise as the raw number.
pub fn assemble(
    record: &CustomerRecord,
    codecs: &EncoderBank,
    stats: &Normalizer,
    order: &FeatureOrder,
) -> Result<Array1<f64>> {
    let mut values = Vec::with_capacity(order.len());

    for field in order.iter() {
        let raw = record.require(field)?;
        let value = if codecs.contains(field) {
            codecs.encode(field, raw)? as f64
        } else if stats.contains(field) {
            stats.normalize(field, raw)?
        } else {
            raw.as_f64(field)?
        };
        values.push(value);
    }

    Ok(Array1::from(values))
}
