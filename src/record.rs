//! Raw customer records as supplied by callers

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single raw field value. Deserializes from a bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Types a raw string the way form and CSV input is typed: integer, then
    /// number, then text. Surrounding whitespace is dropped.
    ///
    /// Only canonical integers (`"12"`, not `"012"` or `"+12"`) and finite
    /// numbers are typed; anything else stays text so categorical values keep
    /// their exact spelling.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return if i.to_string() == trimmed {
                FieldValue::Integer(i)
            } else {
                FieldValue::Text(trimmed.to_string())
            };
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => FieldValue::Number(f),
            _ => FieldValue::Text(trimmed.to_string()),
        }
    }

    /// String form used for categorical lookup.
    pub fn as_category(&self) -> String {
        self.to_string()
    }

    /// Numeric form used for normalized and pass-through positions.
    ///
    /// NaN and infinities are rejected: they would make every centroid
    /// distance non-comparable.
    pub fn as_f64(&self, field: &str) -> Result<f64> {
        let value = match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Number(f) => Some(*f),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::NonNumericValue {
                field: field.to_string(),
                value: self.to_string(),
            })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            // Integral floats keep a trailing ".0" so 1.0 and 1 stay distinct categories
            FieldValue::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// Field name to raw value. Created per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerRecord {
    fields: HashMap<String, FieldValue>,
}

impl CustomerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Like [`get`](Self::get) but fails with `MissingField`.
    pub fn require(&self, field: &str) -> Result<&FieldValue> {
        self.fields.get(field).ok_or_else(|| Error::MissingField {
            field: field.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for CustomerRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = CustomerRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
