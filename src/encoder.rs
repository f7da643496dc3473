//! Categorical encoder bank: raw category strings to dense integer codes

use crate::error::{Error, Result};
use crate::record::FieldValue;
use std::collections::HashMap;

/// Literal category the fallback resolves to.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Code assignment for one categorical field. Codes follow training order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalCodec {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
    unknown_code: Option<usize>,
}

impl CategoricalCodec {
    /// Builds a codec from classes in code order.
    ///
    /// With `has_unknown_fallback` set, `classes` must contain `"unknown"`;
    /// unmatched values then encode to its code.
    pub fn new(classes: Vec<String>, has_unknown_fallback: bool) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::invalid_artifact("codec", "no classes"));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                return Err(Error::invalid_artifact(
                    "codec",
                    format!("duplicate class '{}'", class),
                ));
            }
        }

        let unknown_code = if has_unknown_fallback {
            let code = codes.get(UNKNOWN_CATEGORY).copied().ok_or_else(|| {
                Error::invalid_artifact("codec", "fallback enabled but no 'unknown' class")
            })?;
            Some(code)
        } else {
            None
        };

        Ok(Self {
            classes,
            codes,
            unknown_code,
        })
    }

    /// Codec whose fallback is enabled exactly when `"unknown"` is a class.
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        let has_unknown = classes.iter().any(|c| c == UNKNOWN_CATEGORY);
        Self::new(classes, has_unknown)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_unknown_fallback(&self) -> bool {
        self.unknown_code.is_some()
    }

    /// Code for an exact class match.
    pub fn code_of(&self, category: &str) -> Option<usize> {
        self.codes.get(category).copied()
    }

    fn encode_str(&self, field: &str, category: &str) -> Result<usize> {
        self.code_of(category)
            .or(self.unknown_code)
            .ok_or_else(|| Error::UnknownCategory {
                field: field.to_string(),
                value: category.to_string(),
            })
    }
}

/// All categorical codecs, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct EncoderBank {
    codecs: HashMap<String, CategoricalCodec>,
}

impl EncoderBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, field: impl Into<String>, codec: CategoricalCodec) {
        self.codecs.insert(field.into(), codec);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.codecs.contains_key(field)
    }

    pub fn codec(&self, field: &str) -> Option<&CategoricalCodec> {
        self.codecs.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Encodes `value` for `field`.
    ///
    /// The value is coerced to its string form first. Unmatched values map to
    /// the `"unknown"` code when the codec has a fallback, and fail with
    /// `UnknownCategory` otherwise.
    pub fn encode(&self, field: &str, value: &FieldValue) -> Result<usize> {
        let codec = self.codecs.get(field).ok_or_else(|| Error::UnregisteredField {
            field: field.to_string(),
        })?;
        codec.encode_str(field, &value.as_category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_bank() -> EncoderBank {
        let mut bank = EncoderBank::new();
        bank.register(
            "Housing",
            CategoricalCodec::from_classes(classes(&["free", "own", "rent"])).unwrap(),
        );
        bank.register(
            "Saving accounts",
            CategoricalCodec::from_classes(classes(&["little", "moderate", "rich", "unknown"]))
                .unwrap(),
        );
        bank.register(
            "Job",
            CategoricalCodec::from_classes(classes(&["0", "1", "2", "3"])).unwrap(),
        );
        bank
    }

    #[test]
    fn test_codes_follow_training_order() {
        let codec = CategoricalCodec::from_classes(classes(&["rent", "free", "own"])).unwrap();
        assert_eq!(codec.code_of("rent"), Some(0));
        assert_eq!(codec.code_of("free"), Some(1));
        assert_eq!(codec.code_of("own"), Some(2));
    }

    #[test]
    fn test_encode_known_category() {
        let bank = create_test_bank();
        assert_eq!(bank.encode("Housing", &"rent".into()).unwrap(), 2);
        assert_eq!(bank.encode("Saving accounts", &"moderate".into()).unwrap(), 1);
    }

    #[test]
    fn test_integer_values_coerced_to_string() {
        let bank = create_test_bank();
        assert_eq!(bank.encode("Job", &FieldValue::Integer(2)).unwrap(), 2);
    }

    #[test]
    fn test_unknown_fallback_matches_literal_unknown() {
        let bank = create_test_bank();
        let unknown = bank.encode("Saving accounts", &"unknown".into()).unwrap();

        for value in ["very rich", "", "LITTLE", "42"] {
            assert_eq!(
                bank.encode("Saving accounts", &value.into()).unwrap(),
                unknown,
                "value {:?} should fall back",
                value
            );
        }
    }

    #[test]
    fn test_unknown_category_without_fallback() {
        let bank = create_test_bank();

        for _ in 0..3 {
            let err = bank.encode("Housing", &"castle".into()).unwrap_err();
            match err {
                Error::UnknownCategory { field, value } => {
                    assert_eq!(field, "Housing");
                    assert_eq!(value, "castle");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_unregistered_field() {
        let bank = create_test_bank();
        let err = bank.encode("Purpose", &"car".into()).unwrap_err();
        assert!(matches!(err, Error::UnregisteredField { .. }));
    }

    #[test]
    fn test_explicit_fallback_flag() {
        // "unknown" present but fallback disabled: unmatched values are rejected
        let codec = CategoricalCodec::new(classes(&["little", "unknown"]), false).unwrap();
        assert!(!codec.has_unknown_fallback());
        let mut bank = EncoderBank::new();
        bank.register("Checking account", codec);
        assert!(bank.encode("Checking account", &"rich".into()).is_err());
        assert_eq!(bank.encode("Checking account", &"unknown".into()).unwrap(), 1);

        assert!(CategoricalCodec::new(classes(&["little"]), true).is_err());
    }

    #[test]
    fn test_invalid_codecs() {
        assert!(CategoricalCodec::from_classes(vec![]).is_err());
        assert!(CategoricalCodec::from_classes(classes(&["own", "own"])).is_err());
    }
}
