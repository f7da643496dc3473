//! Typed artifact schema, JSON loading and load-time validation
//!
//! An artifact directory holds five JSON documents produced by the training
//! side. They are parsed into plain serde structs ([`ArtifactBundle`]) and then
//! checked for internal consistency before being turned into the in-memory
//! pipeline components ([`Artifacts`]).

use crate::assembler::FeatureOrder;
use crate::encoder::{CategoricalCodec, EncoderBank};
use crate::error::{Error, Result};
use crate::model::CentroidModel;
use crate::normalizer::{NormalizationStats, Normalizer};
use crate::segments::SegmentNames;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const SCALER_FILE: &str = "standard_scaler.json";
pub const MODEL_FILE: &str = "kmeans_model.json";
pub const FEATURES_FILE: &str = "feature_cols.json";
pub const SEGMENT_NAMES_FILE: &str = "segment_names.json";

/// Serialized form of one categorical codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecSpec {
    /// Known categories in code order
    pub classes: Vec<String>,
    /// Derived from the presence of `"unknown"` in `classes` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_unknown_fallback: Option<bool>,
}

/// Serialized standard scaler statistics, parallel arrays per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerSpec {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub cluster_centers: Vec<Vec<f64>>,
}

/// The five artifact documents exactly as stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub encoders: BTreeMap<String, CodecSpec>,
    pub scaler: ScalerSpec,
    pub model: ModelSpec,
    pub feature_cols: Vec<String>,
    /// Keys are cluster ids in string form, as JSON object keys must be
    pub segment_names: BTreeMap<String, String>,
}

impl ArtifactBundle {
    /// Reads all five documents from `dir`.
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            encoders: read_json(&dir.join(ENCODERS_FILE))?,
            scaler: read_json(&dir.join(SCALER_FILE))?,
            model: read_json(&dir.join(MODEL_FILE))?,
            feature_cols: read_json(&dir.join(FEATURES_FILE))?,
            segment_names: read_json(&dir.join(SEGMENT_NAMES_FILE))?,
        })
    }

    /// Writes all five documents into `dir`, creating it if needed.
    pub fn write_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        write_json(&dir.join(ENCODERS_FILE), &self.encoders)?;
        write_json(&dir.join(SCALER_FILE), &self.scaler)?;
        write_json(&dir.join(MODEL_FILE), &self.model)?;
        write_json(&dir.join(FEATURES_FILE), &self.feature_cols)?;
        write_json(&dir.join(SEGMENT_NAMES_FILE), &self.segment_names)?;
        Ok(())
    }
}

/// Validated, read-only pipeline components.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub codecs: EncoderBank,
    pub stats: Normalizer,
    pub model: CentroidModel,
    pub order: FeatureOrder,
    pub names: SegmentNames,
}

impl Artifacts {
    /// Loads and validates the artifact set stored in `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let artifacts = Self::from_bundle(ArtifactBundle::read_dir(dir)?)?;
        tracing::info!(
            dir = %dir.display(),
            clusters = artifacts.model.n_clusters(),
            features = artifacts.order.len(),
            "loaded artifacts"
        );
        Ok(artifacts)
    }

    /// Validates a bundle and builds the pipeline components from it.
    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self> {
        let order = FeatureOrder::new(bundle.feature_cols)?;

        let model = CentroidModel::from_rows(bundle.model.cluster_centers)?;
        if model.dim() != order.len() {
            return Err(Error::DimensionMismatch {
                expected: order.len(),
                actual: model.dim(),
            });
        }

        let mut codecs = EncoderBank::new();
        for (field, spec) in bundle.encoders {
            require_in_order(&order, ENCODERS_FILE, &field)?;
            let codec = match spec.has_unknown_fallback {
                Some(flag) => CategoricalCodec::new(spec.classes, flag),
                None => CategoricalCodec::from_classes(spec.classes),
            }
            .map_err(|e| match e {
                Error::InvalidArtifact { reason, .. } => {
                    Error::invalid_artifact(ENCODERS_FILE, format!("field '{}': {}", field, reason))
                }
                other => other,
            })?;
            codecs.register(field, codec);
        }

        let stats = build_normalizer(bundle.scaler, &order)?;
        for field in stats.fields() {
            if codecs.contains(field) {
                return Err(Error::invalid_artifact(
                    SCALER_FILE,
                    format!("field '{}' is also categorical", field),
                ));
            }
        }

        let names = build_segment_names(bundle.segment_names, model.n_clusters())?;

        Ok(Self {
            codecs,
            stats,
            model,
            order,
            names,
        })
    }
}

fn require_in_order(order: &FeatureOrder, artifact: &str, field: &str) -> Result<()> {
    if order.contains(field) {
        Ok(())
    } else {
        Err(Error::invalid_artifact(
            artifact,
            format!("field '{}' is not in the feature order", field),
        ))
    }
}

fn build_normalizer(scaler: ScalerSpec, order: &FeatureOrder) -> Result<Normalizer> {
    let n = scaler.feature_names.len();
    if scaler.mean.len() != n || scaler.scale.len() != n {
        return Err(Error::invalid_artifact(
            SCALER_FILE,
            format!(
                "{} feature names but {} means and {} scales",
                n,
                scaler.mean.len(),
                scaler.scale.len()
            ),
        ));
    }

    let mut normalizer = Normalizer::new();
    for ((field, mean), scale) in scaler
        .feature_names
        .into_iter()
        .zip(scaler.mean)
        .zip(scaler.scale)
    {
        require_in_order(order, SCALER_FILE, &field)?;
        if normalizer.contains(&field) {
            return Err(Error::invalid_artifact(
                SCALER_FILE,
                format!("field '{}' listed more than once", field),
            ));
        }
        normalizer.register(field, NormalizationStats::new(mean, scale));
    }
    Ok(normalizer)
}

fn build_segment_names(raw: BTreeMap<String, String>, n_clusters: usize) -> Result<SegmentNames> {
    let mut names = SegmentNames::new();
    for (key, name) in raw {
        let id: usize = key.trim().parse().map_err(|_| {
            Error::invalid_artifact(
                SEGMENT_NAMES_FILE,
                format!("key '{}' is not a cluster id", key),
            )
        })?;
        if id >= n_clusters {
            tracing::warn!(
                cluster_id = id,
                n_clusters,
                "segment name for a cluster the model does not have"
            );
        }
        names.insert(id, name);
    }
    Ok(names)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_bundle() -> ArtifactBundle {
        let mut encoders = BTreeMap::new();
        encoders.insert(
            "Sex".to_string(),
            CodecSpec {
                classes: strings(&["female", "male"]),
                has_unknown_fallback: None,
            },
        );
        encoders.insert(
            "Saving accounts".to_string(),
            CodecSpec {
                classes: strings(&["little", "rich", "unknown"]),
                has_unknown_fallback: None,
            },
        );

        let mut segment_names = BTreeMap::new();
        segment_names.insert("0".to_string(), "Low".to_string());
        segment_names.insert("1".to_string(), "High".to_string());

        ArtifactBundle {
            encoders,
            scaler: ScalerSpec {
                feature_names: strings(&["Age"]),
                mean: vec![35.0],
                scale: vec![10.0],
            },
            model: ModelSpec {
                cluster_centers: vec![vec![-1.0, 0.0, 0.0], vec![1.0, 1.0, 2.0]],
            },
            feature_cols: strings(&["Age", "Sex", "Saving accounts"]),
            segment_names,
        }
    }

    #[test]
    fn test_from_bundle() {
        let artifacts = Artifacts::from_bundle(create_test_bundle()).unwrap();

        assert_eq!(artifacts.model.n_clusters(), 2);
        assert_eq!(artifacts.order.len(), 3);
        assert!(artifacts.codecs.codec("Saving accounts").unwrap().has_unknown_fallback());
        assert!(!artifacts.codecs.codec("Sex").unwrap().has_unknown_fallback());
        assert_eq!(artifacts.stats.stats("Age"), Some(&NormalizationStats::new(35.0, 10.0)));
        assert_eq!(artifacts.names.get(1), Some("High"));
    }

    #[test]
    fn test_write_then_load_dir() {
        let dir = TempDir::new().unwrap();
        let bundle = create_test_bundle();
        bundle.write_dir(dir.path()).unwrap();

        assert_eq!(ArtifactBundle::read_dir(dir.path()).unwrap(), bundle);
        assert!(Artifacts::load(dir.path()).is_ok());
    }

    #[test]
    fn test_centroid_dimension_must_match_order() {
        let mut bundle = create_test_bundle();
        bundle.feature_cols.push("Duration".to_string());

        let err = Artifacts::from_bundle(bundle).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_codec_field_must_be_in_order() {
        let mut bundle = create_test_bundle();
        bundle.encoders.insert(
            "Housing".to_string(),
            CodecSpec {
                classes: strings(&["own"]),
                has_unknown_fallback: None,
            },
        );
        assert!(matches!(
            Artifacts::from_bundle(bundle),
            Err(Error::InvalidArtifact { .. })
        ));
    }

    #[test]
    fn test_scaler_field_must_be_in_order() {
        let mut bundle = create_test_bundle();
        bundle.scaler.feature_names = strings(&["Duration"]);
        assert!(Artifacts::from_bundle(bundle).is_err());
    }

    #[test]
    fn test_scaler_arrays_must_align() {
        let mut bundle = create_test_bundle();
        bundle.scaler.scale.push(1.0);
        assert!(Artifacts::from_bundle(bundle).is_err());
    }

    #[test]
    fn test_explicit_fallback_requires_unknown_class() {
        let mut bundle = create_test_bundle();
        bundle.encoders.get_mut("Sex").unwrap().has_unknown_fallback = Some(true);

        match Artifacts::from_bundle(bundle) {
            Err(Error::InvalidArtifact { artifact, reason }) => {
                assert_eq!(artifact, ENCODERS_FILE);
                assert!(reason.contains("Sex"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_segment_keys_must_be_ids() {
        let mut bundle = create_test_bundle();
        bundle
            .segment_names
            .insert("first".to_string(), "Oops".to_string());
        assert!(Artifacts::from_bundle(bundle).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        create_test_bundle().write_dir(dir.path()).unwrap();
        fs::write(dir.path().join(MODEL_FILE), "{ not json").unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
