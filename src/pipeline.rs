//! End-to-end prediction: raw record to (cluster id, segment name)

use crate::artifacts::Artifacts;
use crate::assembler::assemble;
use crate::error::{Error, Result};
use crate::record::CustomerRecord;
use ndarray::Array1;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Result of a single prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub cluster_id: usize,
    pub segment_name: String,
}

/// Inference session over one validated artifact set.
///
/// Holds no mutable state, so a shared reference can serve any number of
/// concurrent predictions.
#[derive(Debug, Clone)]
pub struct Segmenter {
    artifacts: Artifacts,
}

impl Segmenter {
    pub fn new(artifacts: Artifacts) -> Self {
        Self { artifacts }
    }

    /// Loads and validates the artifact directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Artifacts::load(dir).map(Self::new)
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn n_clusters(&self) -> usize {
        self.artifacts.model.n_clusters()
    }

    /// Model input vector for `record`, in feature order.
    pub fn transform(&self, record: &CustomerRecord) -> Result<Array1<f64>> {
        let a = &self.artifacts;
        assemble(record, &a.codecs, &a.stats, &a.order)
    }

    pub fn predict(&self, record: &CustomerRecord) -> Result<Prediction> {
        let features = self.transform(record)?;
        let cluster_id = self.artifacts.model.predict(&features)?;
        let segment_name = self.artifacts.names.resolve(cluster_id);

        tracing::debug!(cluster_id, segment = %segment_name, "assigned record");

        Ok(Prediction {
            cluster_id,
            segment_name,
        })
    }

    /// Predicts every record, stopping at the first failure.
    ///
    /// Failures carry the 1-based position of the offending record.
    pub fn predict_batch<'a, I>(&self, records: I) -> Result<Vec<Prediction>>
    where
        I: IntoIterator<Item = &'a CustomerRecord>,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                self.predict(record).map_err(|e| Error::Record {
                    row: i + 1,
                    source: Box::new(e),
                })
            })
            .collect()
    }
}

/// Lazily loaded [`Segmenter`] that can be shared across threads.
///
/// The first successful load is kept for the lifetime of the value; callers
/// racing on first use block until that load finishes and all observe the
/// same instance. A failed load is not cached.
#[derive(Debug)]
pub struct SharedSegmenter {
    dir: PathBuf,
    cell: OnceLock<Segmenter>,
    load_lock: Mutex<()>,
}

impl SharedSegmenter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cell: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<&Segmenter> {
        if let Some(segmenter) = self.cell.get() {
            return Ok(segmenter);
        }

        let _guard = self.load_lock.lock();
        if let Some(segmenter) = self.cell.get() {
            return Ok(segmenter);
        }

        let segmenter = Segmenter::load(&self.dir)?;
        Ok(self.cell.get_or_init(|| segmenter))
    }

    pub fn predict(&self, record: &CustomerRecord) -> Result<Prediction> {
        self.get()?.predict(record)
    }
}
