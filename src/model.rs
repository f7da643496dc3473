//! Nearest-centroid cluster assignment for a trained K-Means model

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1};

/// Trained K-Means centroids, one row per cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidModel {
    centroids: Array2<f64>,
}

impl CentroidModel {
    /// Wraps a `(k, dim)` centroid matrix. Fails when k or dim is zero.
    pub fn new(centroids: Array2<f64>) -> Result<Self> {
        if centroids.nrows() == 0 || centroids.ncols() == 0 {
            return Err(Error::invalid_artifact(
                "cluster model",
                format!("empty centroid matrix {:?}", centroids.shape()),
            ));
        }
        Ok(Self { centroids })
    }

    /// Builds the matrix from row vectors, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_clusters = rows.len();
        let dim = rows.first().map(Vec::len).unwrap_or(0);

        let mut flat = Vec::with_capacity(n_clusters * dim);
        for row in rows {
            if row.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            flat.extend(row);
        }

        let centroids = Array2::from_shape_vec((n_clusters, dim), flat)
            .map_err(|e| Error::invalid_artifact("cluster model", e.to_string()))?;
        Self::new(centroids)
    }

    /// Number of clusters
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Dimensionality each input vector must have
    pub fn dim(&self) -> usize {
        self.centroids.ncols()
    }

    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }

    /// Predict cluster for new data point
    pub fn predict(&self, features: &Array1<f64>) -> Result<usize> {
        assign(features.view(), &self.centroids)
    }

    /// Squared distance from `features` to every centroid, in cluster order.
    pub fn distances(&self, features: &Array1<f64>) -> Result<Vec<f64>> {
        check_dim(features.len(), self.dim())?;
        Ok(self
            .centroids
            .outer_iter()
            .map(|centroid| squared_euclidean(&features.view(), &centroid))
            .collect())
    }
}

/// Index of the centroid nearest to `features` by squared Euclidean distance.
///
/// The lowest index wins on ties.
pub fn assign(features: ArrayView1<f64>, centroids: &Array2<f64>) -> Result<usize> {
    check_dim(features.len(), centroids.ncols())?;

    // Find nearest centroid
    let mut min_distance = f64::INFINITY;
    let mut closest_cluster = 0;

    for (cluster_idx, centroid) in centroids.outer_iter().enumerate() {
        let distance = squared_euclidean(&features, &centroid);

        if distance < min_distance {
            min_distance = distance;
            closest_cluster = cluster_idx;
        }
    }

    Ok(closest_cluster)
}

fn check_dim(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Squared Euclidean distance between two points
fn squared_euclidean(point1: &ArrayView1<f64>, point2: &ArrayView1<f64>) -> f64 {
    point1
        .iter()
        .zip(point2.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
}
