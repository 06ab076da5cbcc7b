use crate::error::{PrepError, Result};
use crate::split::Split;
use ndarray::ArrayD;
use ndarray_npy::NpzReader;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only lookup of per-image artifacts: a dense visual feature array and
/// a relationship-graph array, stored as npz under two parallel roots.
pub struct FeatureStore {
    feature_dir: PathBuf,
    graph_dir: PathBuf,
}

impl FeatureStore {
    pub fn new(feature_dir: impl Into<PathBuf>, graph_dir: impl Into<PathBuf>) -> Self {
        Self {
            feature_dir: feature_dir.into(),
            graph_dir: graph_dir.into(),
        }
    }

    /// Both arrays for one image. An absent or unreadable artifact aborts the
    /// run; there is no zero-fill fallback.
    pub fn load(&self, split: Split, image_id: u64) -> Result<(ArrayD<f32>, ArrayD<f32>)> {
        let key = split.image_key(image_id);
        let feature = read_member(&self.feature_dir.join(&key), "x", "feature", image_id)?;
        let graph = read_member(&self.graph_dir.join(&key), "graph", "graph", image_id)?;
        Ok((feature, graph))
    }
}

fn read_member(
    path: &Path,
    member: &str,
    kind: &'static str,
    image_id: u64,
) -> Result<ArrayD<f32>> {
    let missing = |source: Box<dyn std::error::Error + Send + Sync>| PrepError::MissingArtifact {
        kind,
        image_id,
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| missing(Box::new(e)))?;
    let mut npz = NpzReader::new(file).map_err(|e| missing(Box::new(e)))?;
    npz.by_name(member)
        .or_else(|_| npz.by_name(&format!("{member}.npy")))
        .map_err(|e| missing(Box::new(e)))
}
