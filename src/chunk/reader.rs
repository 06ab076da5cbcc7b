use crate::error::{PrepError, Result};
use ndarray::{Array2, ArrayD};
use ndarray_npy::NpzReader;
use std::fs::File;
use std::path::Path;

/// Arrays of one chunk file, row-aligned across the three members.
#[derive(Debug)]
pub struct ChunkContents {
    pub features: ArrayD<f32>,
    pub graphs: ArrayD<f32>,
    pub token_ids: Array2<u32>,
}

impl ChunkContents {
    pub fn len(&self) -> usize {
        self.token_ids.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load one chunk back from disk.
pub fn read_chunk(path: &Path) -> Result<ChunkContents> {
    let file = File::open(path).map_err(|e| PrepError::malformed(path, e))?;
    let mut npz = NpzReader::new(file).map_err(|e| PrepError::malformed(path, e))?;

    let features: ArrayD<f32> = npz
        .by_name("features")
        .or_else(|_| npz.by_name("features.npy"))
        .map_err(|e| PrepError::malformed(path, e))?;
    let graphs: ArrayD<f32> = npz
        .by_name("graphs")
        .or_else(|_| npz.by_name("graphs.npy"))
        .map_err(|e| PrepError::malformed(path, e))?;
    let token_ids: Array2<u32> = npz
        .by_name("token_ids")
        .or_else(|_| npz.by_name("token_ids.npy"))
        .map_err(|e| PrepError::malformed(path, e))?;

    Ok(ChunkContents {
        features,
        graphs,
        token_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_chunk_is_malformed_input() {
        let err = read_chunk(Path::new("/nonexistent/chunk_0")).unwrap_err();
        assert!(matches!(err, PrepError::MalformedInput { .. }));
    }
}
