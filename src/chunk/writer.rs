use crate::chunk::{ChunkSummary, ProcessedQuestion};
use crate::error::{PrepError, Result};
use ndarray::{stack, Array2, ArrayD, Axis};
use ndarray_npy::NpzWriter;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Buffered chunk accumulator. Records flush as one chunk file whenever the
/// buffer reaches `chunk_size`; `finish` flushes the shorter trailing chunk.
/// The running counters live here, not in any caller's loop.
pub struct ChunkWriter {
    dir: PathBuf,
    prefix: String,
    chunk_size: usize,
    buffer: Vec<ProcessedQuestion>,
    next_chunk: usize,
    records_written: usize,
}

impl ChunkWriter {
    pub fn new(dir: &Path, prefix: &str, chunk_size: usize) -> Result<Self> {
        assert!(chunk_size >= 1, "chunk_size must be at least 1");
        fs::create_dir_all(dir).map_err(|e| PrepError::write(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            chunk_size,
            buffer: Vec::new(),
            next_chunk: 0,
            records_written: 0,
        })
    }

    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}-chunk_{}", self.prefix, index))
    }

    pub fn add(&mut self, record: ProcessedQuestion) -> Result<()> {
        self.buffer.push(record);
        if self.buffer.len() == self.chunk_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush the trailing partial chunk, if any, and report totals. An empty
    /// run writes no chunk at all.
    pub fn finish(mut self) -> Result<ChunkSummary> {
        if !self.buffer.is_empty() {
            self.flush()?;
        }
        Ok(ChunkSummary {
            num_records: self.records_written,
            num_chunks: self.next_chunk,
        })
    }

    fn flush(&mut self) -> Result<()> {
        let path = self.chunk_path(self.next_chunk);
        let records = std::mem::take(&mut self.buffer);
        info!(
            chunk = self.next_chunk,
            records = records.len(),
            path = %path.display(),
            "flushing chunk"
        );
        write_chunk(&path, &records)?;
        self.records_written += records.len();
        self.next_chunk += 1;
        Ok(())
    }
}

/// Persist one ordered chunk as an npz of three stacked arrays. The archive
/// is written to a temp sibling and renamed, so a chunk file appears complete
/// or not at all.
fn write_chunk(path: &Path, records: &[ProcessedQuestion]) -> Result<()> {
    let feature_views: Vec<_> = records.iter().map(|r| r.image_feature.view()).collect();
    let features = stack(Axis(0), &feature_views)
        .map_err(|e| PrepError::malformed(path, format!("inconsistent feature shapes: {e}")))?;

    let graph_views: Vec<_> = records.iter().map(|r| r.image_graph.view()).collect();
    let graphs = stack(Axis(0), &graph_views)
        .map_err(|e| PrepError::malformed(path, format!("inconsistent graph shapes: {e}")))?;

    let q_len = records[0].q_token_ids.len();
    let flat: Vec<u32> = records
        .iter()
        .flat_map(|r| r.q_token_ids.iter().copied())
        .collect();
    let token_ids = Array2::from_shape_vec((records.len(), q_len), flat)
        .map_err(|e| PrepError::malformed(path, format!("ragged token id rows: {e}")))?;

    let tmp = tmp_path(path);
    write_npz(&tmp, &features, &graphs, &token_ids).map_err(|e| PrepError::write(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| PrepError::write(path, e))
}

fn write_npz(
    path: &Path,
    features: &ArrayD<f32>,
    graphs: &ArrayD<f32>,
    token_ids: &Array2<u32>,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = File::create(path)?;
    let mut npz = NpzWriter::new_compressed(BufWriter::new(file));
    npz.add_array("features", features)?;
    npz.add_array("graphs", graphs)?;
    npz.add_array("token_ids", token_ids)?;
    npz.finish()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::reader::read_chunk;
    use ndarray::IxDyn;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("vqa_prep_writer_{tag}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn record(id: u32) -> ProcessedQuestion {
        ProcessedQuestion {
            image_feature: ArrayD::from_elem(IxDyn(&[2, 3]), id as f32),
            image_graph: ArrayD::from_elem(IxDyn(&[2, 2]), id as f32 * 10.0),
            q_token_ids: vec![id, id + 1, 0],
        }
    }

    #[test]
    fn five_records_at_chunk_size_two_make_three_chunks() {
        let dir = temp_dir("five");
        let mut writer = ChunkWriter::new(&dir, "train2014_questions", 2).unwrap();
        for id in 0..5 {
            writer.add(record(id)).unwrap();
        }
        let path_of = |i| dir.join(format!("train2014_questions-chunk_{i}"));
        let summary = writer.finish().unwrap();

        assert_eq!(
            summary,
            ChunkSummary {
                num_records: 5,
                num_chunks: 3
            }
        );
        assert!(path_of(0).exists());
        assert!(path_of(2).exists());
        assert!(!path_of(3).exists());

        // concatenating chunks in index order reproduces the input order
        let mut seen = Vec::new();
        for i in 0..3 {
            let contents = read_chunk(&path_of(i)).unwrap();
            for row in contents.token_ids.rows() {
                seen.push(row[0]);
            }
        }
        assert_eq!(seen, [0, 1, 2, 3, 4]);

        // the final chunk is the short one
        assert_eq!(read_chunk(&path_of(2)).unwrap().len(), 1);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn exact_multiple_writes_no_trailing_chunk() {
        let dir = temp_dir("exact");
        let mut writer = ChunkWriter::new(&dir, "val2014_questions", 2).unwrap();
        for id in 0..4 {
            writer.add(record(id)).unwrap();
        }
        let summary = writer.finish().unwrap();
        assert_eq!(
            summary,
            ChunkSummary {
                num_records: 4,
                num_chunks: 2
            }
        );
        assert!(!dir.join("val2014_questions-chunk_2").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn empty_input_writes_zero_chunks() {
        let dir = temp_dir("empty");
        let writer = ChunkWriter::new(&dir, "train2014_questions", 2).unwrap();
        let summary = writer.finish().unwrap();
        assert_eq!(
            summary,
            ChunkSummary {
                num_records: 0,
                num_chunks: 0
            }
        );
        assert!(!dir.join("train2014_questions-chunk_0").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn chunk_round_trips_stacked_arrays() {
        let dir = temp_dir("roundtrip");
        let mut writer = ChunkWriter::new(&dir, "train2014_questions", 10).unwrap();
        writer.add(record(1)).unwrap();
        writer.add(record(2)).unwrap();
        writer.finish().unwrap();

        let contents = read_chunk(&dir.join("train2014_questions-chunk_0")).unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents.features.shape(), &[2, 2, 3]);
        assert_eq!(contents.graphs.shape(), &[2, 2, 2]);
        assert_eq!(contents.features[[1, 0, 0]], 2.0);
        assert_eq!(contents.graphs[[0, 1, 1]], 10.0);
        assert_eq!(contents.token_ids.row(1).to_vec(), vec![2, 3, 0]);

        // no temp leftovers once the rename landed
        assert!(!dir.join("train2014_questions-chunk_0.tmp").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn mismatched_feature_shapes_are_rejected() {
        let dir = temp_dir("ragged");
        let mut writer = ChunkWriter::new(&dir, "train2014_questions", 2).unwrap();
        writer.add(record(0)).unwrap();
        let mut odd = record(1);
        odd.image_feature = ArrayD::from_elem(IxDyn(&[4, 3]), 0.0);
        let err = writer.add(odd).unwrap_err();
        assert!(matches!(err, PrepError::MalformedInput { .. }));
        fs::remove_dir_all(dir).ok();
    }
}
