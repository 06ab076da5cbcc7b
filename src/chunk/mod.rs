pub mod reader;
pub mod writer;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// One question joined with its per-image artifacts, ready to persist.
#[derive(Debug, Clone)]
pub struct ProcessedQuestion {
    pub image_feature: ArrayD<f32>,
    pub image_graph: ArrayD<f32>,
    pub q_token_ids: Vec<u32>,
}

/// Totals reported by a finished [`writer::ChunkWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSummary {
    pub num_records: usize,
    pub num_chunks: usize,
}

/// Sidecar JSON written next to the chunks after a successful question run.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChunkManifest {
    pub split: String,
    pub num_questions: usize,
    pub num_chunks: usize,
    pub chunk_size: usize,
    pub q_len: usize,
}
