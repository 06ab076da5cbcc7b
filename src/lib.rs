//! Preprocessing pipelines that turn a VQA split (question/annotation JSON
//! plus per-image feature and graph arrays) into chunked numeric artifacts
//! for a downstream model.

pub mod analysis;
pub mod answers;
pub mod chunk;
pub mod codec;
pub mod dataset;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod split;
pub mod vocab;

pub use error::{PrepError, Result};
pub use pipeline::{process_answers, process_questions};
pub use split::Split;
