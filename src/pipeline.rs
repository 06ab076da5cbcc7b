use crate::answers::{build_distribution, AnswerData, AnswerType, AnswerTypeIndex};
use crate::chunk::writer::ChunkWriter;
use crate::chunk::{ChunkManifest, ChunkSummary, ProcessedQuestion};
use crate::codec::TokenCodec;
use crate::dataset::{load_annotations, load_questions};
use crate::error::{PrepError, Result};
use crate::features::FeatureStore;
use crate::split::Split;
use crate::vocab::Vocabulary;
use std::fs;
use std::path::Path;
use tracing::info;

/// Stream the split's questions in file order, join each with its image
/// feature and graph arrays, encode the sentence to exactly `q_len` token
/// ids and persist the results in bounded chunks under `dest_dir/vqa/`.
///
/// Any missing artifact, malformed input or failed write aborts the run;
/// chunks flushed before the failure stay on disk.
pub fn process_questions(
    split: Split,
    vocab: &Vocabulary,
    q_len: usize,
    vqa_dir: &Path,
    store: &FeatureStore,
    dest_dir: &Path,
) -> Result<ChunkSummary> {
    info!(%split, q_len, "preprocessing questions");
    let questions = load_questions(vqa_dir, split)?;
    let codec = TokenCodec::new(vocab);

    let out_dir = dest_dir.join("vqa");
    let prefix = format!("{}_questions", split.prefix());
    let mut writer = ChunkWriter::new(&out_dir, &prefix, split.chunk_size())?;

    for question in &questions {
        let (feature, graph) = store.load(split, question.image_id)?;
        let q_token_ids = codec.encode_padded(&question.question, q_len)?;
        writer.add(ProcessedQuestion {
            image_feature: feature,
            image_graph: graph,
            q_token_ids,
        })?;
    }

    let summary = writer.finish()?;
    write_manifest(&out_dir, split, q_len, &summary)?;
    info!(
        %split,
        records = summary.num_records,
        chunks = summary.num_chunks,
        "questions done"
    );
    Ok(summary)
}

fn write_manifest(out_dir: &Path, split: Split, q_len: usize, summary: &ChunkSummary) -> Result<()> {
    let manifest = ChunkManifest {
        split: split.label().to_string(),
        num_questions: summary.num_records,
        num_chunks: summary.num_chunks,
        chunk_size: split.chunk_size(),
        q_len,
    };
    let path = out_dir.join(format!("{}_questions-manifest.json", split.prefix()));
    let json = serde_json::to_string_pretty(&manifest).map_err(|e| PrepError::write(&path, e))?;
    fs::write(&path, json).map_err(|e| PrepError::write(&path, e))
}

/// Aggregate each annotation's human answers into a vocabulary-restricted
/// frequency distribution, index-aligned with the annotation order, and
/// bucket every annotation ordinal by answer type. The answer-type index is
/// persisted for the validation split only, at the parent of the per-split
/// directory.
pub fn process_answers(
    split: Split,
    vocab: &Vocabulary,
    answer_vocab: &Vocabulary,
    vqa_dir: &Path,
    dest_dir: &Path,
) -> Result<()> {
    info!(%split, "preprocessing answers");
    let annotations = load_annotations(vqa_dir, split)?;
    let codec = TokenCodec::new(vocab);

    let mut data = AnswerData {
        distributions: Vec::with_capacity(annotations.len()),
    };
    let mut type_index = AnswerTypeIndex::default();

    for (ordinal, annotation) in annotations.iter().enumerate() {
        let answer_type = AnswerType::from_label(&annotation.answer_type).ok_or_else(|| {
            PrepError::UnrecognizedCategory {
                label: annotation.answer_type.clone(),
                ordinal,
                question_id: annotation.question_id,
            }
        })?;
        data.distributions
            .push(build_distribution(&annotation.answers, answer_vocab, &codec));
        type_index.record(answer_type, ordinal as u32);
    }

    let out_dir = dest_dir.join("vqa");
    fs::create_dir_all(&out_dir).map_err(|e| PrepError::write(&out_dir, e))?;
    let answers_path = out_dir.join(format!("{}_answers", split.prefix()));
    data.save(&answers_path)?;
    info!(
        %split,
        annotations = data.distributions.len(),
        path = %answers_path.display(),
        "answers saved"
    );

    if split == Split::Val {
        let index_path = dest_dir.join("vqa_answer_types");
        type_index.save(&index_path)?;
        info!(path = %index_path.display(), "answer type index saved");
    }
    Ok(())
}
