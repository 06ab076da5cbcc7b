//! Serde models of the two split input collections and their loaders.

use crate::error::{PrepError, Result};
use crate::split::Split;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub image_id: u64,
    pub question: String,
    pub question_id: u64,
}

#[derive(Debug, Deserialize)]
struct QuestionFile {
    questions: Vec<QuestionRecord>,
}

/// Rater confidence attached to one human answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerConfidence {
    Yes,
    Maybe,
    No,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAnswer {
    pub answer: String,
    pub answer_confidence: AnswerConfidence,
    pub answer_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationRecord {
    pub question_type: String,
    pub multiple_choice_answer: String,
    pub answers: Vec<RawAnswer>,
    pub image_id: u64,
    pub answer_type: String,
    pub question_id: u64,
}

#[derive(Debug, Deserialize)]
struct AnnotationFile {
    annotations: Vec<AnnotationRecord>,
}

/// Questions of a split, in file order. File order is processing order and
/// decides chunk membership.
pub fn load_questions(vqa_dir: &Path, split: Split) -> Result<Vec<QuestionRecord>> {
    let path = vqa_dir.join(split.question_file());
    let file = File::open(&path).map_err(|e| PrepError::malformed(&path, e))?;
    let parsed: QuestionFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PrepError::malformed(&path, e))?;
    Ok(parsed.questions)
}

/// Annotations of a split, in file order.
pub fn load_annotations(vqa_dir: &Path, split: Split) -> Result<Vec<AnnotationRecord>> {
    let path = vqa_dir.join(split.annotation_file());
    let file = File::open(&path).map_err(|e| PrepError::malformed(&path, e))?;
    let parsed: AnnotationFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PrepError::malformed(&path, e))?;
    Ok(parsed.annotations)
}
