use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrepError>;

/// Errors raised while preprocessing a split. All of them abort the run;
/// chunks already flushed stay on disk.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Feature or graph lookup failed for an image id.
    #[error("missing {kind} artifact for image {image_id}: {path}")]
    MissingArtifact {
        kind: &'static str,
        image_id: u64,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An input file is unreadable, unparsable, or missing expected content.
    #[error("malformed input {path}: {reason}")]
    MalformedInput { path: PathBuf, reason: String },

    /// An annotation carries an answer type outside the three known labels.
    #[error("unrecognized answer type {label:?} at annotation {ordinal} (question {question_id})")]
    UnrecognizedCategory {
        label: String,
        ordinal: usize,
        question_id: u64,
    },

    /// Destination directory uncreatable or an artifact write failed.
    #[error("failed to write {path}")]
    StorageWriteFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PrepError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PrepError::MalformedInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        PrepError::StorageWriteFailure {
            path: path.into(),
            source: source.into(),
        }
    }
}
