use crate::error::{PrepError, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const PAD_TOKEN: &str = "<pad>";
pub const UNK_TOKEN: &str = "<unk>";

/// Fixed token-to-id table loaded from a JSON object file. Doubles as the
/// answer dictionary, where only membership matters.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: FxHashMap<String, u32>,
    path: PathBuf,
}

impl Vocabulary {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PrepError::malformed(path, e))?;
        let words: FxHashMap<String, u32> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PrepError::malformed(path, e))?;
        Ok(Self {
            words,
            path: path.to_path_buf(),
        })
    }

    /// Build a vocabulary from in-memory entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            words: entries.into_iter().map(|(w, id)| (w.into(), id)).collect(),
            path: PathBuf::from("<memory>"),
        }
    }

    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.words.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Source file of this vocabulary, used in diagnostics.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
