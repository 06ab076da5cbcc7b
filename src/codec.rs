use crate::analysis::tokenize;
use crate::error::{PrepError, Result};
use crate::vocab::{Vocabulary, PAD_TOKEN, UNK_TOKEN};

/// Maps sentences and raw answer strings onto a fixed vocabulary.
pub struct TokenCodec<'a> {
    vocab: &'a Vocabulary,
    pad_id: Option<u32>,
    unk_id: Option<u32>,
}

impl<'a> TokenCodec<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self {
            vocab,
            pad_id: vocab.id_of(PAD_TOKEN),
            unk_id: vocab.id_of(UNK_TOKEN),
        }
    }

    /// Token ids of a sentence. Words outside the vocabulary map to the
    /// reserved unknown id when the vocabulary defines one, otherwise they
    /// are dropped.
    pub fn encode(&self, sentence: &str) -> Vec<u32> {
        tokenize(sentence)
            .into_iter()
            .filter_map(|t| self.vocab.id_of(&t).or(self.unk_id))
            .collect()
    }

    /// Encode and force the result to exactly `max_len` ids: long sentences
    /// are truncated, short ones right-padded with the reserved padding id.
    pub fn encode_padded(&self, sentence: &str, max_len: usize) -> Result<Vec<u32>> {
        let pad_id = self.pad_id.ok_or_else(|| {
            PrepError::malformed(
                self.vocab.path(),
                format!("vocabulary has no {PAD_TOKEN} token"),
            )
        })?;
        let mut ids = self.encode(sentence);
        ids.truncate(max_len);
        ids.resize(max_len, pad_id);
        Ok(ids)
    }

    /// Vocabulary id of a raw answer string, looked up whole. Multi-word
    /// answers are single vocabulary entries, never re-tokenized.
    pub fn answer_id(&self, answer: &str) -> Option<u32> {
        self.vocab.id_of(answer)
    }
}
