use crate::codec::TokenCodec;
use crate::dataset::RawAnswer;
use crate::error::{PrepError, Result};
use crate::vocab::Vocabulary;
use rkyv::{Archive, Deserialize, Serialize};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Coarse answer category of a question. The three labels are closed;
/// anything else in the input is an error, never a new bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerType {
    YesNo,
    Number,
    Other,
}

impl AnswerType {
    pub const ALL: [AnswerType; 3] = [AnswerType::YesNo, AnswerType::Number, AnswerType::Other];

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "yes/no" => Some(AnswerType::YesNo),
            "number" => Some(AnswerType::Number),
            "other" => Some(AnswerType::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnswerType::YesNo => "yes/no",
            AnswerType::Number => "number",
            AnswerType::Other => "other",
        }
    }
}

/// Frequency-weighted label distributions of a whole split, index-aligned
/// with the source annotation order.
#[derive(Archive, Serialize, Deserialize, Debug, Default, PartialEq)]
#[rkyv(derive(Debug))]
pub struct AnswerData {
    pub distributions: Vec<HashMap<u32, u32>>,
}

/// Annotation ordinals bucketed by answer type, first-seen order.
#[derive(Archive, Serialize, Deserialize, Debug, Default, PartialEq)]
#[rkyv(derive(Debug))]
pub struct AnswerTypeIndex {
    pub yes_no: Vec<u32>,
    pub number: Vec<u32>,
    pub other: Vec<u32>,
}

impl AnswerTypeIndex {
    pub fn record(&mut self, answer_type: AnswerType, ordinal: u32) {
        match answer_type {
            AnswerType::YesNo => self.yes_no.push(ordinal),
            AnswerType::Number => self.number.push(ordinal),
            AnswerType::Other => self.other.push(ordinal),
        }
    }

    pub fn bucket(&self, answer_type: AnswerType) -> &[u32] {
        match answer_type {
            AnswerType::YesNo => &self.yes_no,
            AnswerType::Number => &self.number,
            AnswerType::Other => &self.other,
        }
    }
}

impl AnswerData {
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map_err(|e| PrepError::write(path, e))?;
        write_all(path, &bytes)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_aligned(path)?;
        let archived = rkyv::access::<ArchivedAnswerData, rkyv::rancor::Error>(&bytes)
            .map_err(|e| PrepError::malformed(path, e))?;
        rkyv::deserialize::<AnswerData, rkyv::rancor::Error>(archived)
            .map_err(|e| PrepError::malformed(path, e))
    }
}

impl AnswerTypeIndex {
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map_err(|e| PrepError::write(path, e))?;
        write_all(path, &bytes)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_aligned(path)?;
        let archived = rkyv::access::<ArchivedAnswerTypeIndex, rkyv::rancor::Error>(&bytes)
            .map_err(|e| PrepError::malformed(path, e))?;
        rkyv::deserialize::<AnswerTypeIndex, rkyv::rancor::Error>(archived)
            .map_err(|e| PrepError::malformed(path, e))
    }
}

fn write_all(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|e| PrepError::write(path, e))?;
    file.write_all(bytes).map_err(|e| PrepError::write(path, e))
}

fn read_aligned(path: &Path) -> Result<rkyv::util::AlignedVec> {
    let raw = fs::read(path).map_err(|e| PrepError::malformed(path, e))?;
    let mut bytes = rkyv::util::AlignedVec::new();
    bytes.extend_from_slice(&raw);
    Ok(bytes)
}

/// Count the answer multiset, keep only strings the answer vocabulary
/// accepts, and key the surviving counts by token id.
pub fn build_distribution(
    answers: &[RawAnswer],
    answer_vocab: &Vocabulary,
    codec: &TokenCodec<'_>,
) -> HashMap<u32, u32> {
    let mut counts: FxHashMap<&str, u32> = FxHashMap::default();
    for raw in answers {
        *counts.entry(raw.answer.as_str()).or_insert(0) += 1;
    }

    let mut distribution = HashMap::new();
    for (answer, count) in counts {
        if !answer_vocab.contains(answer) {
            continue;
        }
        match codec.answer_id(answer) {
            Some(id) => {
                *distribution.entry(id).or_insert(0) += count;
            }
            None => warn!(answer, "answer passes the answer vocabulary but has no token id"),
        }
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::AnswerConfidence;
    use std::path::PathBuf;

    fn raw(answer: &str) -> RawAnswer {
        RawAnswer {
            answer: answer.to_string(),
            answer_confidence: AnswerConfidence::Yes,
            answer_id: 1,
        }
    }

    fn temp_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vqa_prep_answers_{tag}_{}", std::process::id()))
    }

    #[test]
    fn counts_survive_only_for_vocabulary_answers() {
        let vocab = Vocabulary::from_entries([("net", 7u32), ("mesh", 8)]);
        let answer_vocab = Vocabulary::from_entries([("net", 0u32)]);
        let codec = TokenCodec::new(&vocab);

        let answers = [raw("net"), raw("net"), raw("mesh")];
        let dist = build_distribution(&answers, &answer_vocab, &codec);
        assert_eq!(dist, HashMap::from([(7, 2)]));
    }

    #[test]
    fn distribution_mass_is_bounded_by_raw_answers() {
        let vocab = Vocabulary::from_entries([("yes", 3u32), ("no", 4)]);
        let answer_vocab = Vocabulary::from_entries([("yes", 0u32), ("no", 1)]);
        let codec = TokenCodec::new(&vocab);

        let answers: Vec<RawAnswer> = ["yes", "yes", "no", "maybe so"]
            .iter()
            .map(|a| raw(a))
            .collect();
        let dist = build_distribution(&answers, &answer_vocab, &codec);
        let mass: u32 = dist.values().sum();
        assert_eq!(mass, 3);
        assert_eq!(dist[&3], 2);
        assert_eq!(dist[&4], 1);
    }

    #[test]
    fn answers_without_token_id_are_skipped() {
        let vocab = Vocabulary::from_entries([("net", 7u32)]);
        let answer_vocab = Vocabulary::from_entries([("net", 0u32), ("mesh", 1)]);
        let codec = TokenCodec::new(&vocab);

        let dist = build_distribution(&[raw("mesh"), raw("net")], &answer_vocab, &codec);
        assert_eq!(dist, HashMap::from([(7, 1)]));
    }

    #[test]
    fn labels_round_trip_through_the_closed_enum() {
        for ty in AnswerType::ALL {
            assert_eq!(AnswerType::from_label(ty.label()), Some(ty));
        }
        assert_eq!(AnswerType::from_label("count"), None);
        assert_eq!(AnswerType::from_label("Yes/No"), None);
    }

    #[test]
    fn index_preserves_first_seen_order() {
        let mut index = AnswerTypeIndex::default();
        index.record(AnswerType::Other, 0);
        index.record(AnswerType::YesNo, 1);
        index.record(AnswerType::Other, 2);
        index.record(AnswerType::Number, 3);

        assert_eq!(index.bucket(AnswerType::Other), &[0, 2]);
        assert_eq!(index.bucket(AnswerType::YesNo), &[1]);
        assert_eq!(index.bucket(AnswerType::Number), &[3]);
    }

    #[test]
    fn answer_data_round_trips_through_disk() {
        let data = AnswerData {
            distributions: vec![
                HashMap::from([(7, 2)]),
                HashMap::new(),
                HashMap::from([(3, 9), (4, 1)]),
            ],
        };
        let path = temp_file("data");
        data.save(&path).unwrap();
        assert_eq!(AnswerData::load(&path).unwrap(), data);
        fs::remove_file(path).ok();
    }

    #[test]
    fn answer_type_index_round_trips_through_disk() {
        let mut index = AnswerTypeIndex::default();
        index.record(AnswerType::YesNo, 5);
        index.record(AnswerType::Number, 6);

        let path = temp_file("index");
        index.save(&path).unwrap();
        assert_eq!(AnswerTypeIndex::load(&path).unwrap(), index);
        fs::remove_file(path).ok();
    }
}
