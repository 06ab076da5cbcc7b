use std::fmt;

pub const TRAIN_CHUNK_SIZE: usize = 2_000;
pub const VAL_CHUNK_SIZE: usize = 1_000;

/// Dataset partition. Train and val differ in input file names, artifact
/// prefix and chunk size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Split {
    Train,
    Val,
}

impl Split {
    pub fn label(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Split::Train => "train2014",
            Split::Val => "val2014",
        }
    }

    pub fn chunk_size(self) -> usize {
        match self {
            Split::Train => TRAIN_CHUNK_SIZE,
            Split::Val => VAL_CHUNK_SIZE,
        }
    }

    pub fn question_file(self) -> String {
        format!("v2_OpenEnded_mscoco_{}_questions.json", self.prefix())
    }

    pub fn annotation_file(self) -> String {
        format!("v2_mscoco_{}_annotations.json", self.prefix())
    }

    /// Relative path of the per-image artifact, shared by the feature and
    /// graph stores.
    pub fn image_key(self, image_id: u64) -> String {
        format!("{p}/COCO_{p}_{image_id:012}.npz", p = self.prefix())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
