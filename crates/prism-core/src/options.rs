//! Session options.

use crate::cache::OptionsDigest;
use prism_common::limits::MAX_EVALUATION_DEPTH;
use prism_docblock::TagPrioritizer;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReflectorOptions {
    /// Vendor prefix ranks for competing doc tags.
    pub tag_priorities: TagPrioritizer,
    /// Apply the documentation overlay.
    pub doc_comments: bool,
    /// Nesting limit for a single constant expression and for chains of
    /// constants referring to each other.
    pub max_evaluation_depth: u32,
}

impl Default for ReflectorOptions {
    fn default() -> Self {
        Self {
            tag_priorities: TagPrioritizer::default(),
            doc_comments: true,
            max_evaluation_depth: MAX_EVALUATION_DEPTH,
        }
    }
}

impl ReflectorOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Digest of every option that shapes reflected maps.
    pub fn digest(&self) -> OptionsDigest {
        let ranks = self.tag_priorities.ranks();
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(ranks.len() as u64).to_le_bytes());
        for (prefix, rank) in ranks {
            hasher.update(&(prefix.len() as u64).to_le_bytes());
            hasher.update(prefix.as_bytes());
            hasher.update(&rank.to_le_bytes());
        }
        hasher.update(&[u8::from(self.doc_comments)]);
        hasher.update(&self.max_evaluation_depth.to_le_bytes());
        OptionsDigest::from(hasher.finalize())
    }
}
