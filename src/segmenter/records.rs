use serde::{Deserialize, Serialize};

use super::normalization::{collapse_whitespace, non_whitespace_len, word_count};
use super::ParagraphDraft;

/// Prefix of every paragraph identifier; the suffix is the 1-based ordinal.
pub const PARAGRAPH_ID_PREFIX: &str = "para_";

/// Final, immutable paragraph produced by the segmentation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    #[serde(rename = "paragraph_id")]
    id: String,
    content: String,
    char_count: usize,
    word_count: usize,
    source_page: u32,
}

impl ParagraphRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn source_page(&self) -> u32 {
        self.source_page
    }

    /// Numeric suffix of a `para_N` identifier.
    pub fn ordinal(&self) -> Option<u64> {
        parse_ordinal(&self.id)
    }
}

/// Parse the ordinal out of a `para_N` identifier.
pub fn parse_ordinal(id: &str) -> Option<u64> {
    id.strip_prefix(PARAGRAPH_ID_PREFIX)?.parse().ok()
}

/// Finalize drafts into records with sequential identifiers.
pub fn build_records(drafts: Vec<ParagraphDraft>) -> Vec<ParagraphRecord> {
    let mut buffer = String::new();
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            let content = collapse_whitespace(&draft.text_into(&mut buffer));
            ParagraphRecord {
                id: format!("{PARAGRAPH_ID_PREFIX}{}", index + 1),
                char_count: non_whitespace_len(&content),
                word_count: word_count(&content),
                source_page: draft.page(),
                content,
            }
        })
        .collect()
}
