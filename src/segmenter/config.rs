use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::SegmentError;

/// Default soft floor for paragraph size in non-whitespace characters.
pub const DEFAULT_MIN_CHARS: usize = 800;

/// Default ceiling for paragraph size in non-whitespace characters.
pub const DEFAULT_MAX_CHARS: usize = 1400;

/// Empirical average word length used by the word-count size heuristic.
pub const AVERAGE_WORD_LENGTH: usize = 6;

/// Uppercase letters recognised as sentence starts in document-structure mode.
pub const DEFAULT_SENTENCE_STARTS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZİĞÜŞÖÇ";

/// How sentence boundaries are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Any terminal punctuation followed by whitespace ends a sentence.
    PageStream,
    /// Terminal punctuation followed by whitespace ends a sentence only when the
    /// next character belongs to the sentence-start alphabet.
    DocumentStructure,
}

impl SplitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::PageStream => "page_stream",
            SplitMode::DocumentStructure => "document_structure",
        }
    }
}

/// How the merger estimates the size of a candidate merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SizeEstimate {
    /// Exact non-whitespace character count.
    Exact,
    /// `word_count * average_word_length` as a second gate after the exact
    /// count. It can only reject merges the exact count admits, so the
    /// `max_chars` ceiling holds under either estimate. There is no
    /// heuristic-only mode.
    WordHeuristic { average_word_length: usize },
}

impl SizeEstimate {
    pub fn word_heuristic() -> Self {
        SizeEstimate::WordHeuristic {
            average_word_length: AVERAGE_WORD_LENGTH,
        }
    }

    /// Returns true when a merged paragraph of the given size fits `max_chars`.
    /// The bound is inclusive.
    pub fn fits(&self, char_count: usize, word_count: usize, max_chars: usize) -> bool {
        let exact = char_count <= max_chars;
        match *self {
            SizeEstimate::Exact => exact,
            SizeEstimate::WordHeuristic { average_word_length } => {
                exact && word_count.saturating_mul(average_word_length) <= max_chars
            }
        }
    }
}

/// Normalizer pipeline switches. Whitespace collapse always runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub dehyphenate: bool,
    pub strip_headings: bool,
    pub strip_footnotes: bool,
    pub transliterate: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            dehyphenate: true,
            strip_headings: true,
            strip_footnotes: true,
            transliterate: true,
        }
    }
}

/// Per-invocation segmentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentConfig {
    pub min_chars: usize,
    pub max_chars: usize,
    pub mode: SplitMode,
    pub sentence_starts: BTreeSet<char>,
    pub size_estimate: SizeEstimate,
    pub normalize: NormalizeOptions,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
            mode: SplitMode::PageStream,
            sentence_starts: DEFAULT_SENTENCE_STARTS.chars().collect(),
            size_estimate: SizeEstimate::Exact,
            normalize: NormalizeOptions::default(),
        }
    }
}

impl SegmentConfig {
    pub fn new(min_chars: usize, max_chars: usize, mode: SplitMode) -> Self {
        Self {
            min_chars,
            max_chars,
            mode,
            ..Self::default()
        }
    }

    pub fn with_sentence_starts(mut self, starts: &str) -> Self {
        self.sentence_starts = starts.chars().filter(|c| !c.is_whitespace()).collect();
        self
    }

    pub fn with_size_estimate(mut self, size_estimate: SizeEstimate) -> Self {
        self.size_estimate = size_estimate;
        self
    }

    /// Reject settings that would loop or emit unbounded paragraphs.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.min_chars == 0 || self.max_chars == 0 {
            return Err(SegmentError::InvalidConfig(format!(
                "thresholds must be positive (min_chars={}, max_chars={})",
                self.min_chars, self.max_chars
            )));
        }
        if self.min_chars >= self.max_chars {
            return Err(SegmentError::InvalidConfig(format!(
                "min_chars ({}) must be smaller than max_chars ({})",
                self.min_chars, self.max_chars
            )));
        }
        if self.mode == SplitMode::DocumentStructure && self.sentence_starts.is_empty() {
            return Err(SegmentError::InvalidConfig(
                "document-structure mode needs at least one sentence-start character".to_string(),
            ));
        }
        if let SizeEstimate::WordHeuristic { average_word_length: 0 } = self.size_estimate {
            return Err(SegmentError::InvalidConfig(
                "average_word_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
