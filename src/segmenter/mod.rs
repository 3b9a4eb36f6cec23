// Segmentation engine: raw extracted text in, bounded sentence-clean paragraphs out.
//
// normalize -> strip page markers -> split sentences -> accumulate -> merge -> build records

use tracing::info;

pub mod accumulator;
pub mod config;
pub mod merger;
pub mod normalization;
pub mod pages;
pub mod records;
pub mod sentence_splitter;
pub mod transliteration;

pub use accumulator::accumulate;
pub use config::{NormalizeOptions, SegmentConfig, SizeEstimate, SplitMode};
pub use merger::merge;
pub use normalization::Normalizer;
pub use pages::{page_for, PageMark, PageMarkerExtractor};
pub use records::{build_records, ParagraphRecord};
pub use sentence_splitter::{split_sentences, BoundaryRules};
pub use transliteration::{AsciiFold, Passthrough, Transliterate};

use crate::error::SegmentError;
use normalization::{non_whitespace_len, word_count};

/// One sentence of normalized text and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceUnit {
    text: String,
    offset: usize,
}

impl SentenceUnit {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Non-whitespace character count.
    pub fn char_count(&self) -> usize {
        non_whitespace_len(&self.text)
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

/// In-progress paragraph: an ordered, never-empty run of sentences.
///
/// The page is fixed when the draft is created and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphDraft {
    sentences: Vec<SentenceUnit>,
    page: u32,
    char_count: usize,
    word_count: usize,
}

impl ParagraphDraft {
    pub fn new(first: SentenceUnit, page: u32) -> Self {
        let mut draft = Self {
            sentences: Vec::new(),
            page,
            char_count: 0,
            word_count: 0,
        };
        draft.push(first);
        draft
    }

    pub(crate) fn push(&mut self, sentence: SentenceUnit) {
        self.char_count += sentence.char_count();
        self.word_count += sentence.word_count();
        self.sentences.push(sentence);
    }

    pub fn sentences(&self) -> &[SentenceUnit] {
        &self.sentences
    }

    pub fn first_sentence(&self) -> &SentenceUnit {
        &self.sentences[0]
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Detach the first sentence; the rest, if any, becomes a new draft whose
    /// page is that of its own first sentence.
    pub(crate) fn split_first(mut self, marks: &[PageMark]) -> (SentenceUnit, Option<ParagraphDraft>) {
        let first = self.sentences.remove(0);
        let mut rest = self.sentences.into_iter();
        let Some(head) = rest.next() else {
            return (first, None);
        };
        let page = page_for(head.offset(), marks);
        let mut remainder = ParagraphDraft::new(head, page);
        for sentence in rest {
            remainder.push(sentence);
        }
        (first, Some(remainder))
    }

    /// Sentences joined by single spaces, written into a reusable buffer.
    pub fn text_into<'b>(&self, buffer: &'b mut String) -> &'b str {
        buffer.clear();
        for (index, sentence) in self.sentences.iter().enumerate() {
            if index > 0 {
                buffer.push(' ');
            }
            buffer.push_str(sentence.text());
        }
        buffer
    }

    pub fn text(&self) -> String {
        let mut buffer = String::new();
        self.text_into(&mut buffer);
        buffer
    }
}

/// Intermediate products of one segmentation run, exposed for inspection.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub normalized: String,
    pub marks: Vec<PageMark>,
    pub sentences: Vec<SentenceUnit>,
    pub records: Vec<ParagraphRecord>,
}

/// The segmentation engine.
///
/// Holds only compiled patterns and the transliterator; thresholds and mode
/// arrive with every call, so one instance serves any number of configurations.
pub struct Segmenter {
    normalizer: Normalizer,
    markers: PageMarkerExtractor,
}

impl Segmenter {
    pub fn new() -> Result<Self, SegmentError> {
        Ok(Self {
            normalizer: Normalizer::new()?,
            markers: PageMarkerExtractor::new()?,
        })
    }

    pub fn with_transliterator(transliterator: Box<dyn Transliterate>) -> Result<Self, SegmentError> {
        Ok(Self {
            normalizer: Normalizer::with_transliterator(transliterator)?,
            markers: PageMarkerExtractor::new()?,
        })
    }

    /// Segment raw text (optionally carrying `<!-- PAGE n -->` markers) into records.
    pub fn segment(&self, raw: &str, config: &SegmentConfig) -> Result<Vec<ParagraphRecord>, SegmentError> {
        Ok(self.segment_detailed(raw, config)?.records)
    }

    /// Like [`Segmenter::segment`], also returning the normalized text, page marks and sentences.
    pub fn segment_detailed(&self, raw: &str, config: &SegmentConfig) -> Result<Segmentation, SegmentError> {
        config.validate()?;

        let normalized = self.normalizer.normalize_with(raw, &config.normalize);
        let (text, marks) = self.markers.extract(&normalized);
        let sentences = split_sentences(&text, &BoundaryRules::for_config(config));
        let records = self.segment_sentences(&sentences, &marks, config)?;

        info!(
            mode = config.mode.as_str(),
            sentences = sentences.len(),
            pages = marks.len(),
            paragraphs = records.len(),
            "Segmentation complete"
        );

        Ok(Segmentation {
            normalized: text,
            marks,
            sentences,
            records,
        })
    }

    /// Run accumulation, merging and record building over pre-split sentences.
    pub fn segment_sentences(
        &self,
        sentences: &[SentenceUnit],
        marks: &[PageMark],
        config: &SegmentConfig,
    ) -> Result<Vec<ParagraphRecord>, SegmentError> {
        config.validate()?;
        pages::validate_marks(marks)?;

        let drafts = accumulate(sentences, marks, config);
        let merged = merge(drafts, marks, config);
        Ok(build_records(merged))
    }
}
