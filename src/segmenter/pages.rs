// Page bookkeeping: inline page markers, page marks and offset-to-page lookup

use regex_automata::meta::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SegmentError;

/// Page used when a document carries no page information at all.
pub const DEFAULT_PAGE: u32 = 1;

const MARKER_PATTERN: &str = r"<!-- PAGE \d+ -->";

/// Byte offset in normalized text at which a new source page begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMark {
    pub offset: usize,
    pub page: u32,
}

impl PageMark {
    pub fn new(offset: usize, page: u32) -> Self {
        Self { offset, page }
    }
}

/// Inline marker emitted by source loaders ahead of each page's text.
pub fn page_marker(page: u32) -> String {
    format!("<!-- PAGE {page} -->")
}

/// Check that marks are ordered by strictly increasing offset.
pub fn validate_marks(marks: &[PageMark]) -> Result<(), SegmentError> {
    for pair in marks.windows(2) {
        if pair[1].offset <= pair[0].offset {
            return Err(SegmentError::UnsortedPageMarks {
                previous: pair[0].offset,
                offset: pair[1].offset,
            });
        }
    }
    Ok(())
}

/// Page of the last mark at or before `offset`.
///
/// Offsets before the first mark belong to the first page found in the
/// document; without marks everything is page 1. Binary search, O(log M).
pub fn page_for(offset: usize, marks: &[PageMark]) -> u32 {
    let Some(first) = marks.first() else {
        return DEFAULT_PAGE;
    };
    match marks.partition_point(|mark| mark.offset <= offset) {
        0 => first.page,
        idx => marks[idx - 1].page,
    }
}

/// Strips inline page markers from normalized text.
pub struct PageMarkerExtractor {
    marker: Regex,
}

impl PageMarkerExtractor {
    pub fn new() -> Result<Self, SegmentError> {
        Ok(Self {
            marker: Regex::new(MARKER_PATTERN)?,
        })
    }

    /// Remove `<!-- PAGE n -->` markers from single-spaced text.
    ///
    /// Returns the marker-free text and marks whose offsets point into it.
    /// Markers with no text between them collapse to the last one, and markers
    /// after the final text are dropped. A marker whose number does not fit a
    /// page number is skipped with a warning.
    pub fn extract(&self, text: &str) -> (String, Vec<PageMark>) {
        let mut stripped = String::with_capacity(text.len());
        let mut marks: Vec<PageMark> = Vec::new();
        let mut pending: Option<u32> = None;
        let mut last = 0;

        for found in self.marker.find_iter(text) {
            append_segment(&mut stripped, &text[last..found.start()], &mut pending, &mut marks);
            let marker = &text[found.start()..found.end()];
            match parse_marker_page(marker) {
                Some(page) => pending = Some(page),
                None => warn!("Ignoring page marker with out-of-range page number: {}", marker),
            }
            last = found.end();
        }
        append_segment(&mut stripped, &text[last..], &mut pending, &mut marks);

        (stripped, marks)
    }
}

fn append_segment(
    stripped: &mut String,
    segment: &str,
    pending: &mut Option<u32>,
    marks: &mut Vec<PageMark>,
) {
    let segment = segment.trim();
    if segment.is_empty() {
        return;
    }
    if !stripped.is_empty() {
        stripped.push(' ');
    }
    if let Some(page) = pending.take() {
        marks.push(PageMark::new(stripped.len(), page));
    }
    stripped.push_str(segment);
}

fn parse_marker_page(marker: &str) -> Option<u32> {
    marker
        .trim_start_matches("<!-- PAGE ")
        .trim_end_matches(" -->")
        .parse()
        .ok()
}
