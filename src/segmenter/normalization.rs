// Raw extracted text cleanup: dehyphenation, furniture removal, transliteration
// and whitespace collapse, in that order.

use regex_automata::meta::Regex;
use tracing::debug;

use super::config::NormalizeOptions;
use super::transliteration::{AsciiFold, Transliterate};
use crate::error::SegmentError;

/// Numbered heading lines such as "3. Results And Discussion".
const HEADING_PATTERN: &str = r"^\d+\.[ \t]+\p{Lu}[\p{L} \t]+$";

/// Bracketed numeric footnote markers such as "[12]".
const FOOTNOTE_PATTERN: &str = r"[ \t]*\[\d+\][ \t]*";

/// Characters that attach to the preceding word once a footnote marker is gone.
const CLOSING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}'];

/// Cleans raw extracted text into a single-spaced stream.
///
/// Lines that look like numbered headings are dropped outright; a prose line
/// that happens to share that shape is lost with them.
pub struct Normalizer {
    heading: Regex,
    footnote: Regex,
    transliterator: Box<dyn Transliterate>,
}

impl Normalizer {
    pub fn new() -> Result<Self, SegmentError> {
        Self::with_transliterator(Box::new(AsciiFold))
    }

    pub fn with_transliterator(transliterator: Box<dyn Transliterate>) -> Result<Self, SegmentError> {
        Ok(Self {
            heading: Regex::new(HEADING_PATTERN)?,
            footnote: Regex::new(FOOTNOTE_PATTERN)?,
            transliterator,
        })
    }

    /// Run the full pipeline with every step enabled.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalize_with(raw, &NormalizeOptions::default())
    }

    pub fn normalize_with(&self, raw: &str, options: &NormalizeOptions) -> String {
        let mut text = if options.dehyphenate {
            dehyphenate(raw)
        } else {
            raw.to_string()
        };

        if options.strip_headings {
            text = self.strip_headings(&text);
        }
        if options.strip_footnotes {
            text = self.strip_footnotes(&text);
        }
        if options.transliterate {
            text = self.transliterator.transliterate(&text);
        }

        let collapsed = collapse_whitespace(&text);
        debug!("Normalized {} raw bytes into {} bytes", raw.len(), collapsed.len());
        collapsed
    }

    fn strip_headings(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut removed = 0usize;
        for line in text.split_inclusive('\n') {
            let content = line.trim();
            if !content.is_empty() && self.heading.is_match(content) {
                removed += 1;
                // Keep the line break so neighbouring lines do not fuse.
                result.push('\n');
                continue;
            }
            result.push_str(line);
        }
        if removed > 0 {
            debug!("Removed {} heading lines", removed);
        }
        result
    }

    fn strip_footnotes(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for marker in self.footnote.find_iter(text) {
            result.push_str(&text[last..marker.start()]);
            if !text[marker.end()..].starts_with(CLOSING_PUNCTUATION) {
                result.push(' ');
            }
            last = marker.end();
        }
        result.push_str(&text[last..]);
        result
    }
}

/// Rejoin words split by a hyphen at a line break: "frag-\nment" becomes "fragment".
/// The hyphen must follow a word character and the whitespace after it must
/// contain a newline and be followed by a word character.
pub fn dehyphenate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '-' && i > 0 && is_word_char(chars[i - 1]) {
            let mut j = i + 1;
            let mut saw_newline = false;
            while j < chars.len() && chars[j].is_whitespace() {
                saw_newline |= chars[j] == '\n' || chars[j] == '\r';
                j += 1;
            }
            if saw_newline && j < chars.len() && is_word_char(chars[j]) {
                i = j;
                continue;
            }
        }
        result.push(ch);
        i += 1;
    }

    result
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Collapse every whitespace run (newlines included) into a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    collapse_whitespace_into(text, &mut result);
    result
}

/// Collapse whitespace into a supplied buffer, clearing it first.
pub fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = !buffer.is_empty();
            continue;
        }
        if pending_space {
            buffer.push(' ');
            pending_space = false;
        }
        buffer.push(ch);
    }
}

/// Count of non-whitespace characters; the size measure for min/max thresholds.
pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Count of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
