// Punctuation-driven sentence splitting over normalized text

use std::collections::BTreeSet;
use tracing::debug;

use super::config::{SegmentConfig, SplitMode};
use super::SentenceUnit;

/// Rules deciding where a sentence ends.
#[derive(Debug, Clone)]
pub struct BoundaryRules {
    /// Punctuation that can terminate a sentence.
    pub terminators: Vec<char>,
    /// When set, the next sentence must begin with one of these characters.
    pub sentence_starts: Option<BTreeSet<char>>,
}

impl Default for BoundaryRules {
    fn default() -> Self {
        Self {
            terminators: vec!['.', '!', '?'],
            sentence_starts: None,
        }
    }
}

impl BoundaryRules {
    pub fn for_config(config: &SegmentConfig) -> Self {
        let sentence_starts = match config.mode {
            SplitMode::PageStream => None,
            SplitMode::DocumentStructure => Some(config.sentence_starts.clone()),
        };
        Self {
            sentence_starts,
            ..Self::default()
        }
    }

    fn accepts_start(&self, ch: char) -> bool {
        match &self.sentence_starts {
            Some(starts) => starts.contains(&ch),
            None => true,
        }
    }
}

/// Split text into sentence units in document order.
///
/// A boundary sits right after a terminator that is followed by whitespace
/// (and, with a start alphabet, by a permitted start character). Offsets are
/// byte offsets of each unit's first character. Whitespace-only fragments are
/// dropped; trailing text without a terminator becomes the last unit.
pub fn split_sentences(text: &str, rules: &BoundaryRules) -> Vec<SentenceUnit> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut units = Vec::new();
    let mut start = 0;

    let mut i = 0;
    while i < chars.len() {
        let (pos, ch) = chars[i];
        if rules.terminators.contains(&ch) {
            let mut next = i + 1;
            while next < chars.len() && chars[next].1.is_whitespace() {
                next += 1;
            }
            if next > i + 1 && next < chars.len() && rules.accepts_start(chars[next].1) {
                push_unit(&mut units, text, start, pos + ch.len_utf8());
                start = chars[next].0;
                i = next;
                continue;
            }
        }
        i += 1;
    }
    push_unit(&mut units, text, start, text.len());

    debug!("Split {} bytes into {} sentences", text.len(), units.len());
    units
}

fn push_unit(units: &mut Vec<SentenceUnit>, text: &str, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let span = &text[start..end];
    let trimmed = span.trim_start();
    let offset = start + (span.len() - trimmed.len());
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        return;
    }
    units.push(SentenceUnit::new(trimmed, offset));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(units: &[SentenceUnit]) -> Vec<&str> {
        units.iter().map(|unit| unit.text()).collect()
    }

    fn document_rules() -> BoundaryRules {
        BoundaryRules::for_config(&SegmentConfig::new(10, 20, SplitMode::DocumentStructure))
    }

    #[test]
    fn test_basic_split_with_offsets() {
        let text = "Hello world. This is a test! How are you?";
        let units = split_sentences(text, &BoundaryRules::default());

        assert_eq!(texts(&units), vec!["Hello world.", "This is a test!", "How are you?"]);
        assert_eq!(units[0].offset(), 0);
        assert_eq!(units[1].offset(), 13);
        assert_eq!(units[2].offset(), 29);
        for unit in &units {
            assert_eq!(&text[unit.offset()..unit.offset() + unit.text().len()], unit.text());
        }
    }

    #[test]
    fn test_page_stream_ignores_case() {
        let units = split_sentences("it ended. then more. and more", &BoundaryRules::default());
        assert_eq!(texts(&units), vec!["it ended.", "then more.", "and more"]);
    }

    #[test]
    fn test_document_structure_requires_start_letter() {
        let units = split_sentences("Values like 3.5 vs. other ones. Next one. ok fine.", &document_rules());
        assert_eq!(texts(&units), vec!["Values like 3.5 vs. other ones.", "Next one. ok fine."]);
    }

    #[test]
    fn test_document_structure_uses_configured_alphabet() {
        let text = "Birinci cümle. Şimdi ikinci. Ödev bitti.";
        let units = split_sentences(text, &document_rules());
        assert_eq!(texts(&units), vec!["Birinci cümle.", "Şimdi ikinci.", "Ödev bitti."]);

        let config = SegmentConfig::new(10, 20, SplitMode::DocumentStructure).with_sentence_starts("B");
        let units = split_sentences(text, &BoundaryRules::for_config(&config));
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_punctuation_without_whitespace_is_not_a_boundary() {
        let units = split_sentences("Wait...what? Fine.", &BoundaryRules::default());
        assert_eq!(texts(&units), vec!["Wait...what?", "Fine."]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(split_sentences("", &BoundaryRules::default()).is_empty());
        assert!(split_sentences("   ", &BoundaryRules::default()).is_empty());
    }

    #[test]
    fn test_text_without_terminator_is_one_unit() {
        let text = "a".repeat(2000);
        let units = split_sentences(&text, &BoundaryRules::default());
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text().len(), 2000);
    }

    #[test]
    fn test_multibyte_offsets() {
        let text = "Çok güzel. İyi günler.";
        let units = split_sentences(text, &BoundaryRules::default());
        assert_eq!(texts(&units), vec!["Çok güzel.", "İyi günler."]);
        assert_eq!(&text[units[1].offset()..], "İyi günler.");
    }
}
