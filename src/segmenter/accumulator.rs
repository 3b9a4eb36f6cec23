// First pass: greedy accumulation of sentences into drafts of at least min_chars

use tracing::debug;

use super::config::SegmentConfig;
use super::pages::{page_for, PageMark};
use super::{ParagraphDraft, SentenceUnit};

/// Per-draft accumulation state.
#[derive(Debug)]
enum DraftState {
    Empty,
    Accumulating(ParagraphDraft),
}

/// Group sentences into drafts, emitting each draft as soon as its
/// non-whitespace size reaches `min_chars`.
///
/// `max_chars` is not enforced here: a single oversized sentence still forms
/// its own draft. A trailing draft below the floor is emitted as-is.
pub fn accumulate(
    sentences: &[SentenceUnit],
    marks: &[PageMark],
    config: &SegmentConfig,
) -> Vec<ParagraphDraft> {
    let mut drafts = Vec::new();
    let mut state = DraftState::Empty;

    for sentence in sentences {
        let draft = match state {
            DraftState::Empty => {
                let page = page_for(sentence.offset(), marks);
                ParagraphDraft::new(sentence.clone(), page)
            }
            DraftState::Accumulating(mut draft) => {
                draft.push(sentence.clone());
                draft
            }
        };

        state = if draft.char_count() >= config.min_chars {
            drafts.push(draft);
            DraftState::Empty
        } else {
            DraftState::Accumulating(draft)
        };
    }

    if let DraftState::Accumulating(draft) = state {
        drafts.push(draft);
    }

    debug!(
        "Accumulated {} sentences into {} drafts (min_chars={})",
        sentences.len(),
        drafts.len(),
        config.min_chars
    );
    drafts
}
