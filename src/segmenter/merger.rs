// Second pass: forward merge of adjacent drafts up to max_chars

use std::collections::VecDeque;
use tracing::debug;

use super::config::SegmentConfig;
use super::pages::PageMark;
use super::ParagraphDraft;

/// Fold drafts forward one sentence at a time while the result fits `max_chars`.
///
/// Pending drafts live in a FIFO work queue. When the buffer absorbs the first
/// sentence of the next draft, the rest of that draft goes back to the front
/// of the queue so it is considered on the next step, on the page of its own
/// first sentence. A buffer is only flushed
/// once it holds at least `min_chars`; below the floor it keeps absorbing even
/// past the ceiling, which bounds any overshoot by a single sentence.
pub fn merge(drafts: Vec<ParagraphDraft>, marks: &[PageMark], config: &SegmentConfig) -> Vec<ParagraphDraft> {
    let input_len = drafts.len();
    let mut queue: VecDeque<ParagraphDraft> = drafts.into();
    let mut output = Vec::with_capacity(input_len);
    let mut buffer: Option<ParagraphDraft> = None;
    let mut split_count = 0usize;

    while let Some(next) = queue.pop_front() {
        let Some(mut current) = buffer.take() else {
            buffer = Some(next);
            continue;
        };

        let candidate = next.first_sentence();
        let fits = config.size_estimate.fits(
            current.char_count() + candidate.char_count(),
            current.word_count() + candidate.word_count(),
            config.max_chars,
        );

        if fits || current.char_count() < config.min_chars {
            let (first, remainder) = next.split_first(marks);
            current.push(first);
            if let Some(remainder) = remainder {
                split_count += 1;
                queue.push_front(remainder);
            }
            buffer = Some(current);
        } else {
            output.push(current);
            buffer = Some(next);
        }
    }

    if let Some(current) = buffer {
        output.push(current);
    }

    debug!(
        "Merged {} drafts into {} paragraphs ({} drafts split, max_chars={})",
        input_len,
        output.len(),
        split_count,
        config.max_chars
    );
    output
}
