use folio::error::{SegmentError, SourceError};
use folio::source::{load_source, PageRange};
use folio::{PageMark, SegmentConfig, Segmenter, SentenceUnit, SplitMode};

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

/// Source bytes that are not UTF-8 are rejected, not segmented
#[tokio::test]
async fn test_invalid_utf8_source() {
    let fixture = TestFixture::new();
    let path = fixture.path("invalid.txt");
    std::fs::write(&path, [0xFF, 0xFE, 0xFD]).expect("Failed to write invalid UTF-8 file");

    for use_mmap in [false, true] {
        let result = load_source(&path, PageRange::default(), use_mmap).await;
        assert!(matches!(result, Err(SourceError::Utf8 { .. })), "use_mmap={use_mmap}");
    }
}

/// A file with a .pdf extension that is not a PDF surfaces as an extraction error
#[tokio::test]
async fn test_corrupt_pdf_source() {
    let fixture = TestFixture::new();
    let path = fixture.create_source_file("broken.pdf", "This is plain text pretending to be a PDF.");

    let result = load_source(&path, PageRange::default(), false).await;
    assert!(matches!(result, Err(SourceError::Pdf { .. })));
}

#[test]
fn test_page_range_syntax_errors() {
    for input in ["x-3", "3-x", "7-2", "-", "0"] {
        let result = input.parse::<PageRange>();
        assert!(matches!(result, Err(SourceError::InvalidPageRange(_))), "'{input}' should be rejected");
    }
}

#[test]
fn test_error_messages_name_the_problem() {
    let not_found = SourceError::NotFound("missing.pdf".into());
    assert_eq!(not_found.to_string(), "source not found: missing.pdf");

    let range = SourceError::PageRange { start: 40, total: 12 };
    assert!(range.to_string().contains("12 pages"));

    let config = SegmentConfig::new(1400, 800, SplitMode::PageStream);
    let error = config.validate().unwrap_err();
    assert!(matches!(error, SegmentError::InvalidConfig(_)));
    assert!(error.to_string().starts_with("invalid configuration"));
}

/// Explicit page marks must arrive sorted and unique
#[test]
fn test_explicit_marks_validated() {
    let segmenter = Segmenter::new().unwrap();
    let sentences = vec![SentenceUnit::new("One sentence here.", 0), SentenceUnit::new("Another.", 19)];
    let config = SegmentConfig::new(5, 20, SplitMode::PageStream);

    let duplicate = [PageMark::new(0, 1), PageMark::new(0, 2)];
    assert!(matches!(
        segmenter.segment_sentences(&sentences, &duplicate, &config),
        Err(SegmentError::UnsortedPageMarks { previous: 0, offset: 0 })
    ));

    let sorted = [PageMark::new(0, 1), PageMark::new(19, 2)];
    let records = segmenter.segment_sentences(&sentences, &sorted, &config).unwrap();
    let pages: Vec<u32> = records.iter().map(|r| r.source_page()).collect();
    assert_eq!(pages, vec![1, 2]);
}

/// Text without any page information attributes everything to page 1
#[test]
fn test_missing_marks_degrade_to_page_one() {
    let segmenter = Segmenter::new().unwrap();
    let config = SegmentConfig::new(5, 30, SplitMode::PageStream);
    let records = segmenter
        .segment("First sentence is here. Second sentence follows. Third one ends it.", &config)
        .unwrap();

    assert!(records.len() > 1);
    assert!(records.iter().all(|r| r.source_page() == 1));
}
