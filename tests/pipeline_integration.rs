use folio::error::SourceError;
use folio::report::SegmentationReport;
use folio::source::{load_source, PageRange, SourceKind};
use folio::{SegmentConfig, Segmenter, SplitMode};

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::{tokens, TestFixture};

/// Text file through loading, segmentation and persistence
#[tokio::test]
async fn test_text_file_to_report() {
    let fixture = TestFixture::new();
    let input = fixture.create_source_file("chapter.txt", CHAPTER_TEXT);

    let source = load_source(&input, PageRange::default(), false)
        .await
        .expect("Loading should succeed");
    assert_eq!(source.kind, SourceKind::Text);
    assert!(source.pages.is_none());

    let config = SegmentConfig::new(50, 200, source.kind.default_mode());
    let segmenter = Segmenter::new().expect("Segmenter creation should succeed");
    let records = segmenter.segment(&source.raw, &config).expect("Segmentation should succeed");
    assert!(!records.is_empty());

    let report = SegmentationReport::new(source.file_name(), &config, records, source.pages);
    report.save(&fixture.path("chapter_paragraphs.json")).await.expect("Save should succeed");

    let json = fixture.read_json("chapter_paragraphs.json");
    assert_eq!(json["metadata"]["source_file"], "chapter.txt");
    assert_eq!(json["metadata"]["processing_settings"]["mode"], "document_structure");
    assert_eq!(json["metadata"]["processing_settings"]["min_paragraph_chars"], 50);
    assert_eq!(json["statistics"]["pages_processed"], "1-1");

    let paragraphs = json["paragraphs"].as_array().expect("paragraphs must be an array");
    assert_eq!(json["statistics"]["total_paragraphs"], paragraphs.len());
    for (index, paragraph) in paragraphs.iter().enumerate() {
        assert_eq!(paragraph["paragraph_id"], format!("para_{}", index + 1));
        assert_eq!(paragraph["source_page"], 1);
    }

    let all_content: Vec<&str> = paragraphs.iter().filter_map(|p| p["content"].as_str()).collect();
    let joined = all_content.join(" ");
    assert!(joined.contains("transcribed"));
    assert!(!joined.contains("Introduction To Paragraphs"));
    assert!(!joined.contains("Method"));
    assert!(!joined.contains("[1]"));
    assert!(joined.contains("originals were lost."));
}

/// Inline page markers drive source_page and pages_processed
#[tokio::test]
async fn test_paged_text_attribution() {
    let fixture = TestFixture::new();
    let input = fixture.create_source_file("paged.txt", PAGED_TEXT);
    let source = load_source(&input, PageRange::default(), false).await.unwrap();

    let config = SegmentConfig::new(20, 100, SplitMode::PageStream);
    let records = Segmenter::new().unwrap().segment(&source.raw, &config).unwrap();

    let pages: Vec<u32> = records.iter().map(|r| r.source_page()).collect();
    assert_eq!(pages, vec![12, 13, 14]);
    assert!(records.iter().all(|r| !r.content().contains("PAGE")));

    let report = SegmentationReport::new(source.file_name(), &config, records, source.pages);
    assert_eq!(report.statistics.pages_processed, "12-14");
}

/// Each PDF page gets its own marker, and a range keeps only those pages
#[tokio::test]
async fn test_pdf_pages_and_range() {
    let fixture = TestFixture::new();
    let input = fixture.create_pdf_file(
        "three.pdf",
        &["Alpha page text.", "Beta page text.", "Gamma page text."],
    );
    let segmenter = Segmenter::new().unwrap();
    let config = SegmentConfig::new(5, 20, SplitMode::PageStream);

    let whole = load_source(&input, PageRange::default(), false).await.unwrap();
    assert_eq!(whole.kind, SourceKind::Pdf);
    assert_eq!(whole.pages, Some((1, 3)));
    assert!(whole.raw.contains("<!-- PAGE 3 -->"));
    assert!(!whole.raw.contains("text.Beta"));

    let records = segmenter.segment(&whole.raw, &config).unwrap();
    let pages: Vec<u32> = records.iter().map(|r| r.source_page()).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!(records[1].content(), "Beta page text.");

    let ranged = load_source(&input, "2-3".parse().unwrap(), false).await.unwrap();
    assert_eq!(ranged.pages, Some((2, 3)));
    assert!(!ranged.raw.contains("Alpha"));
    let records = segmenter.segment(&ranged.raw, &config).unwrap();
    let pages: Vec<u32> = records.iter().map(|r| r.source_page()).collect();
    assert_eq!(pages, vec![2, 3]);

    let single = load_source(&input, PageRange::single(2), false).await.unwrap();
    assert_eq!(single.pages, Some((2, 2)));
    assert!(single.raw.contains("Beta page text."));
}

/// The sentence-start alphabet decides boundaries in document-structure mode
#[test]
fn test_sentence_start_alphabet() {
    let segmenter = Segmenter::new().unwrap();
    let mut config = SegmentConfig::new(10, 400, SplitMode::DocumentStructure);
    config.normalize.transliterate = false;

    let localized = segmenter.segment_detailed(TURKISH_TEXT, &config).unwrap();
    assert_eq!(localized.sentences.len(), 4);
    assert_eq!(localized.sentences[1].text(), "İlk sayfası yırtılmıştı.");

    let ascii_only = config.clone().with_sentence_starts("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    let result = segmenter.segment_detailed(TURKISH_TEXT, &ascii_only).unwrap();
    assert_eq!(result.sentences.len(), 1);

    // Page-stream mode ignores the alphabet entirely
    let stream = SegmentConfig::new(10, 400, SplitMode::PageStream).with_sentence_starts("Q");
    assert_eq!(segmenter.segment_detailed(TURKISH_TEXT, &stream).unwrap().sentences.len(), 4);
}

#[tokio::test]
async fn test_missing_source_reports_not_found() {
    let fixture = TestFixture::new();
    let result = load_source(&fixture.path("nope.txt"), PageRange::default(), false).await;
    assert!(matches!(result, Err(SourceError::NotFound(_))));
}

/// Re-segmenting unchanged input reproduces identical identifiers and content
#[tokio::test]
async fn test_rerun_reproduces_identifiers() {
    let fixture = TestFixture::new();
    let input = fixture.create_source_file("chapter.txt", CHAPTER_TEXT);
    let segmenter = Segmenter::new().unwrap();
    let config = SegmentConfig::new(50, 200, SplitMode::DocumentStructure);

    let buffered = load_source(&input, PageRange::default(), false).await.unwrap();
    let mapped = load_source(&input, PageRange::default(), true).await.unwrap();
    assert_eq!(buffered.raw, mapped.raw);

    let first = segmenter.segment(&buffered.raw, &config).unwrap();
    let second = segmenter.segment(&mapped.raw, &config).unwrap();
    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

/// Records carry every normalized token exactly once, in order
#[test]
fn test_records_cover_normalized_text() {
    let segmenter = Segmenter::new().unwrap();
    let config = SegmentConfig::new(30, 90, SplitMode::PageStream);
    let result = segmenter.segment_detailed(CHAPTER_TEXT, &config).unwrap();

    let content: Vec<&str> = result.records.iter().map(|r| r.content()).collect();
    let joined = content.join(" ");
    assert_eq!(tokens(&joined), tokens(&result.normalized));
}

/// An invalid configuration fails before anything is segmented
#[test]
fn test_invalid_configuration_rejected() {
    let segmenter = Segmenter::new().unwrap();
    for (min, max) in [(0, 100), (100, 0), (500, 500), (900, 800)] {
        let config = SegmentConfig::new(min, max, SplitMode::PageStream);
        assert!(segmenter.segment(CHAPTER_TEXT, &config).is_err(), "({min}, {max}) should be rejected");
    }
}
