use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the segmentation engine itself.
///
/// The engine only fails on configuration or input-shape problems; any text,
/// however odd, still produces a best-effort record set.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("page marks must be sorted by strictly increasing offset (offset {offset} follows {previous})")]
    UnsortedPageMarks { previous: usize, offset: usize },

    #[error("failed to compile pattern: {0}")]
    Pattern(#[from] regex_automata::meta::BuildError),
}

/// Failures while loading a source document into raw text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8: {source}", path.display())]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("failed to extract text from {}: {message}", path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("page range starts at {start} but the document has {total} pages")]
    PageRange { start: u32, total: u32 },

    #[error("invalid page range '{0}' (expected e.g. '12-15' or '5')")]
    InvalidPageRange(String),
}

/// Failures talking to the question/answer generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("failed to compile pattern: {0}")]
    Pattern(#[from] regex_automata::meta::BuildError),
}
