pub mod checkpoint;
pub mod error;
pub mod generation;
pub mod report;
pub mod segmenter;
pub mod source;

// Re-export the engine surface for convenient access
pub use segmenter::{
    PageMark, ParagraphDraft, ParagraphRecord, SegmentConfig, Segmentation, Segmenter, SentenceUnit,
    SizeEstimate, SplitMode,
};

pub use error::{GenerationError, SegmentError, SourceError};

// Re-export persistence and pipeline entry points used by the binary and benches
pub use checkpoint::Checkpoint;
pub use generation::{GenerationConfig, GenerationPipeline, GenerationSummary};
pub use report::SegmentationReport;
pub use source::{load_source, LoadedSource, PageRange, SourceKind};
