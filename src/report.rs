// Output schema for a segmentation run, plus atomic JSON persistence

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::segmenter::{ParagraphRecord, SegmentConfig, SizeEstimate, SplitMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    pub min_paragraph_chars: usize,
    pub max_paragraph_chars: usize,
    pub mode: SplitMode,
    pub dehyphenate: bool,
    pub strip_headings: bool,
    pub size_estimate: SizeEstimate,
}

impl From<&SegmentConfig> for ProcessingSettings {
    fn from(config: &SegmentConfig) -> Self {
        Self {
            min_paragraph_chars: config.min_chars,
            max_paragraph_chars: config.max_chars,
            mode: config.mode,
            dehyphenate: config.normalize.dehyphenate,
            strip_headings: config.normalize.strip_headings,
            size_estimate: config.size_estimate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source_file: String,
    /// RFC 3339 local timestamp.
    pub processed_at: String,
    pub processing_settings: ProcessingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_paragraphs: usize,
    pub total_characters: usize,
    pub total_words: usize,
    /// `"start-end"`.
    pub pages_processed: String,
}

impl Statistics {
    /// Summarize records. `pages` is the page span actually loaded, when known;
    /// otherwise the span is taken from the records themselves.
    pub fn from_records(records: &[ParagraphRecord], pages: Option<(u32, u32)>) -> Self {
        let (start, end) = match pages {
            Some(span) => span,
            None => {
                let start = records.first().map_or(1, |r| r.source_page());
                let end = records.last().map_or(start, |r| r.source_page());
                (start, end)
            }
        };

        Self {
            total_paragraphs: records.len(),
            total_characters: records.iter().map(|r| r.char_count()).sum(),
            total_words: records.iter().map(|r| r.word_count()).sum(),
            pages_processed: format!("{start}-{end}"),
        }
    }
}

/// Everything persisted for one segmented document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationReport {
    pub metadata: Metadata,
    pub statistics: Statistics,
    pub paragraphs: Vec<ParagraphRecord>,
}

impl SegmentationReport {
    pub fn new(
        source_file: impl Into<String>,
        config: &SegmentConfig,
        paragraphs: Vec<ParagraphRecord>,
        pages: Option<(u32, u32)>,
    ) -> Self {
        Self {
            metadata: Metadata {
                source_file: source_file.into(),
                processed_at: Local::now().to_rfc3339(),
                processing_settings: ProcessingSettings::from(config),
            },
            statistics: Statistics::from_records(&paragraphs, pages),
            paragraphs,
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self).await
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read report {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse report {}", path.display()))
    }
}

/// Default output path: the source path with its extension replaced by
/// `_paragraphs.json`.
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    source.with_file_name(format!("{stem}_paragraphs.json"))
}

/// Serialize `value` as pretty JSON and move it into place in one step.
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    write_atomic(path, content.as_bytes()).await
}

/// Write to a sibling temp file, then rename over `path`.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let file_name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {}", path.display()))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    fs::write(&temp_path, contents)
        .await
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to move {} into place", path.display()))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
