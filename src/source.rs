// Source loading: plain text or PDF into raw text carrying inline page markers

use memmap2::MmapOptions;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::segmenter::pages::page_marker;
use crate::segmenter::SplitMode;

/// Buffer size for async text reads.
const READ_BUFFER_SIZE: usize = 8192;

/// Kind of document behind a source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Pdf,
}

impl SourceKind {
    /// Detect the kind from the file extension; anything but `.pdf` is text.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => SourceKind::Pdf,
            _ => SourceKind::Text,
        }
    }

    /// Sentence-boundary mode that suits this kind of source by default.
    pub fn default_mode(&self) -> SplitMode {
        match self {
            SourceKind::Pdf => SplitMode::PageStream,
            SourceKind::Text => SplitMode::DocumentStructure,
        }
    }
}

/// Inclusive 1-based page range; an open end means "through the last page".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl Default for PageRange {
    fn default() -> Self {
        Self { start: 1, end: None }
    }
}

impl PageRange {
    pub fn single(page: u32) -> Self {
        Self {
            start: page,
            end: Some(page),
        }
    }
}

impl FromStr for PageRange {
    type Err = SourceError;

    /// Accepts `"12-15"`, `"5"` or an empty string for all pages.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::default());
        }

        let invalid = || SourceError::InvalidPageRange(input.to_string());
        let parse = |part: &str| part.trim().parse::<u32>().map_err(|_| invalid());

        let range = match input.split_once('-') {
            Some((start, end)) => Self {
                start: parse(start)?.max(1),
                end: Some(parse(end)?),
            },
            None => Self::single(parse(input)?),
        };

        match range.end {
            Some(end) if end < range.start => Err(invalid()),
            _ if range.start == 0 => Err(invalid()),
            _ => Ok(range),
        }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-", self.start),
        }
    }
}

/// Raw text ready for segmentation.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub raw: String,
    /// First and last page actually included, when the source is paginated.
    pub pages: Option<(u32, u32)>,
}

impl LoadedSource {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Load a source document, dispatching on its extension.
pub async fn load_source(path: &Path, range: PageRange, use_mmap: bool) -> Result<LoadedSource, SourceError> {
    let kind = SourceKind::detect(path);
    let (raw, pages) = match kind {
        SourceKind::Pdf => {
            let (raw, first, last) = load_pdf(path, range).await?;
            (raw, Some((first, last)))
        }
        SourceKind::Text => {
            if range != PageRange::default() {
                warn!("Ignoring page range {} for plain-text source {}", range, path.display());
            }
            (load_text(path, use_mmap).await?, None)
        }
    };

    info!("Loaded {} ({:?}, {} bytes)", path.display(), kind, raw.len());
    Ok(LoadedSource {
        path: path.to_path_buf(),
        kind,
        raw,
        pages,
    })
}

/// Read a UTF-8 text file, through buffered async I/O or a memory map.
pub async fn load_text(path: &Path, use_mmap: bool) -> Result<String, SourceError> {
    if use_mmap {
        return load_text_mmap(path);
    }

    debug!("Starting async read of {}", path.display());
    let file = File::open(path).await.map_err(|e| io_error(path, e))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| io_error(path, e))?;

    String::from_utf8(bytes).map_err(|e| SourceError::Utf8 {
        path: path.to_path_buf(),
        source: e.utf8_error(),
    })
}

fn load_text_mmap(path: &Path) -> Result<String, SourceError> {
    debug!("Memory-mapping {}", path.display());
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let len = file.metadata().map_err(|e| io_error(path, e))?.len();
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read-only and dropped before this function returns.
    let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| io_error(path, e))?;
    let text = std::str::from_utf8(&mmap).map_err(|e| SourceError::Utf8 {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(text.to_string())
}

/// Extract text from a PDF and keep the requested pages.
///
/// Returns the raw text plus the first and last page included.
pub async fn load_pdf(path: &Path, range: PageRange) -> Result<(String, u32, u32), SourceError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;

    let owned_path = path.to_path_buf();
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .await
        .map_err(|e| SourceError::Pdf {
            path: owned_path.clone(),
            message: e.to_string(),
        })?
        .map_err(|e| SourceError::Pdf {
            path: owned_path,
            message: e.to_string(),
        })?;

    debug!("Extracted {} pages from {}", pages.len(), path.display());
    assemble_pages(&pages, range)
}

/// Join the selected pages, each preceded by its inline page marker.
///
/// The range end is clamped to the document; a start of zero or beyond it is an error.
pub fn assemble_pages<S: AsRef<str>>(pages: &[S], range: PageRange) -> Result<(String, u32, u32), SourceError> {
    if range.start == 0 {
        return Err(SourceError::InvalidPageRange(range.to_string()));
    }

    let total = pages.len() as u32;
    if range.start > total {
        return Err(SourceError::PageRange {
            start: range.start,
            total,
        });
    }

    let end = range.end.unwrap_or(total).min(total);
    let text = (range.start..=end)
        .map(|page| format!("{}\n{}", page_marker(page), pages[(page - 1) as usize].as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok((text, range.start, end))
}

fn io_error(path: &Path, source: std::io::Error) -> SourceError {
    if source.kind() == std::io::ErrorKind::NotFound {
        SourceError::NotFound(path.to_path_buf())
    } else {
        SourceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
