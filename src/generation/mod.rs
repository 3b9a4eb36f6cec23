// Downstream pipeline: paragraphs JSON -> chat backend -> question/answer pairs, resumable

use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

pub mod client;
pub mod qa;

pub use client::{ChatClient, SYSTEM_PROMPT};
pub use qa::{QaPair, QaParser};

use crate::checkpoint::Checkpoint;
use crate::error::GenerationError;
use crate::report::write_json_atomic;
use crate::segmenter::records::parse_ordinal;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:1234/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "qwen1.5-7b-chat";

/// Exponential backoff: `min(base * 2^attempt + jitter, cap)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(5),
            cap: Duration::from_secs(300),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    pub fn none() -> Self {
        Self {
            base: Duration::ZERO,
            cap: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Delay before retry `attempt` (0-based) given a jitter fraction in `[0, 1)`.
    pub fn delay(&self, attempt: u32, jitter: f64) -> Duration {
        let exponential = self.base.saturating_mul(2u32.saturating_pow(attempt));
        let jitter = self.max_jitter.mul_f64(jitter.clamp(0.0, 1.0));
        exponential.saturating_add(jitter).min(self.cap)
    }

    fn sample(&self, attempt: u32) -> Duration {
        self.delay(attempt, rand::thread_rng().gen::<f64>())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
    pub cooldown_min: Duration,
    pub cooldown_max: Duration,
    /// Content longer than this many characters is cut and suffixed with `...`.
    pub truncate_chars: usize,
    /// Content shorter than this many characters is skipped.
    pub min_content_chars: usize,
    pub show_progress: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 800,
            request_timeout: Duration::from_secs(300),
            max_retries: 5,
            backoff: BackoffPolicy::default(),
            cooldown_min: Duration::from_secs(10),
            cooldown_max: Duration::from_secs(20),
            truncate_chars: 1500,
            min_content_chars: 10,
            show_progress: true,
        }
    }
}

impl GenerationConfig {
    fn cooldown(&self) -> Duration {
        if self.cooldown_max <= self.cooldown_min {
            return self.cooldown_min;
        }
        let millis = rand::thread_rng()
            .gen_range(self.cooldown_min.as_millis() as u64..=self.cooldown_max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

/// Something that turns paragraph text into raw model output.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, content: &str) -> Result<String, GenerationError>;
}

/// Call the backend up to `max_retries` times, sleeping per `backoff` in between.
pub async fn request_with_retry<B: CompletionBackend + ?Sized>(
    backend: &B,
    content: &str,
    max_retries: u32,
    backoff: &BackoffPolicy,
) -> Result<String, GenerationError> {
    let attempts = max_retries.max(1);
    let mut attempt = 0;
    loop {
        match backend.complete(content).await {
            Ok(text) => return Ok(text),
            Err(e) if attempt + 1 >= attempts => return Err(e),
            Err(e) => {
                let delay = backoff.sample(attempt);
                warn!(
                    "Request failed (attempt {}/{}): {}; retrying in {:.1}s",
                    attempt + 1,
                    attempts,
                    e,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// One entry of a paragraphs file. Only the identifier and content are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphInput {
    pub paragraph_id: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ParagraphsFile {
    #[serde(default)]
    paragraphs: Vec<ParagraphInput>,
}

pub async fn load_paragraphs(path: &Path) -> Result<Vec<ParagraphInput>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read paragraphs file {}", path.display()))?;
    let file: ParagraphsFile =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(file.paragraphs)
}

/// Pair each paragraph with its ordinal and sort ascending.
///
/// Identifiers that are not `para_N` fall back to their 1-based position.
pub fn order_paragraphs(paragraphs: Vec<ParagraphInput>) -> Vec<(u64, ParagraphInput)> {
    let mut ordered: Vec<(u64, ParagraphInput)> = paragraphs
        .into_iter()
        .enumerate()
        .map(|(index, paragraph)| {
            let ordinal = parse_ordinal(&paragraph.paragraph_id).unwrap_or(index as u64 + 1);
            (ordinal, paragraph)
        })
        .collect();
    ordered.sort_by_key(|(ordinal, _)| *ordinal);
    ordered
}

/// Cut `content` to `limit` characters plus `...` when it is longer.
pub fn truncate_content(content: &str, limit: usize) -> Cow<'_, str> {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &content[..cut])),
        None => Cow::Borrowed(content),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Generated(usize),
    TooShort,
    Malformed,
    Failed,
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub already_processed: usize,
    pub generated: usize,
    pub skipped_short: usize,
    pub malformed: usize,
    pub failed: usize,
    pub pairs_written: usize,
}

pub struct GenerationPipeline<B> {
    backend: B,
    parser: QaParser,
    config: GenerationConfig,
}

impl<B: CompletionBackend> GenerationPipeline<B> {
    pub fn new(backend: B, config: GenerationConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            backend,
            parser: QaParser::new()?,
            config,
        })
    }

    /// Process every paragraph after the checkpoint, appending pairs to `output`.
    ///
    /// Pairs already in `output` are kept. The pairs file is rewritten after
    /// each paragraph and the checkpoint advances after each attempt.
    pub async fn run(
        &self,
        paragraphs: Vec<ParagraphInput>,
        checkpoint: &mut Checkpoint,
        output: &Path,
    ) -> Result<GenerationSummary> {
        let ordered = order_paragraphs(paragraphs);
        let total = ordered.len();
        let mut summary = GenerationSummary::default();
        let mut pairs = load_existing_pairs(output).await?;

        let pending: Vec<_> = ordered
            .into_iter()
            .filter(|(ordinal, _)| {
                let done = checkpoint.is_processed(*ordinal);
                if done {
                    summary.already_processed += 1;
                }
                !done
            })
            .collect();

        info!(
            "Generating pairs for {} of {} paragraphs (resuming after {})",
            pending.len(),
            total,
            checkpoint.last_processed()
        );

        let progress = self.progress_bar(pending.len() as u64)?;
        let mut requests_sent = 0usize;

        for (ordinal, paragraph) in pending {
            progress.set_message(paragraph.paragraph_id.clone());

            let outcome = if paragraph.content.chars().count() < self.config.min_content_chars {
                info!("Paragraph {} is too short, skipping", ordinal);
                Outcome::TooShort
            } else {
                if requests_sent > 0 {
                    tokio::time::sleep(self.config.cooldown()).await;
                }
                requests_sent += 1;
                self.process(ordinal, &paragraph.content, &mut pairs).await
            };

            match outcome {
                Outcome::Generated(count) => {
                    summary.generated += 1;
                    write_json_atomic(output, &pairs).await?;
                    info!("Paragraph {}: {} pairs ({} total)", ordinal, count, pairs.len());
                }
                Outcome::TooShort => summary.skipped_short += 1,
                Outcome::Malformed => summary.malformed += 1,
                Outcome::Failed => summary.failed += 1,
            }

            checkpoint.record(ordinal).await?;
            progress.inc(1);
        }

        progress.finish_and_clear();
        summary.pairs_written = pairs.len();
        Ok(summary)
    }

    async fn process(&self, ordinal: u64, content: &str, pairs: &mut Vec<QaPair>) -> Outcome {
        let prompt = truncate_content(content, self.config.truncate_chars);
        if let Cow::Owned(_) = prompt {
            warn!(
                "Paragraph {} is {} characters, truncated to {}",
                ordinal,
                content.chars().count(),
                self.config.truncate_chars
            );
        }

        let response =
            match request_with_retry(&self.backend, &prompt, self.config.max_retries, &self.config.backoff).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Paragraph {}: giving up after {} attempts: {}", ordinal, self.config.max_retries, e);
                    return Outcome::Failed;
                }
            };

        match self.parser.parse(&response) {
            Ok(parsed) => {
                let count = parsed.len();
                pairs.extend(parsed);
                Outcome::Generated(count)
            }
            Err(e) => {
                warn!("Paragraph {}: {}", ordinal, e);
                Outcome::Malformed
            }
        }
    }

    fn progress_bar(&self, len: u64) -> Result<ProgressBar> {
        if !self.config.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ETA: {eta}")?
                .progress_chars("█▓▒░  "),
        );
        Ok(bar)
    }
}

async fn load_existing_pairs(path: &Path) -> Result<Vec<QaPair>> {
    match fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("Existing output {} is not a list of pairs", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}
