use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use folio::checkpoint::{Checkpoint, DEFAULT_CHECKPOINT_FILE};
use folio::generation::{
    load_paragraphs, ChatClient, GenerationConfig, GenerationPipeline, DEFAULT_API_URL, DEFAULT_MODEL,
};
use folio::report::{default_output_path, SegmentationReport};
use folio::segmenter::config::{DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS, DEFAULT_SENTENCE_STARTS};
use folio::source::{load_source, PageRange};
use folio::{SegmentConfig, Segmenter, SizeEstimate, SplitMode};

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Split extracted document text into sentence-clean paragraphs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment a text or PDF file into a paragraphs JSON report
    Segment(SegmentArgs),
    /// Generate question/answer pairs for each paragraph of a report
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
struct SegmentArgs {
    /// Source document (.pdf or plain text)
    input: PathBuf,

    /// Output JSON path [default: <input stem>_paragraphs.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page range for PDFs, e.g. 12-15 or 5
    #[arg(long, default_value = "")]
    pages: String,

    #[arg(long, default_value_t = DEFAULT_MIN_CHARS)]
    min_chars: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,

    /// Boundary mode [default: page-stream for PDFs, document-structure otherwise]
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Characters that may start a sentence in document-structure mode
    #[arg(long, default_value = DEFAULT_SENTENCE_STARTS)]
    sentence_starts: String,

    #[arg(long, value_enum, default_value_t = SizeEstimateArg::Exact)]
    size_estimate: SizeEstimateArg,

    /// Keep non-ASCII characters as they are
    #[arg(long)]
    no_transliterate: bool,

    /// Keep numbered heading lines
    #[arg(long)]
    keep_headings: bool,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Paragraphs JSON produced by `folio segment`
    input: PathBuf,

    /// Output JSON path [default: trainset_qa_<timestamp>.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CHECKPOINT_FILE)]
    checkpoint: PathBuf,

    #[arg(long, env = "FOLIO_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "FOLIO_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, default_value_t = 5)]
    max_retries: u32,

    /// Minimum pause between paragraphs, in seconds
    #[arg(long, default_value_t = 10)]
    cooldown_min: u64,

    /// Maximum pause between paragraphs, in seconds
    #[arg(long, default_value_t = 20)]
    cooldown_max: u64,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    PageStream,
    DocumentStructure,
}

impl From<ModeArg> for SplitMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PageStream => SplitMode::PageStream,
            ModeArg::DocumentStructure => SplitMode::DocumentStructure,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SizeEstimateArg {
    Exact,
    WordHeuristic,
}

impl From<SizeEstimateArg> for SizeEstimate {
    fn from(estimate: SizeEstimateArg) -> Self {
        match estimate {
            SizeEstimateArg::Exact => SizeEstimate::Exact,
            SizeEstimateArg::WordHeuristic => SizeEstimate::word_heuristic(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Segment(args) => segment(args).await,
        Command::Generate(args) => generate(args).await,
    }
}

async fn segment(args: SegmentArgs) -> Result<()> {
    let range: PageRange = args.pages.parse()?;
    let source = load_source(&args.input, range, args.use_mmap).await?;

    let mode = args.mode.map(SplitMode::from).unwrap_or_else(|| source.kind.default_mode());
    let mut config = SegmentConfig::new(args.min_chars, args.max_chars, mode)
        .with_sentence_starts(&args.sentence_starts)
        .with_size_estimate(args.size_estimate.into());
    config.normalize.transliterate = !args.no_transliterate;
    config.normalize.strip_headings = !args.keep_headings;

    let segmenter = Segmenter::new()?;
    let records = segmenter
        .segment(&source.raw, &config)
        .with_context(|| format!("Failed to segment {}", args.input.display()))?;

    let report = SegmentationReport::new(source.file_name(), &config, records, source.pages);
    let output = args.output.unwrap_or_else(|| default_output_path(&args.input));
    report.save(&output).await?;

    println!("folio v{} - segmentation complete", env!("CARGO_PKG_VERSION"));
    println!("  Paragraphs: {}", report.statistics.total_paragraphs);
    println!("  Pages processed: {}", report.statistics.pages_processed);
    println!("  Total words: {}", report.statistics.total_words);
    println!("  Output: {}", output.display());
    Ok(())
}

async fn generate(args: GenerateArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Paragraphs file does not exist: {}", args.input.display());
    }
    if args.cooldown_min > args.cooldown_max {
        anyhow::bail!(
            "--cooldown-min ({}) must not exceed --cooldown-max ({})",
            args.cooldown_min,
            args.cooldown_max
        );
    }

    let started = Instant::now();
    let config = GenerationConfig {
        api_url: args.api_url,
        model: args.model,
        max_retries: args.max_retries,
        cooldown_min: Duration::from_secs(args.cooldown_min),
        cooldown_max: Duration::from_secs(args.cooldown_max),
        show_progress: !args.no_progress,
        ..GenerationConfig::default()
    };

    let paragraphs = load_paragraphs(&args.input).await?;
    let total = paragraphs.len();
    let mut checkpoint = Checkpoint::load(&args.checkpoint).await;
    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("trainset_qa_{}.json", chrono::Local::now().format("%Y%m%d_%H%M%S")))
    });

    let client = ChatClient::new(&config)?;
    let pipeline = GenerationPipeline::new(client, config)?;
    let summary = pipeline.run(paragraphs, &mut checkpoint, &output).await?;

    println!("folio v{} - generation complete", env!("CARGO_PKG_VERSION"));
    println!("  Paragraphs in file: {total}");
    println!("  Already processed: {}", summary.already_processed);
    println!("  Generated: {}", summary.generated);
    if summary.skipped_short + summary.malformed + summary.failed > 0 {
        println!(
            "  Skipped: {} too short, {} malformed responses, {} failed requests",
            summary.skipped_short, summary.malformed, summary.failed
        );
    }
    println!("  Question/answer pairs: {}", summary.pairs_written);
    println!("  Checkpoint: {} ({})", checkpoint.last_processed(), checkpoint.path().display());
    println!("  Output: {}", output.display());
    println!("  Elapsed: {:.1} min", started.elapsed().as_secs_f64() / 60.0);
    Ok(())
}
