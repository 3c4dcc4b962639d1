use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use vidhuk::batch::{self, BatchOptions};
use vidhuk::config::{PreprocessConfig, StageOrder};
use vidhuk::discovery::{self, DiscoveryConfig};
use vidhuk::TextPreprocessor;

#[derive(Parser, Debug)]
#[command(name = "vidhuk")]
#[command(about = "Preprocessor for noisy Ukrainian marketplace reviews")]
#[command(version)]
struct Args {
    /// Review dump file, or a directory to scan for *.txt / *.jsonl dumps
    input: PathBuf,

    /// JSON rule-set file overriding the built-in Ukrainian defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write normalized output here instead of next to each input file
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON field holding the review text in *.jsonl inputs
    #[arg(long, default_value = "text")]
    text_field: String,

    /// Normalize content before masking PII instead of after
    #[arg(long)]
    normalize_first: bool,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,

    /// Maximum number of files processed concurrently
    #[arg(long)]
    max_concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging enables observability and debugging in production
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting vidhuk");
    info!(?args, "Parsed CLI arguments");

    // WHY: validate the input path early to fail fast with a clear error
    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }
    if let Some(dir) = &args.output_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut config = match &args.config {
        Some(path) => PreprocessConfig::from_json_file(path)?,
        None => PreprocessConfig::default(),
    };
    if args.normalize_first {
        config.stage_order = StageOrder::NormalizeThenMask;
    }

    let preprocessor = Arc::new(TextPreprocessor::new(config)?);

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        ..Default::default()
    };
    info!("Starting file discovery in: {}", args.input.display());
    let discovered = discovery::collect_review_files(&args.input, discovery_config).await?;

    let with_issues = discovered.iter().filter(|f| f.error.is_some()).count();
    info!(
        "File discovery completed: {} files found, {} with issues",
        discovered.len(),
        with_issues
    );
    if discovered.is_empty() {
        println!("No review dumps found under {}", args.input.display());
        return Ok(());
    }

    let options = BatchOptions {
        text_field: args.text_field.clone(),
        output_dir: args.output_dir.clone(),
        use_mmap: args.use_mmap,
        fail_fast: args.fail_fast,
        show_progress: !args.no_progress,
        max_concurrency: args.max_concurrency.unwrap_or_else(num_cpus::get),
    };

    let run = batch::process_files(preprocessor, &discovered, options).await?;

    let stats_json = serde_json::to_string_pretty(&run)?;
    tokio::fs::write(&args.stats_out, stats_json).await?;
    info!("Run stats written to {}", args.stats_out.display());

    println!(
        "vidhuk v{} - preprocessing complete",
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "Files: {} processed, {} failed",
        run.files_processed, run.files_failed
    );
    println!(
        "Reviews: {} processed, {} sentences detected",
        run.reviews_processed, run.sentences_detected
    );
    println!("Stats written to {}", args.stats_out.display());

    Ok(())
}
