// WHY: Batch processing is per-file concurrent while the pipeline itself
// stays single-threaded; one immutable preprocessor is shared by every worker.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use crate::discovery::FileValidation;
use crate::pipeline::TextPreprocessor;
use crate::reader::{ReaderConfig, ReviewFileReader};

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// JSON field holding the review text in `.jsonl` inputs.
    pub text_field: String,
    /// Redirect outputs here instead of writing next to each input.
    pub output_dir: Option<PathBuf>,
    pub use_mmap: bool,
    pub fail_fast: bool,
    pub show_progress: bool,
    pub max_concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            text_field: "text".to_string(),
            output_dir: None,
            use_mmap: false,
            fail_fast: false,
            show_progress: false,
            max_concurrency: num_cpus::get(),
        }
    }
}

/// Per-file processing statistics.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    /// Input file path.
    pub path: String,
    /// Reviews preprocessed and written out.
    pub reviews_processed: u64,
    /// Lines skipped: blank, or JSON records without the text field.
    pub reviews_skipped: u64,
    /// Sentences detected across all reviews in the file.
    pub sentences_detected: u64,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Processing status (processed, failed).
    pub status: String,
    /// Error message if processing failed.
    pub error: Option<String>,
}

/// Aggregate statistics for a whole run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    pub files_total: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub reviews_processed: u64,
    pub sentences_detected: u64,
    pub total_time_ms: u64,
    pub files: Vec<FileStats>,
}

/// Resolve where the normalized JSONL for `input` goes.
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let renamed = input.with_extension("norm.jsonl");
    match output_dir {
        Some(dir) => dir.join(renamed.file_name().unwrap_or_default()),
        None => renamed,
    }
}

/// Process every discovered file concurrently, writing one normalized JSONL
/// record per review and returning aggregate statistics.
pub async fn process_files(
    preprocessor: Arc<TextPreprocessor>,
    files: &[FileValidation],
    options: BatchOptions,
) -> Result<RunStats> {
    let started = Instant::now();
    let progress = if options.show_progress {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let concurrency = options.max_concurrency.max(1);
    let results: Vec<Result<FileStats>> = stream::iter(files.iter().cloned())
        .map(|file| {
            let preprocessor = Arc::clone(&preprocessor);
            let options = options.clone();
            let progress = progress.clone();
            async move {
                let stats = process_one_file(&preprocessor, &file, &options).await;
                if let Some(bar) = &progress {
                    bar.inc(1);
                }
                stats
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    let mut run = RunStats {
        files_total: files.len(),
        files_processed: 0,
        files_failed: 0,
        reviews_processed: 0,
        sentences_detected: 0,
        total_time_ms: started.elapsed().as_millis() as u64,
        files: Vec::with_capacity(files.len()),
    };

    for result in results {
        let stats = match result {
            Ok(stats) => stats,
            // WHY: errors only escape process_one_file under fail-fast
            Err(e) => return Err(e),
        };
        if stats.error.is_none() {
            run.files_processed += 1;
        } else {
            run.files_failed += 1;
        }
        run.reviews_processed += stats.reviews_processed;
        run.sentences_detected += stats.sentences_detected;
        run.files.push(stats);
    }

    info!(
        files = run.files_processed,
        failed = run.files_failed,
        reviews = run.reviews_processed,
        sentences = run.sentences_detected,
        "batch run complete"
    );
    Ok(run)
}

async fn process_one_file(
    preprocessor: &TextPreprocessor,
    file: &FileValidation,
    options: &BatchOptions,
) -> Result<FileStats> {
    let started = Instant::now();
    let mut stats = FileStats {
        path: file.path.display().to_string(),
        reviews_processed: 0,
        reviews_skipped: 0,
        sentences_detected: 0,
        processing_time_ms: 0,
        status: "processed".to_string(),
        error: None,
    };

    if let Some(error) = &file.error {
        if options.fail_fast {
            anyhow::bail!("cannot process {}: {error}", file.path.display());
        }
        stats.status = "failed".to_string();
        stats.error = Some(error.clone());
        return Ok(stats);
    }

    let reader = ReviewFileReader::new(ReaderConfig {
        fail_fast: options.fail_fast,
        use_mmap: options.use_mmap,
        ..Default::default()
    });
    let (lines, read_stats) = reader.read_lines(&file.path).await?;
    if let Some(error) = read_stats.read_error {
        warn!("partial read of {}: {error}", file.path.display());
        stats.error = Some(error);
        stats.status = "failed".to_string();
    }

    let out_path = output_path(&file.path, options.output_dir.as_deref());
    let out_file = tokio::fs::File::create(&out_path)
        .await
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    let mut writer = BufWriter::new(out_file);

    for line in &lines {
        let Some(text) = extract_review_text(line, &options.text_field) else {
            stats.reviews_skipped += 1;
            continue;
        };

        let document = preprocessor.preprocess(&text);
        stats.reviews_processed += 1;
        stats.sentences_detected += document.sentence_count as u64;

        let record = serde_json::to_string(&document)?;
        writer.write_all(record.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;

    stats.processing_time_ms = started.elapsed().as_millis() as u64;
    Ok(stats)
}

/// Pull the review text out of one input line.
///
/// JSON object lines yield their configured text field; a JSON object
/// without that field (or with a non-string value) is skipped. Anything that
/// does not parse as a JSON object is one plain-text review per line.
fn extract_review_text(line: &str, text_field: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return value
                .get(text_field)
                .and_then(|field| field.as_str())
                .map(str::to_string);
        }
    }
    Some(trimmed.to_string())
}
