use anyhow::Result;
use memmap2::Mmap;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

/// Configuration for review-dump reading behavior.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing.
    pub fail_fast: bool,
    /// Buffer size for async reading.
    pub buffer_size: usize,
    /// Read through a memory map instead of buffered async I/O.
    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192, // WHY: 8KB is optimal for most filesystems and network storage
            use_mmap: false,
        }
    }
}

/// Statistics for one file read.
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub read_error: Option<String>,
}

impl ReadStats {
    fn failed(path: &Path, error: String) -> Self {
        Self {
            file_path: path.display().to_string(),
            lines_read: 0,
            bytes_read: 0,
            read_error: Some(error),
        }
    }
}

/// Line reader for review dumps with buffered-async and mmap paths.
pub struct ReviewFileReader {
    config: ReaderConfig,
}

impl ReviewFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read one review per line. Dispatches to the configured I/O path.
    pub async fn read_lines(&self, path: impl AsRef<Path>) -> Result<(Vec<String>, ReadStats)> {
        if self.config.use_mmap {
            self.read_lines_mmap(path.as_ref()).await
        } else {
            self.read_lines_buffered(path.as_ref()).await
        }
    }

    /// Stream lines through a buffered async reader.
    async fn read_lines_buffered(&self, path: &Path) -> Result<(Vec<String>, ReadStats)> {
        debug!("starting buffered read of {}", path.display());

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                let error = format!("failed to open {}: {e}", path.display());
                warn!("{error}");
                if self.config.fail_fast {
                    anyhow::bail!(error);
                }
                return Ok((Vec::new(), ReadStats::failed(path, error)));
            }
        };

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = LinesStream::new(reader.lines());
        let mut result_lines = Vec::new();
        let mut line_count = 0u64;
        let mut byte_count = 0u64;

        while let Some(line) = lines.next().await {
            match line {
                Ok(line) => {
                    byte_count += line.len() as u64 + 1;
                    line_count += 1;
                    result_lines.push(line);
                }
                Err(e) => {
                    let error = format!(
                        "decoding error in {} at line {}: {e}",
                        path.display(),
                        line_count + 1
                    );
                    warn!("{error}");
                    if self.config.fail_fast {
                        anyhow::bail!(error);
                    }
                    // Keep the lines decoded so far
                    let stats = ReadStats {
                        file_path: path.display().to_string(),
                        lines_read: line_count,
                        bytes_read: byte_count,
                        read_error: Some(error),
                    };
                    return Ok((result_lines, stats));
                }
            }
        }

        let stats = ReadStats {
            file_path: path.display().to_string(),
            lines_read: line_count,
            bytes_read: byte_count,
            read_error: None,
        };
        debug!(
            "read {}: {} lines, {} bytes",
            path.display(),
            line_count,
            byte_count
        );
        Ok((result_lines, stats))
    }

    /// Read through a memory map. The whole file is validated as UTF-8 once,
    /// then split on newlines; cheaper than per-line decoding for large dumps.
    async fn read_lines_mmap(&self, path: &Path) -> Result<(Vec<String>, ReadStats)> {
        debug!("starting mmap read of {}", path.display());

        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                let error = format!("failed to open {}: {e}", path.display());
                warn!("{error}");
                if self.config.fail_fast {
                    anyhow::bail!(error);
                }
                return Ok((Vec::new(), ReadStats::failed(path, error)));
            }
        };

        // Safety: dump files are read-only inputs; the map is dropped before
        // this function returns
        let mmap = unsafe { Mmap::map(&file)? };
        let text = match std::str::from_utf8(&mmap) {
            Ok(text) => text,
            Err(e) => {
                let error = format!("{} is not valid UTF-8: {e}", path.display());
                warn!("{error}");
                if self.config.fail_fast {
                    anyhow::bail!(error);
                }
                return Ok((Vec::new(), ReadStats::failed(path, error)));
            }
        };

        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let stats = ReadStats {
            file_path: path.display().to_string(),
            lines_read: lines.len() as u64,
            bytes_read: mmap.len() as u64,
            read_error: None,
        };
        Ok((lines, stats))
    }
}

/// Convenience function reading a whole file with default configuration.
pub async fn read_file_async(path: impl AsRef<Path>) -> Result<String> {
    let reader = ReviewFileReader::new(ReaderConfig::default());
    let (lines, _stats) = reader.read_lines(path).await?;
    Ok(lines.join("\n"))
}
