use anyhow::Result;
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Configuration for review-dump discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Glob patterns resolved relative to the root directory.
    pub patterns: Vec<String>,
    /// Whether to abort on the first traversal error.
    pub fail_fast: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["**/*.txt".to_string(), "**/*.jsonl".to_string()],
            fail_fast: false,
        }
    }
}

/// One discovered input file with its validation status.
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub error: Option<String>,
}

/// Discover review-dump files under `root`.
///
/// A file root is returned as-is after validation; a directory root is
/// scanned with the configured glob patterns. Results are sorted and
/// de-duplicated so overlapping patterns never process a file twice.
pub async fn collect_review_files(
    root: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let root = root.as_ref();

    if root.is_file() {
        let validation = validate_file(root.to_path_buf()).await;
        return Ok(vec![validation]);
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in &config.patterns {
        let full_pattern = root.join(pattern).to_string_lossy().into_owned();
        debug!("globbing {full_pattern}");

        let entries = match glob(&full_pattern) {
            Ok(entries) => entries,
            Err(e) => {
                let error = format!("invalid discovery pattern {full_pattern}: {e}");
                if config.fail_fast {
                    anyhow::bail!(error);
                }
                warn!("{error}");
                continue;
            }
        };

        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => {
                    if config.fail_fast {
                        anyhow::bail!("discovery error under {}: {e}", root.display());
                    }
                    warn!("discovery error under {}: {e}", root.display());
                }
            }
        }
    }

    paths.sort();
    paths.dedup();

    let mut validated = Vec::with_capacity(paths.len());
    for path in paths {
        validated.push(validate_file(path).await);
    }

    info!(
        "discovered {} review files under {}",
        validated.len(),
        root.display()
    );
    Ok(validated)
}

async fn validate_file(path: PathBuf) -> FileValidation {
    match fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => FileValidation {
            size_bytes: meta.len(),
            error: None,
            path,
        },
        Ok(_) => FileValidation {
            size_bytes: 0,
            error: Some("not a regular file".to_string()),
            path,
        },
        Err(e) => FileValidation {
            size_bytes: 0,
            error: Some(format!("cannot stat: {e}")),
            path,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_discovers_txt_and_jsonl_recursively() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/reviews.txt", "товар ок");
        write(temp.path(), "a/b/dump.jsonl", "{\"text\": \"ок\"}");
        write(temp.path(), "notes.md", "ignored");

        let found = collect_review_files(temp.path(), DiscoveryConfig::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|f| f.error.is_none()));
    }

    #[tokio::test]
    async fn test_file_root_returned_directly() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "single.txt", "відгук");

        let found = collect_review_files(&path, DiscoveryConfig::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, path);
        assert!(found[0].size_bytes > 0);
    }

    #[tokio::test]
    async fn test_overlapping_patterns_deduplicated() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "dump.txt", "x y z");

        let config = DiscoveryConfig {
            patterns: vec!["**/*.txt".to_string(), "*.txt".to_string()],
            ..Default::default()
        };
        let found = collect_review_files(temp.path(), config).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        let found = collect_review_files(temp.path(), DiscoveryConfig::default())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pattern_fail_fast() {
        let temp = TempDir::new().unwrap();
        let config = DiscoveryConfig {
            patterns: vec!["[".to_string()],
            fail_fast: true,
        };
        assert!(collect_review_files(temp.path(), config).await.is_err());
    }
}
