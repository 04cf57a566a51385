//! File discovery for precipitation data directories
//!
//! Lists the regular files directly inside the input directory (no
//! recursion), optionally filtered by a file name glob, in natural order.

use crate::error::{PrecipError, Result};
use glob::Pattern;
use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::task;
use tracing::{debug, warn};
use walkdir::WalkDir;

static NATURAL_CHUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+|\D+").expect("natural sort pattern is valid"));

/// File discovery component for a data directory
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    directory: PathBuf,
    pattern: Option<Pattern>,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(directory: PathBuf, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| {
                Pattern::new(p).map_err(|e| PrecipError::InvalidPattern {
                    pattern: p.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self { directory, pattern })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Discover candidate files, sorted naturally by file name
    pub async fn discover_files(&self) -> Result<Vec<PathBuf>> {
        if !self.directory.is_dir() {
            return Err(PrecipError::DirectoryNotFound {
                path: self.directory.clone(),
            });
        }

        let discovery = self.clone();
        let files = task::spawn_blocking(move || discovery.list_files())
            .await
            .map_err(|e| PrecipError::Io(std::io::Error::other(e)))??;

        debug!(
            "Found {} candidate files in {}",
            files.len(),
            self.directory.display()
        );
        Ok(files)
    }

    fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(PrecipError::Io(e.into())),
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(pattern) = &self.pattern {
                let name = entry.file_name().to_string_lossy();
                if !pattern.matches(&name) {
                    continue;
                }
            }

            files.push(entry.into_path());
        }

        files.sort_by(|a, b| natural_cmp(&file_name_of(a), &file_name_of(b)));
        Ok(files)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// One run of digits or non-digits in a natural sort key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalChunk {
    Number(u128, usize),
    Text(String),
}

fn natural_key(s: &str) -> Vec<NaturalChunk> {
    NATURAL_CHUNK
        .find_iter(s)
        .map(|m| {
            let text = m.as_str();
            match text.parse::<u128>() {
                // Length breaks ties between "7" and "007"
                Ok(n) => NaturalChunk::Number(n, text.len()),
                Err(_) => NaturalChunk::Text(text.to_lowercase()),
            }
        })
        .collect()
}

/// Compare strings with digit runs ordered numerically
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a)
        .cmp(&natural_key(b))
        .then_with(|| a.cmp(b))
}
