//! Directory scanning: file collection and parallel per-file extraction.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::extract::{self, Endpoint};

/// A per-file failure recorded during a scan. The scan itself keeps going.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ScanError {
    /// The file the failure belongs to.
    pub fn path(&self) -> &Path {
        match self {
            ScanError::Read { path, .. } => path,
        }
    }
}

/// Merged outcome of scanning a set of files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// All discovered endpoints, deduplicated and stably ordered.
    pub endpoints: BTreeSet<Endpoint>,
    /// Number of files successfully scanned.
    pub scanned: usize,
    /// Files that could not be read.
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one (set union).
    pub fn merge(&mut self, other: ScanResult) {
        self.endpoints.extend(other.endpoints);
        self.scanned += other.scanned;
        self.errors.extend(other.errors);
    }
}

/// Runs endpoint extraction over a set of files, one file per worker.
pub struct Scanner {
    base_dir: PathBuf,
}

impl Scanner {
    /// Create a scanner rooted at `base_dir`; endpoint file paths are
    /// reported relative to it where possible.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Extract endpoints from every file, in parallel.
    ///
    /// Each worker produces an independent descriptor set; the sets are
    /// merged by union afterward, so output ordering never depends on
    /// worker scheduling. Unreadable files are recorded, not fatal.
    pub fn run(&self, files: &[PathBuf]) -> ScanResult {
        let per_file: Vec<Result<BTreeSet<Endpoint>, ScanError>> = files
            .par_iter()
            .map(|path| self.scan_file(path))
            .collect();

        let mut result = ScanResult::new();
        for outcome in per_file {
            match outcome {
                Ok(endpoints) => {
                    result.scanned += 1;
                    result.endpoints.extend(endpoints);
                }
                Err(e) => result.errors.push(e),
            }
        }
        result
    }

    /// Scan a single file. I/O failure is the only error path; the
    /// extraction machine itself never fails.
    pub fn scan_file(&self, path: &Path) -> Result<BTreeSet<Endpoint>, ScanError> {
        let source = std::fs::read_to_string(path).map_err(|e| ScanError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let display = self.display_path(path);
        Ok(extract::parse_source(&display, &source))
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Collect candidate controller files under `root`.
///
/// Walks the tree skipping hidden directories (unless configured otherwise)
/// and configured exclusion globs, keeping files whose extension the config
/// lists.
pub fn collect_files(root: &Path, config: &ScanConfig) -> anyhow::Result<Vec<PathBuf>> {
    let excludes = config.exclusion_matcher()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            // The root is always entered, even when its own name is hidden.
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if e.file_type().is_dir() && name.starts_with('.') && !config.include_hidden() {
                return false;
            }
            true
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !config.extensions.iter().any(|want| want == ext) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.is_match(relative) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
