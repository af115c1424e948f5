//! Scan configuration schema.
//!
//! Configuration is optional: `routescan scan` works with built-in defaults,
//! and picks up a `routescan.yaml` from the working directory when present.

use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["routescan.yaml", ".routescan.yaml"];

/// File extensions considered controller sources when none are configured.
const DEFAULT_EXTENSIONS: &[&str] = &["java"];

/// Build directories and generated trees skipped by default.
static DEFAULT_EXCLUDES: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "**/target/**",
        "**/build/**",
        "**/out/**",
        "**/node_modules/**",
        "**/src/test/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// Scan configuration, loaded from YAML or defaulted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// File extensions (without the dot) to consider.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns for paths to exclude, matched against paths relative
    /// to the scan root. Supports `**` for recursive matching.
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
    /// Whether to descend into hidden directories (default: false).
    #[serde(default)]
    pub include_hidden: Option<bool>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_excluded_paths() -> Vec<String> {
    DEFAULT_EXCLUDES.clone()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excluded_paths: default_excluded_paths(),
            include_hidden: None,
        }
    }
}

impl ScanConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ScanConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the explicitly given file, or discover one in the current
    /// directory, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }
        match discover_config() {
            Some(path) => Self::parse_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Returns whether hidden directories are scanned (defaults to false).
    pub fn include_hidden(&self) -> bool {
        self.include_hidden.unwrap_or(false)
    }

    /// Compile the exclusion globs into a matcher.
    pub fn exclusion_matcher(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid exclusion glob {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

/// Discover a config file in the current directory.
fn discover_config() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}
