//! Command-line interface for routescan.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::ScanConfig;
use crate::report;
use crate::scan::{self, Scanner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Static route extraction - recover the HTTP attack surface from web
/// controller sources.
///
/// Routescan reads controller classes as a flat token stream - no compiler,
/// no AST - and reconstructs the endpoints they expose: URL pattern, allowed
/// HTTP methods, and the request parameters each handler reads.
#[derive(Parser)]
#[command(name = "routescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract route endpoints from a file or directory
    #[command(visible_alias = "extract")]
    Scan(ScanArgs),
    /// Create a starter routescan configuration file
    Init(InitArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "routescan.yaml")]
    pub output: PathBuf,
}

/// Starter configuration written by `routescan init`.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Load config (explicit, discovered, or defaults)
    let config = match ScanConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match std::fs::metadata(&abs_path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Collect files to scan
    let files = if metadata.is_dir() {
        scan::collect_files(&abs_path, &config)?
    } else {
        vec![abs_path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let base_dir = if metadata.is_dir() {
        abs_path.clone()
    } else {
        abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone())
    };

    let scanner = Scanner::new(&base_dir);
    let result = scanner.run(&files);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &result)?,
        _ => report::write_pretty(&path_str, &result),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: routescan scan . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_as_config() {
        let config: ScanConfig = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert!(config.extensions.contains(&"java".to_string()));
    }

    #[test]
    fn test_init_refuses_existing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("routescan.yaml");
        std::fs::write(&output, "already here").unwrap();

        let code = run_init(&InitArgs {
            output: output.clone(),
        })
        .unwrap();
        assert_eq!(code, EXIT_ERROR);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "already here");
    }

    #[test]
    fn test_init_writes_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("conf").join("routescan.yaml");

        let code = run_init(&InitArgs {
            output: output.clone(),
        })
        .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            DEFAULT_CONFIG_TEMPLATE
        );
    }
}
