//! Output formatting for scan results.
//!
//! Two formats:
//! - Pretty: colored terminal output, endpoints grouped by source file
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::extract::Endpoint;
use crate::scan::ScanResult;

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub endpoints: Vec<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonScanError>,
}

/// A per-file failure in JSON output.
#[derive(Serialize, Deserialize)]
pub struct JsonScanError {
    pub file: String,
    pub message: String,
}

/// Build the JSON report value for a scan.
pub fn json_report(path: &str, result: &ScanResult) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files_scanned: result.scanned,
        endpoints: result.endpoints.iter().cloned().collect(),
        errors: result
            .errors
            .iter()
            .map(|e| JsonScanError {
                file: e.path().to_string_lossy().to_string(),
                message: e.to_string(),
            })
            .collect(),
    }
}

/// Write results as JSON to stdout.
pub fn write_json(path: &str, result: &ScanResult) -> anyhow::Result<()> {
    let report = json_report(path, result);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Write results as colored, per-file grouped text to stdout.
pub fn write_pretty(path: &str, result: &ScanResult) {
    println!("{} {}", "Scanning".bold(), path);
    println!();

    if result.endpoints.is_empty() {
        println!("{}", "No endpoints found.".dimmed());
    }

    // The set is ordered file-first, so files arrive as contiguous runs.
    let mut current_file: Option<&str> = None;
    for endpoint in &result.endpoints {
        if current_file != Some(endpoint.file.as_str()) {
            if current_file.is_some() {
                println!();
            }
            println!("{}", endpoint.file.bold());
            current_file = Some(endpoint.file.as_str());
        }
        print_endpoint(endpoint);
    }

    println!();
    for error in &result.errors {
        eprintln!("{} {}", "Warning:".yellow(), error);
    }
    println!(
        "{} endpoint(s) across {} file(s) scanned",
        result.endpoints.len(),
        result.scanned
    );
}

fn print_endpoint(endpoint: &Endpoint) {
    let verbs = endpoint
        .methods
        .iter()
        .map(|m| m.green().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut line = format!(
        "  {:<40} [{}]  lines {}-{}",
        endpoint.path, verbs, endpoint.start_line, endpoint.end_line
    );
    if !endpoint.parameters.is_empty() {
        line.push_str(&format!("  params: {}", endpoint.parameters.join(", ").cyan()));
    }
    println!("{}", line);
}
