//! Export of scans, comparisons and bulk results.
//!
//! JSON output is the serde form of the report types, pretty-printed. CSV
//! output is a flattened view meant for spreadsheets.

mod csv;
mod json;

pub use self::csv::{bulk_results_to_csv, comparison_to_csv, scan_to_csv};
pub use json::{comparison_to_json, scan_to_json};

use std::path::Path;

use anyhow::{Context, Result};

/// Writes `content` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
