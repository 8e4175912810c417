//! JSON export.

use crate::compare::ComparisonReport;
use crate::scan::ScanResult;

pub fn scan_to_json(result: &ScanResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

pub fn comparison_to_json(report: &ComparisonReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
