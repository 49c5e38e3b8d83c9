//! JSON reporter for suite reports

use super::types::{ReportResult, SuiteReport};

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format a report as JSON, optionally pretty-printed
    pub fn format(report: &SuiteReport, pretty: bool) -> ReportResult<String> {
        let output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(output)
    }

    /// Load a report previously written by [`JsonReporter::format`]
    pub fn parse(json: &str) -> ReportResult<SuiteReport> {
        Ok(serde_json::from_str(json)?)
    }
}
