//! Suite report aggregation and rendering
//!
//! [`SuiteReport::build`] turns the page results of one run into totals and
//! per-module counts. The renderers are pure functions of the report:
//!
//! - **JSON**: machine-readable, also the input of `page-vision render`
//! - **Markdown**: for CI summaries and pull requests
//! - **HTML**: standalone page for humans
//!
//! ```no_run
//! use page_vision::report::{OutputFormat, Reporter, SuiteReport};
//!
//! # fn example(report: SuiteReport) -> page_vision::report::ReportResult<()> {
//! let markdown = Reporter::new(OutputFormat::Markdown).format_results(&report)?;
//! println!("{}", markdown);
//!
//! page_vision::report::write_all(&report, "/tmp/page-vision/run")?;
//! # Ok(())
//! # }
//! ```

mod html;
mod json;
mod markdown;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use types::{
    ModuleStats, ReportError, ReportResult, RunEnvironment, SuiteReport, SuiteStats, module_key,
};

/// Output format for suite reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    #[default]
    JsonPretty,
    Markdown,
    Html,
}

impl OutputFormat {
    /// File name used when persisting this format
    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::JsonPretty => "report.json",
            OutputFormat::Markdown => "report.md",
            OutputFormat::Html => "report.html",
        }
    }
}

/// Reporter for suite reports
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_results(&self, report: &SuiteReport) -> ReportResult<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Markdown => MarkdownReporter::format(report),
            OutputFormat::Html => HtmlReporter::format(report),
        }
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, report: &SuiteReport, path: P) -> ReportResult<()> {
        let path = path.as_ref();
        let output = self.format_results(report)?;
        fs::write(path, output).map_err(|source| ReportError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

/// Write `report.json`, `report.md` and `report.html` into `dir`
///
/// Returns the written paths in that order.
pub fn write_all(report: &SuiteReport, dir: impl AsRef<Path>) -> ReportResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ReportError::Write {
        path: dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::with_capacity(3);
    for format in [OutputFormat::JsonPretty, OutputFormat::Markdown, OutputFormat::Html] {
        let path = dir.join(format.file_name());
        Reporter::new(format).write_to_file(report, &path)?;
        debug!(path = %path.display(), "report written");
        written.push(path);
    }
    Ok(written)
}

/// Load a saved `report.json`
pub fn load(path: impl AsRef<Path>) -> ReportResult<SuiteReport> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.display().to_string(),
        source,
    })?;
    JsonReporter::parse(&json)
}
