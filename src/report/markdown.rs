use std::fmt::Write;

use super::types::{ReportResult, SuiteReport};
use crate::runner::PageResult;

pub struct MarkdownReporter;

impl MarkdownReporter {
    const fn status_icon(passed: bool) -> &'static str {
        if passed { "✅" } else { "❌" }
    }

    pub fn format(report: &SuiteReport) -> ReportResult<String> {
        let mut output = String::new();

        writeln!(output, "# Page Validation Report")?;
        writeln!(output)?;
        writeln!(
            output,
            "- **Started**: {}",
            report.start_time.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(output, "- **Duration**: {} ms", report.total_duration_ms)?;
        writeln!(
            output,
            "- **Host**: {} (page-vision {}, target {})",
            report.environment.host, report.environment.version, report.environment.target
        )?;
        writeln!(output)?;

        writeln!(output, "## Summary")?;
        writeln!(output)?;
        writeln!(output, "| Metric | Value |")?;
        writeln!(output, "|--------|------:|")?;
        writeln!(output, "| Total pages | {} |", report.stats.total)?;
        writeln!(output, "| ✅ Passed | {} |", report.stats.passed)?;
        writeln!(output, "| ❌ Failed | {} |", report.stats.failed)?;
        writeln!(output, "| Pass rate | {:.1}% |", report.stats.pass_rate)?;
        writeln!(output)?;

        if !report.by_module.is_empty() {
            writeln!(output, "## Modules")?;
            writeln!(output)?;
            writeln!(output, "| Module | Total | Passed | Failed |")?;
            writeln!(output, "|--------|------:|-------:|-------:|")?;
            for (module, stats) in &report.by_module {
                writeln!(
                    output,
                    "| {} | {} | {} | {} |",
                    escape_cell(module),
                    stats.total,
                    stats.passed,
                    stats.failed
                )?;
            }
            writeln!(output)?;
        }

        if !report.results.is_empty() {
            writeln!(output, "## Pages")?;
            writeln!(output)?;
            writeln!(output, "| Status | Page | Route | Duration |")?;
            writeln!(output, "|:------:|------|-------|---------:|")?;
            for result in &report.results {
                writeln!(
                    output,
                    "| {} | {} | `{}` | {} ms |",
                    Self::status_icon(result.passed),
                    escape_cell(&result.page_name),
                    escape_cell(&result.route),
                    result.duration_ms
                )?;
            }
            writeln!(output)?;
        }

        let failed: Vec<&PageResult> = report.failed_pages().collect();
        if !failed.is_empty() {
            writeln!(output, "## Failures")?;
            for result in failed {
                writeln!(output)?;
                writeln!(
                    output,
                    "### {} (`{}`)",
                    escape_cell(&result.page_name),
                    escape_cell(&result.route)
                )?;
                writeln!(output)?;
                if let Some(error) = &result.error {
                    writeln!(output, "- ❌ {}", error)?;
                }
                for check in result.checks.iter().filter(|c| !c.passed) {
                    writeln!(output, "- ❌ **{}**: {}", check.kind, check.message)?;
                }
            }
        }

        Ok(output)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
