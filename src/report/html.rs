use std::fmt::Write;

use super::types::{ReportResult, SuiteReport};

const HTML_HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Page Validation Report</title>
    <style>
        :root {
            --color-passed: #22c55e;
            --color-failed: #ef4444;
            --color-bg: #f8fafc;
            --color-card: #ffffff;
            --color-border: #e2e8f0;
            --color-text: #1e293b;
            --color-text-muted: #64748b;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            background: var(--color-bg);
            color: var(--color-text);
            line-height: 1.6;
            padding: 2rem;
        }
        .container { max-width: 1200px; margin: 0 auto; }
        h1 { font-size: 1.875rem; font-weight: 700; margin-bottom: 0.5rem; }
        h2 { font-size: 1.25rem; font-weight: 600; margin: 1.5rem 0 1rem; }
        .meta { color: var(--color-text-muted); font-size: 0.875rem; margin-bottom: 1.5rem; }
        .summary-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 1rem; margin-bottom: 2rem; }
        .summary-card { background: var(--color-card); border-radius: 0.5rem; padding: 1.25rem; border: 1px solid var(--color-border); text-align: center; }
        .summary-card .value { font-size: 2rem; font-weight: 700; display: block; }
        .summary-card .label { font-size: 0.875rem; color: var(--color-text-muted); }
        .summary-card.passed .value { color: var(--color-passed); }
        .summary-card.failed .value { color: var(--color-failed); }
        table { width: 100%; border-collapse: collapse; background: var(--color-card); border: 1px solid var(--color-border); margin-bottom: 1.5rem; }
        th, td { padding: 0.75rem 1rem; text-align: left; border-bottom: 1px solid var(--color-border); font-size: 0.875rem; vertical-align: top; }
        th { background: var(--color-bg); font-weight: 600; color: var(--color-text-muted); text-transform: uppercase; letter-spacing: 0.05em; }
        .status { font-weight: 600; }
        .status.passed { color: var(--color-passed); }
        .status.failed { color: var(--color-failed); }
        ul.checks { list-style: none; }
        ul.checks li.failed { color: var(--color-failed); }
        code { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; }
    </style>
</head>
<body>
<div class="container">
"#;

const HTML_FOOTER: &str = "</div>\n</body>\n</html>\n";

pub struct HtmlReporter;

impl HtmlReporter {
    pub fn format(report: &SuiteReport) -> ReportResult<String> {
        let mut output = String::from(HTML_HEADER);

        writeln!(output, "<h1>Page Validation Report</h1>")?;
        writeln!(
            output,
            "<p class=\"meta\">{} &middot; {} ms &middot; {} &middot; page-vision {}</p>",
            report.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            report.total_duration_ms,
            html_escape(&report.environment.host),
            html_escape(&report.environment.version)
        )?;

        writeln!(output, "<div class=\"summary-grid\">")?;
        Self::summary_card(&mut output, "", report.stats.total, "Total")?;
        Self::summary_card(&mut output, "passed", report.stats.passed, "Passed")?;
        Self::summary_card(&mut output, "failed", report.stats.failed, "Failed")?;
        writeln!(
            output,
            "<div class=\"summary-card\"><span class=\"value\">{:.1}%</span><span class=\"label\">Pass rate</span></div>",
            report.stats.pass_rate
        )?;
        writeln!(output, "</div>")?;

        writeln!(output, "<h2>Modules</h2>")?;
        writeln!(output, "<table>")?;
        writeln!(
            output,
            "<tr><th>Module</th><th>Total</th><th>Passed</th><th>Failed</th></tr>"
        )?;
        for (module, stats) in &report.by_module {
            writeln!(
                output,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(module),
                stats.total,
                stats.passed,
                stats.failed
            )?;
        }
        writeln!(output, "</table>")?;

        writeln!(output, "<h2>Pages</h2>")?;
        writeln!(output, "<table>")?;
        writeln!(
            output,
            "<tr><th>Status</th><th>Page</th><th>Route</th><th>Checks</th><th>Duration</th></tr>"
        )?;
        for result in &report.results {
            let (class, label) = if result.passed {
                ("passed", "PASS")
            } else {
                ("failed", "FAIL")
            };
            write!(
                output,
                "<tr><td class=\"status {}\">{}</td><td>{}</td><td><code>{}</code></td><td><ul class=\"checks\">",
                class,
                label,
                html_escape(&result.page_name),
                html_escape(&result.route)
            )?;
            if let Some(error) = &result.error {
                write!(output, "<li class=\"failed\">{}</li>", html_escape(error))?;
            }
            for check in &result.checks {
                write!(
                    output,
                    "<li class=\"{}\">{}: {}</li>",
                    if check.passed { "passed" } else { "failed" },
                    check.kind,
                    html_escape(&check.message)
                )?;
            }
            writeln!(output, "</ul></td><td>{} ms</td></tr>", result.duration_ms)?;
        }
        writeln!(output, "</table>")?;

        output.push_str(HTML_FOOTER);
        Ok(output)
    }

    fn summary_card(output: &mut String, class: &str, value: usize, label: &str) -> ReportResult<()> {
        writeln!(
            output,
            "<div class=\"summary-card {}\"><span class=\"value\">{}</span><span class=\"label\">{}</span></div>",
            class, value, label
        )?;
        Ok(())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
