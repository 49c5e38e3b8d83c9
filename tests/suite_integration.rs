//! End-to-end suite runs against the framebuffer target

use std::path::Path;

use page_vision::checks::{CheckKind, TextRequirement};
use page_vision::recognition::{
    AdapterConfig, RecognitionError, RecognitionResult, Recognizer, Table,
};
use page_vision::registry::{PageSpec, Registry};
use page_vision::report::{self, OutputFormat, Reporter, RunEnvironment, SuiteReport};
use page_vision::runner::{SuitePolicy, SuiteRunner};
use page_vision::snapshot::{FramebufferTarget, route_slug};
use page_vision::validator::ValidatorOptions;
use pretty_assertions::assert_eq;

/// Answers with canned text per route, keyed by the route slug in the
/// capture file name
struct CannedOcr {
    pages: Vec<(String, Result<RecognitionResult, String>)>,
}

impl CannedOcr {
    fn new() -> Self {
        Self { pages: Vec::new() }
    }

    fn text(mut self, route: &str, text: &str) -> Self {
        self.pages
            .push((route_slug(route), Ok(RecognitionResult::completed(text, 0.95))));
        self
    }

    fn result(mut self, route: &str, result: RecognitionResult) -> Self {
        self.pages.push((route_slug(route), Ok(result)));
        self
    }

    fn unavailable(mut self, route: &str, reason: &str) -> Self {
        self.pages.push((route_slug(route), Err(reason.to_string())));
        self
    }
}

impl Recognizer for CannedOcr {
    async fn recognize(&self, artifact: &Path) -> Result<RecognitionResult, RecognitionError> {
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Longest slug first so "datasets_42" wins over "datasets"
        let mut candidates: Vec<_> = self
            .pages
            .iter()
            .filter(|(slug, _)| name.starts_with(&format!("framebuffer_{}_", slug)))
            .collect();
        candidates.sort_by_key(|(slug, _)| std::cmp::Reverse(slug.len()));
        match candidates.first() {
            Some((_, Ok(result))) => Ok(result.clone()),
            Some((_, Err(reason))) => Err(RecognitionError::Service(reason.clone())),
            None => Ok(RecognitionResult::completed("", 0.0)),
        }
    }
}

fn options() -> ValidatorOptions {
    ValidatorOptions {
        full_surface: true,
        skip_service_check: false,
        tolerance: 0.8,
        adapter: AdapterConfig::default(),
    }
}

fn policy(continue_on_failure: bool, skip_service_check: bool) -> SuitePolicy {
    SuitePolicy {
        continue_on_failure,
        skip_service_check,
    }
}

fn target(dir: &Path, registry: &Registry) -> FramebufferTarget {
    registry
        .pages()
        .fold(FramebufferTarget::new(dir, 320, 200), |t, (_, page)| {
            t.page(page.route.clone(), [page.name.clone()])
        })
}

fn environment(policy: SuitePolicy) -> RunEnvironment {
    RunEnvironment::new("mock", true, policy)
}

fn registry() -> Registry {
    Registry::new()
        .with_module(
            "home",
            [PageSpec::new("Home", "/").title("Dashboard").forbid(Vec::<String>::new())],
        )
        .with_module(
            "datasets",
            [
                PageSpec::new("Dataset list", "/datasets")
                    .title("Datasets")
                    .texts(["Name", "Owner"])
                    .require(TextRequirement::All)
                    .table(2),
                PageSpec::new("Dataset detail", "/datasets/42").forbid(["quota exceeded"]),
            ],
        )
        .with_module(
            "quality",
            [
                PageSpec::new("Monitor", "/quality/monitor").title("data quality monitor"),
                PageSpec::new("Save rule", "/quality/rules/new")
                    .title("New rule")
                    .success(["saved"]),
            ],
        )
}

fn ocr() -> CannedOcr {
    CannedOcr::new()
        .text("/", "Welcome to the Dashboard area")
        .result(
            "/datasets",
            RecognitionResult::completed("Datasets\nName Owner Updated", 0.9).with_tables(vec![
                Table::new(
                    vec!["Name".into(), "Owner".into()],
                    vec![vec!["orders".into(), "ana".into()], vec!["users".into(), "li".into()]],
                ),
            ]),
        )
        .text("/datasets/42", "An unexpected error occurred (500)")
        .text("/quality/monitor", "quality monitoring dashboard for data")
        .unavailable("/quality/rules/new", "OCR service returned 503")
}

#[tokio::test]
async fn test_full_suite_report() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let recognizer = ocr();
    let mut target = target(dir.path(), &registry);
    let policy = policy(true, false);

    let run = SuiteRunner::new(&recognizer, &mut target, policy)
        .with_options(options())
        .run(&registry)
        .await
        .unwrap();
    let report = SuiteReport::from_run(run, environment(policy));

    let summary: Vec<(&str, bool)> = report
        .results
        .iter()
        .map(|r| (r.page_name.as_str(), r.passed))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Home", true),
            ("Dataset list", true),
            ("Dataset detail", false),
            ("Monitor", true),
            ("Save rule", false),
        ]
    );

    // Error keywords are listed by name
    let detail = &report.results[2];
    assert_eq!(detail.checks.len(), 1);
    assert_eq!(detail.checks[0].kind, CheckKind::ForbiddenTexts);
    assert!(detail.checks[0].message.contains("'error'"));
    assert!(detail.checks[0].message.contains("'500'"));

    // Recognition down: the title passes open, the success claim fails
    let save = &report.results[4];
    let outcomes: Vec<(CheckKind, bool)> = save.checks.iter().map(|c| (c.kind, c.passed)).collect();
    assert_eq!(
        outcomes,
        vec![(CheckKind::Title, true), (CheckKind::SuccessMessage, false)]
    );
    assert!(save.checks[1].message.contains("503"));
    assert!(save.error.is_none());

    assert_eq!(report.stats.total, 5);
    assert_eq!(report.stats.passed, 3);
    assert_eq!(report.stats.failed, 2);
    assert!((report.stats.pass_rate - 60.0).abs() < 1e-9);

    let modules: Vec<(&str, usize, usize)> = report
        .by_module
        .iter()
        .map(|(name, m)| (name.as_str(), m.total, m.failed))
        .collect();
    assert_eq!(
        modules,
        vec![("root", 1, 0), ("datasets", 2, 1), ("quality", 2, 1)]
    );

    assert!(report
        .results
        .iter()
        .all(|r| r.screenshot_path.as_ref().is_some_and(|p| p.exists())));
}

#[tokio::test]
async fn test_capture_failure_continue_vs_abort() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::new().with_module(
        "pages",
        [
            PageSpec::new("First", "/first").title("First"),
            PageSpec::new("Missing", "/missing").title("Missing"),
            PageSpec::new("Last", "/last").title("Last"),
        ],
    );
    // "/missing" is never rendered, so navigation fails there
    let mut target = FramebufferTarget::new(dir.path(), 320, 200)
        .page("/first", ["First"])
        .page("/last", ["Last"]);
    let recognizer = CannedOcr::new().text("/first", "First").text("/last", "Last");

    let run = SuiteRunner::new(&recognizer, &mut target, policy(true, false))
        .with_options(options())
        .run(&registry)
        .await
        .unwrap();
    let passed: Vec<bool> = run.results.iter().map(|r| r.passed).collect();
    assert_eq!(passed, vec![true, false, true]);
    assert!(run.results[1].checks.is_empty());
    assert!(run.results[1].error.as_deref().unwrap().contains("/missing"));

    let aborted = SuiteRunner::new(&recognizer, &mut target, policy(false, false))
        .with_options(options())
        .run(&registry)
        .await
        .unwrap_err();
    assert_eq!(aborted.page, "Missing");
    assert_eq!(aborted.run.results.len(), 2);

    let report = SuiteReport::from_run(aborted.run, environment(policy(false, false)));
    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.failed, 1);
}

#[tokio::test]
async fn test_skip_service_check_only_captures() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    // Every recognition would fail; none may be attempted
    let recognizer = CannedOcr::new()
        .unavailable("/", "down")
        .unavailable("/datasets", "down")
        .unavailable("/datasets/42", "down")
        .unavailable("/quality/monitor", "down")
        .unavailable("/quality/rules/new", "down");
    let mut target = target(dir.path(), &registry);

    let run = SuiteRunner::new(&recognizer, &mut target, policy(true, true))
        .with_options(options())
        .run(&registry)
        .await
        .unwrap();

    assert_eq!(run.results.len(), registry.len());
    assert!(run.results.iter().all(|r| r.passed && r.checks.is_empty()));
}

#[tokio::test]
async fn test_reports_written_and_rendered_consistently() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();
    let recognizer = ocr();
    let mut target = target(&dir.path().join("screenshots"), &registry);
    let policy = policy(true, false);

    let run = SuiteRunner::new(&recognizer, &mut target, policy)
        .with_options(options())
        .run(&registry)
        .await
        .unwrap();
    let report = SuiteReport::from_run(run, environment(policy));

    let written = report::write_all(&report, dir.path()).unwrap();
    assert_eq!(written.len(), 3);

    let reloaded = report::load(dir.path().join("report.json")).unwrap();
    assert_eq!(reloaded, report);

    let markdown = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    let html = std::fs::read_to_string(dir.path().join("report.html")).unwrap();
    for (module, stats) in &report.by_module {
        assert!(markdown.contains(&format!(
            "| {} | {} | {} | {} |",
            module, stats.total, stats.passed, stats.failed
        )));
        assert!(html.contains(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            module, stats.total, stats.passed, stats.failed
        )));
    }

    // Rendering the reloaded report gives the same bytes
    assert_eq!(
        Reporter::new(OutputFormat::Markdown).format_results(&reloaded).unwrap(),
        markdown
    );
}

#[tokio::test]
async fn test_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::new();
    let recognizer = CannedOcr::new();
    let mut target = FramebufferTarget::new(dir.path(), 320, 200);
    let policy = policy(true, false);

    let run = SuiteRunner::new(&recognizer, &mut target, policy)
        .with_options(options())
        .run(&registry)
        .await
        .unwrap();
    let report = SuiteReport::from_run(run, environment(policy));

    assert_eq!(report.stats.total, 0);
    assert_eq!(report.stats.pass_rate, 0.0);
    assert!(report.by_module.is_empty());
    assert!(Reporter::new(OutputFormat::Html).format_results(&report).is_ok());
}
