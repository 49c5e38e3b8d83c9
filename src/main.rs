use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use page_vision::config;
use page_vision::recognition::{AdapterConfig, OcrClient, OcrConfig, check_health};
use page_vision::registry::Registry;
use page_vision::report::{self, OutputFormat, Reporter, RunEnvironment, SuiteReport};
use page_vision::runner::{SuitePolicy, SuiteRun, SuiteRunner};
use page_vision::session::{Session, cleanup_old_sessions, list_sessions};
use page_vision::snapshot::{BrowserTarget, BrowserTargetConfig, CaptureTarget, FramebufferTarget};
use page_vision::validator::ValidatorOptions;

/// Page Vision - visual page validation with OCR
#[derive(Parser, Debug)]
#[command(
    name = "page-vision",
    about = "Validate web application pages by capturing them and checking the recognized text",
    after_help = "ENVIRONMENT VARIABLES:\n\
        PAGE_VISION_OCR_ENDPOINT          OCR service endpoint URL\n\
        PAGE_VISION_OCR_TIMEOUT_MS        Recognition timeout (ms)\n\
        PAGE_VISION_BASE_URL              Base URL of the application under test\n\
        PAGE_VISION_BROWSER               Headless browser binary\n\
        PAGE_VISION_VIEWPORT              Viewport preset or WxH\n\
        PAGE_VISION_HEADLESS              Run the browser headless\n\
        PAGE_VISION_SKIP_SERVICE_CHECK    Only assert that pages can be captured\n\
        PAGE_VISION_CONTINUE_ON_FAILURE   Keep going after a page fails to capture\n\
        PAGE_VISION_SESSION_DIR           Base directory for run sessions\n\
        RUST_LOG                          Log filter (default: page_vision=info)"
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TargetKind {
    /// Headless Chromium-compatible browser
    Browser,
    /// Offline framebuffer rendering of each page's expectations
    Mock,
}

impl TargetKind {
    fn name(self) -> &'static str {
        match self {
            TargetKind::Browser => "browser",
            TargetKind::Mock => "mock",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RenderFormat {
    Json,
    Markdown,
    Html,
}

impl From<RenderFormat> for OutputFormat {
    fn from(format: RenderFormat) -> Self {
        match format {
            RenderFormat::Json => OutputFormat::JsonPretty,
            RenderFormat::Markdown => OutputFormat::Markdown,
            RenderFormat::Html => OutputFormat::Html,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every page of a registry and write reports
    Run {
        /// Page registry JSON file
        #[arg(short, long, default_value = "registry.json")]
        registry: PathBuf,

        /// Base URL of the application under test
        #[arg(long, env = config::ENV_BASE_URL, default_value = config::DEFAULT_BASE_URL)]
        base_url: String,

        /// OCR service endpoint
        #[arg(long, env = config::ENV_OCR_ENDPOINT, default_value = config::DEFAULT_OCR_ENDPOINT)]
        ocr_endpoint: String,

        /// Recognition timeout in milliseconds
        #[arg(long, env = config::ENV_OCR_TIMEOUT_MS, default_value_t = config::DEFAULT_OCR_TIMEOUT_MS)]
        ocr_timeout_ms: u64,

        /// Session directory for screenshots and reports (default: new dir under the session base)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Capture target
        #[arg(long, value_enum, default_value_t = TargetKind::Browser)]
        target: TargetKind,

        /// Browser binary used by the browser target
        #[arg(long, env = config::ENV_BROWSER, default_value = config::DEFAULT_BROWSER)]
        browser: String,

        /// Extra flag for the browser binary (repeatable), e.g. --browser-arg=--no-sandbox
        #[arg(long = "browser-arg", value_name = "FLAG", allow_hyphen_values = true)]
        browser_args: Vec<String>,

        /// Viewport: desktop, laptop, tablet, mobile or WxH
        #[arg(long, env = config::ENV_VIEWPORT, default_value = config::DEFAULT_VIEWPORT)]
        viewport: String,

        /// Run the browser headless
        #[arg(
            long,
            env = config::ENV_HEADLESS,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_value = "true",
            default_missing_value = "true",
            value_parser = BoolishValueParser::new()
        )]
        headless: bool,

        /// Only assert that each page can be captured; no OCR, no checks
        #[arg(
            long,
            env = config::ENV_SKIP_SERVICE_CHECK,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_value = "false",
            default_missing_value = "true",
            value_parser = BoolishValueParser::new()
        )]
        skip_service_check: bool,

        /// Record pages that fail to capture and keep going
        #[arg(
            long,
            env = config::ENV_CONTINUE_ON_FAILURE,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_value = "true",
            default_missing_value = "true",
            value_parser = BoolishValueParser::new()
        )]
        continue_on_failure: bool,

        /// Word ratio needed for fuzzy title and text matches
        #[arg(long, env = config::ENV_TOLERANCE, default_value_t = config::DEFAULT_TOLERANCE)]
        tolerance: f64,

        /// Capture the viewport only instead of the full page
        #[arg(long)]
        viewport_only: bool,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,
    },

    /// Print the pages of a registry grouped by module
    List {
        #[arg(short, long, default_value = "registry.json")]
        registry: PathBuf,
    },

    /// Check that the OCR service is reachable
    Health {
        #[arg(long, env = config::ENV_OCR_ENDPOINT, default_value = config::DEFAULT_OCR_ENDPOINT)]
        ocr_endpoint: String,

        /// Probe timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },

    /// Re-render reports from a saved report.json
    Render {
        /// Saved report.json
        report: PathBuf,

        /// Print one format to stdout instead of writing all of them
        #[arg(short, long, value_enum)]
        format: Option<RenderFormat>,

        /// Directory to write reports to (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove old run sessions
    Clean {
        /// Remove sessions older than this many hours
        #[arg(long, default_value_t = 24)]
        max_age_hours: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("page_vision=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Run {
            registry,
            base_url,
            ocr_endpoint,
            ocr_timeout_ms,
            output,
            target,
            browser,
            browser_args,
            viewport,
            headless,
            skip_service_check,
            continue_on_failure,
            tolerance,
            viewport_only,
            json,
        } => {
            if target == TargetKind::Browser && !headless {
                return Err(
                    "the browser target only captures headless; drop --headless false or use --target mock"
                        .into(),
                );
            }
            let pages = Registry::from_file(&registry)?;
            let (width, height) = config::parse_viewport(&viewport).ok_or_else(|| {
                format!(
                    "Invalid viewport '{}'. Use: desktop, laptop, tablet, mobile, or WxH",
                    viewport
                )
            })?;

            let session = match &output {
                Some(dir) => Session::in_dir(dir),
                None => Session::new(),
            };
            session.init(Some(registry.as_path()), &base_url)?;

            let policy = SuitePolicy {
                continue_on_failure,
                skip_service_check,
            };
            let options = ValidatorOptions {
                full_surface: !viewport_only,
                skip_service_check,
                tolerance,
                adapter: AdapterConfig::default()
                    .timeout(Duration::from_millis(ocr_timeout_ms)),
            };
            let ocr = OcrClient::new(OcrConfig::new(&ocr_endpoint));

            if !skip_service_check {
                match check_health(ocr.endpoint(), 5).await {
                    Ok(true) => info!(endpoint = %ocr.endpoint(), "OCR service responding"),
                    _ => warn!(
                        endpoint = %ocr.endpoint(),
                        "OCR service not responding, evidence-free checks will pass without recognition"
                    ),
                }
            }

            let outcome = match target {
                TargetKind::Browser => {
                    let config = browser_args.into_iter().fold(
                        BrowserTargetConfig::new(&base_url, session.screenshots_dir())
                            .binary(browser)
                            .viewport(width, height)
                            .headless(headless),
                        BrowserTargetConfig::arg,
                    );
                    let mut browser = BrowserTarget::new(config);
                    run_suite(&ocr, &mut browser, &pages, policy, options).await
                }
                TargetKind::Mock => {
                    let mut mock = mock_target(&pages, session.screenshots_dir(), width, height);
                    run_suite(&ocr, &mut mock, &pages, policy, options).await
                }
            };

            let environment = RunEnvironment::new(target.name(), headless, policy);
            let (report, aborted) = match outcome {
                Ok(run) => (SuiteReport::from_run(run, environment), None),
                Err(aborted) => {
                    let message = aborted.to_string();
                    (SuiteReport::from_run(aborted.run, environment), Some(message))
                }
            };

            let written = report::write_all(&report, &session.dir)?;

            if json {
                println!("{}", Reporter::new(OutputFormat::JsonPretty).format_results(&report)?);
            } else {
                print_summary(&report);
                println!();
                for path in &written {
                    println!("Report: {}", path.display());
                }
                println!(
                    "Session: {} ({} screenshots)",
                    session.dir.display(),
                    session.list_captures()?.len()
                );
            }

            if let Some(message) = aborted {
                return Err(message.into());
            }
            if report.stats.failed > 0 {
                return Err(format!(
                    "{} of {} pages failed",
                    report.stats.failed, report.stats.total
                )
                .into());
            }
        }

        Commands::List { registry } => {
            let pages = Registry::from_file(&registry)?;
            let tolerance = config::get().suite.tolerance;
            for module in &pages.modules {
                println!("{} ({} pages)", module.name, module.pages.len());
                for page in &module.pages {
                    let checks: Vec<&str> = page
                        .checks(tolerance)
                        .iter()
                        .map(|c| c.kind().label())
                        .collect();
                    let checks = if checks.is_empty() {
                        "capture only".to_string()
                    } else {
                        checks.join(", ")
                    };
                    println!("  {:<32} {:<32} [{}]", page.name, page.route, checks);
                }
            }
            println!();
            println!("{} pages in {} modules", pages.len(), pages.modules.len());
        }

        Commands::Health {
            ocr_endpoint,
            timeout,
        } => {
            if check_health(&ocr_endpoint, timeout).await? {
                println!("OCR service responding at {}", ocr_endpoint);
            } else {
                return Err(format!("OCR service not responding at {}", ocr_endpoint).into());
            }
        }

        Commands::Render {
            report: input,
            format,
            output,
        } => {
            let saved = report::load(&input)?;
            match format {
                Some(format) => {
                    print!("{}", Reporter::new(format.into()).format_results(&saved)?);
                }
                None => {
                    let dir = output
                        .or_else(|| input.parent().map(Path::to_path_buf))
                        .unwrap_or_else(|| PathBuf::from("."));
                    for path in report::write_all(&saved, &dir)? {
                        println!("Report: {}", path.display());
                    }
                }
            }
        }

        Commands::Clean { max_age_hours } => {
            let removed = cleanup_old_sessions(Duration::from_secs(max_age_hours * 3600))?;
            println!(
                "Removed {} sessions from {}",
                removed,
                config::session_base_dir()
            );
            for path in list_sessions()? {
                println!("  kept {}", path.display());
            }
        }
    }

    Ok(())
}

async fn run_suite<T: CaptureTarget>(
    ocr: &OcrClient,
    target: &mut T,
    registry: &Registry,
    policy: SuitePolicy,
    options: ValidatorOptions,
) -> Result<SuiteRun, page_vision::runner::SuiteAborted> {
    SuiteRunner::new(ocr, target, policy)
        .with_options(options)
        .run(registry)
        .await
}

/// Framebuffer target showing each page's expected title and texts
fn mock_target(registry: &Registry, dir: PathBuf, width: u32, height: u32) -> FramebufferTarget {
    registry
        .pages()
        .fold(FramebufferTarget::new(dir, width, height), |target, (_, page)| {
            let lines: Vec<String> = page
                .expected_title
                .iter()
                .chain(page.expected_texts.iter().flatten())
                .cloned()
                .collect();
            target.page(page.route.clone(), lines)
        })
}

fn print_summary(report: &SuiteReport) {
    println!(
        "{} pages: {} passed, {} failed ({:.1}%) in {} ms",
        report.stats.total,
        report.stats.passed,
        report.stats.failed,
        report.stats.pass_rate,
        report.total_duration_ms
    );
    for (module, stats) in &report.by_module {
        println!(
            "  {:<20} {}/{} passed",
            module, stats.passed, stats.total
        );
    }
    for result in report.failed_pages() {
        println!("  FAIL {} ({})", result.page_name, result.route);
        if let Some(error) = &result.error {
            println!("       {}", error);
        }
        for check in result.checks.iter().filter(|c| !c.passed) {
            println!("       {}: {}", check.kind, check.message);
        }
    }
}
