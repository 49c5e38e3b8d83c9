//! Page Vision - visual page validation for web applications.
//!
//! This crate provides:
//! - Capture targets for headless browsers and an offline framebuffer
//! - OCR recognition over HTTP with timeout and fail-open handling
//! - A fixed catalog of page checks (title, expected texts, error text,
//!   success message, table rows)
//! - Sequential suite runs over a module-grouped page registry
//! - JSON, Markdown and HTML reports with per-module statistics
//!
//! # Example
//!
//! ```rust,no_run
//! use page_vision::recognition::{OcrClient, OcrConfig};
//! use page_vision::registry::{PageSpec, Registry};
//! use page_vision::runner::{SuitePolicy, SuiteRunner};
//! use page_vision::snapshot::{BrowserTarget, BrowserTargetConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new().with_module(
//!     "datasets",
//!     [PageSpec::new("Dataset list", "/datasets").title("Datasets").table(1)],
//! );
//!
//! let ocr = OcrClient::new(OcrConfig::default());
//! let mut browser = BrowserTarget::new(BrowserTargetConfig::new(
//!     "http://localhost:3000",
//!     "/tmp/page-vision/screenshots",
//! ));
//!
//! let run = SuiteRunner::new(&ocr, &mut browser, SuitePolicy::default())
//!     .run(&registry)
//!     .await?;
//! println!("{} pages validated", run.results.len());
//! # Ok(())
//! # }
//! ```

pub mod checks;
pub mod config;
pub mod matcher;
pub mod recognition;
pub mod registry;
pub mod report;
pub mod runner;
pub mod session;
pub mod snapshot;
pub mod validator;

pub use checks::{CheckKind, CheckOutcome, CheckSpec, TextRequirement};
pub use matcher::{MatchMode, match_ratio, matches};
pub use recognition::{
    AdapterConfig, AdapterError, CaptureAdapter, OcrClient, OcrConfig, RecognitionError,
    RecognitionResult, Recognizer,
};
pub use registry::{ModuleSpec, PageSpec, Registry, RegistryError};
pub use report::{OutputFormat, Reporter, RunEnvironment, SuiteReport, write_all};
pub use runner::{PageResult, SuiteAborted, SuitePolicy, SuiteRun, SuiteRunner};
pub use session::{Session, cleanup_old_sessions, list_sessions};
pub use snapshot::{
    BrowserTarget, BrowserTargetConfig, CaptureTarget, FramebufferTarget, MockFramebuffer,
    SnapshotError, SnapshotResult,
};
pub use validator::{PageFailure, PageValidator, ValidatorOptions};
