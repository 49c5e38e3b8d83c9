//! Per-page validation: capture, recognize, check.

use chrono::Utc;
use std::time::Instant;
use tracing::debug;

use crate::checks;
use crate::config;
use crate::recognition::{AdapterConfig, AdapterError, CaptureAdapter, Recognizer};
use crate::registry::PageSpec;
use crate::runner::PageResult;
use crate::snapshot::CaptureTarget;

/// Settings for validating pages
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    /// Capture the whole scrollable page instead of the viewport
    pub full_surface: bool,
    /// Only assert that capture succeeds; no recognition, no checks
    pub skip_service_check: bool,
    /// Word ratio required by title and expected-text matches
    pub tolerance: f64,
    pub adapter: AdapterConfig,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            full_surface: true,
            skip_service_check: cfg.suite.skip_service_check,
            tolerance: cfg.suite.tolerance,
            adapter: AdapterConfig::default(),
        }
    }
}

/// A page that could not be validated
///
/// Carries the result already recorded for the page so the caller can keep
/// it whether it continues or aborts.
#[derive(Debug, thiserror::Error)]
#[error("page '{}' failed: {error}", .result.page_name)]
pub struct PageFailure {
    pub result: PageResult,
    #[source]
    pub error: AdapterError,
}

/// Validates one page; owns the capture/recognition cache for that page
pub struct PageValidator<'r, R: Recognizer> {
    adapter: CaptureAdapter<'r, R>,
    options: ValidatorOptions,
}

impl<'r, R: Recognizer> PageValidator<'r, R> {
    pub fn new(recognizer: &'r R, options: ValidatorOptions) -> Self {
        Self {
            adapter: CaptureAdapter::new(recognizer, options.adapter.clone()),
            options,
        }
    }

    pub fn adapter(&self) -> &CaptureAdapter<'r, R> {
        &self.adapter
    }

    pub async fn validate<T: CaptureTarget>(
        &mut self,
        page: &PageSpec,
        target: &mut T,
    ) -> Result<PageResult, PageFailure> {
        let started = Instant::now();
        let outcome = self.run(page, target).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        // Stamped when the result is built, after capture and recognition
        let timestamp = Utc::now();

        match outcome {
            Ok((screenshot, checks)) => {
                let passed = checks.iter().all(|c| c.passed);
                debug!(page = %page.name, passed, checks = checks.len(), "page validated");
                Ok(PageResult {
                    page_name: page.name.clone(),
                    route: page.route.clone(),
                    passed,
                    checks,
                    screenshot_path: Some(screenshot),
                    error: None,
                    duration_ms,
                    timestamp,
                })
            }
            Err(error) => Err(PageFailure {
                result: PageResult {
                    page_name: page.name.clone(),
                    route: page.route.clone(),
                    passed: false,
                    checks: Vec::new(),
                    screenshot_path: self.adapter.last_artifact().map(Into::into),
                    error: Some(error.to_string()),
                    duration_ms,
                    timestamp,
                },
                error,
            }),
        }
    }

    async fn run<T: CaptureTarget>(
        &mut self,
        page: &PageSpec,
        target: &mut T,
    ) -> Result<(std::path::PathBuf, Vec<checks::CheckOutcome>), AdapterError> {
        target.navigate(&page.route).await?;
        let artifact = self.adapter.capture(target, self.options.full_surface).await?;

        if self.options.skip_service_check {
            return Ok((artifact, Vec::new()));
        }

        let recognition = self.adapter.recognize(&artifact).await?;
        let configured = page.checks(self.options.tolerance);
        Ok((artifact, checks::evaluate(&recognition, &configured)))
    }
}
