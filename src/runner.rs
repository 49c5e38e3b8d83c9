//! Suite execution over a page registry.
//!
//! Pages run one after another, module by module, in registry order. The
//! capture target is shared by every page, so nothing here runs in
//! parallel. Each page gets a fresh [`PageValidator`] and therefore a fresh
//! capture/recognition cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::checks::CheckOutcome;
use crate::config;
use crate::recognition::{AdapterError, Recognizer};
use crate::registry::Registry;
use crate::snapshot::CaptureTarget;
use crate::validator::{PageFailure, PageValidator, ValidatorOptions};

/// Result of validating one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub page_name: String,

    pub route: String,

    /// AND over every executed check
    pub passed: bool,

    pub checks: Vec<CheckOutcome>,

    /// Capture the checks ran against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<PathBuf>,

    /// Why the page could not be validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub duration_ms: u64,

    pub timestamp: DateTime<Utc>,
}

/// What to do when a page cannot be validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitePolicy {
    /// Record the failure and move on (otherwise stop the suite)
    pub continue_on_failure: bool,
    /// Skip recognition and checks, only require a capture
    pub skip_service_check: bool,
}

impl Default for SuitePolicy {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            continue_on_failure: cfg.suite.continue_on_failure,
            skip_service_check: cfg.suite.skip_service_check,
        }
    }
}

/// Accumulated results of one suite run
#[derive(Debug, Clone)]
pub struct SuiteRun {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per attempted page, in registry order
    pub results: Vec<PageResult>,
}

/// The suite stopped early because a page failed and the policy said abort
#[derive(Debug, thiserror::Error)]
#[error("suite aborted at page '{page}': {error}")]
pub struct SuiteAborted {
    /// Results up to and including the failing page
    pub run: SuiteRun,
    pub page: String,
    #[source]
    pub error: AdapterError,
}

/// Runs every page of a registry against one capture target
pub struct SuiteRunner<'a, R: Recognizer, T: CaptureTarget> {
    recognizer: &'a R,
    target: &'a mut T,
    policy: SuitePolicy,
    options: ValidatorOptions,
}

impl<'a, R: Recognizer, T: CaptureTarget> SuiteRunner<'a, R, T> {
    pub fn new(recognizer: &'a R, target: &'a mut T, policy: SuitePolicy) -> Self {
        Self {
            recognizer,
            target,
            policy,
            options: ValidatorOptions::default(),
        }
    }

    /// Override page validation settings; the policy's skip flag still wins
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn run(&mut self, registry: &Registry) -> Result<SuiteRun, SuiteAborted> {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(registry.len());
        let mut options = self.options.clone();
        options.skip_service_check = self.policy.skip_service_check;

        info!(
            pages = registry.len(),
            modules = registry.modules.len(),
            skip_service_check = self.policy.skip_service_check,
            continue_on_failure = self.policy.continue_on_failure,
            "starting page suite"
        );

        for (module, page) in registry.pages() {
            debug!(module, page = %page.name, route = %page.route, "validating page");
            let mut validator = PageValidator::new(self.recognizer, options.clone());
            match validator.validate(page, self.target).await {
                Ok(result) => {
                    if result.passed {
                        info!(module, page = %page.name, route = %page.route, duration_ms = result.duration_ms, "page passed");
                    } else {
                        let failed: Vec<&str> = result
                            .checks
                            .iter()
                            .filter(|c| !c.passed)
                            .map(|c| c.kind.label())
                            .collect();
                        warn!(module, page = %page.name, route = %page.route, failed = ?failed, "page failed checks");
                    }
                    results.push(result);
                }
                Err(PageFailure { result, error }) => {
                    error!(module, page = %page.name, route = %page.route, error = %error, "page could not be validated");
                    results.push(result);
                    if !self.policy.continue_on_failure {
                        return Err(SuiteAborted {
                            run: SuiteRun {
                                started_at,
                                finished_at: Utc::now(),
                                results,
                            },
                            page: page.name.clone(),
                            error,
                        });
                    }
                }
            }
        }

        Ok(SuiteRun {
            started_at,
            finished_at: Utc::now(),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::{AdapterConfig, RecognitionError, RecognitionResult};
    use crate::registry::PageSpec;
    use crate::snapshot::{SnapshotError, SnapshotResult};
    use std::path::Path;
    use std::time::Duration;

    struct Echo;

    impl Recognizer for Echo {
        async fn recognize(&self, artifact: &Path) -> Result<RecognitionResult, RecognitionError> {
            // The fake capture path doubles as the page text
            Ok(RecognitionResult::completed(artifact.display().to_string(), 0.9))
        }
    }

    /// Target that fails navigation for routes containing "broken"
    #[derive(Default)]
    struct Routes {
        current: String,
        visited: Vec<String>,
    }

    impl CaptureTarget for Routes {
        fn source_type(&self) -> &str {
            "routes"
        }

        async fn navigate(&mut self, route: &str) -> SnapshotResult<()> {
            self.visited.push(route.to_string());
            if route.contains("broken") {
                return Err(SnapshotError::Navigation(format!("{} returned 502", route)));
            }
            self.current = route.to_string();
            Ok(())
        }

        async fn capture(&mut self, _full_surface: bool) -> SnapshotResult<PathBuf> {
            Ok(PathBuf::from(&self.current))
        }
    }

    fn registry() -> Registry {
        Registry::new()
            .with_module(
                "datasets",
                [
                    PageSpec::new("list", "/datasets/list").title("datasets"),
                    PageSpec::new("broken", "/datasets/broken").title("datasets"),
                ],
            )
            .with_module("metrics", [PageSpec::new("overview", "/metrics").title("lineage")])
    }

    fn options() -> ValidatorOptions {
        ValidatorOptions {
            full_surface: false,
            skip_service_check: false,
            tolerance: 0.8,
            adapter: AdapterConfig {
                timeout: Duration::from_secs(5),
                throw_on_error: false,
            },
        }
    }

    #[tokio::test]
    async fn test_continue_on_failure_records_every_page_in_order() {
        let mut target = Routes::default();
        let policy = SuitePolicy {
            continue_on_failure: true,
            skip_service_check: false,
        };
        let run = SuiteRunner::new(&Echo, &mut target, policy)
            .with_options(options())
            .run(&registry())
            .await
            .unwrap();

        let summary: Vec<(&str, bool)> = run
            .results
            .iter()
            .map(|r| (r.page_name.as_str(), r.passed))
            .collect();
        assert_eq!(summary, vec![("list", true), ("broken", false), ("overview", false)]);
        assert!(run.results[1].error.as_deref().unwrap().contains("502"));
        assert!(run.finished_at >= run.started_at);
    }

    #[tokio::test]
    async fn test_abort_stops_after_first_failure() {
        let mut target = Routes::default();
        let policy = SuitePolicy {
            continue_on_failure: false,
            skip_service_check: false,
        };
        let aborted = SuiteRunner::new(&Echo, &mut target, policy)
            .with_options(options())
            .run(&registry())
            .await
            .unwrap_err();

        assert_eq!(aborted.page, "broken");
        assert_eq!(aborted.run.results.len(), 2);
        assert!(!aborted.run.results[1].passed);
        assert_eq!(target.visited, vec!["/datasets/list", "/datasets/broken"]);
    }

    #[tokio::test]
    async fn test_skip_service_check_passes_captured_pages() {
        let mut target = Routes::default();
        let policy = SuitePolicy {
            continue_on_failure: true,
            skip_service_check: true,
        };
        let run = SuiteRunner::new(&Echo, &mut target, policy)
            .with_options(options())
            .run(&registry())
            .await
            .unwrap();

        let passed: Vec<bool> = run.results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, vec![true, false, true]);
        assert!(run.results.iter().all(|r| r.checks.is_empty()));
    }
}
