use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::runner::{PageResult, SuitePolicy, SuiteRun};

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to format report: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Totals across every page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuiteStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage in `[0, 100]`, zero for an empty run
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Where and how the suite ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEnvironment {
    pub host: String,
    pub version: String,
    /// Capture target kind, e.g. "browser"
    pub target: String,
    pub headless: bool,
    pub skip_service_check: bool,
    pub continue_on_failure: bool,
}

impl RunEnvironment {
    pub fn new(target: impl Into<String>, headless: bool, policy: SuitePolicy) -> Self {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            host,
            version: env!("CARGO_PKG_VERSION").to_string(),
            target: target.into(),
            headless,
            skip_service_check: policy.skip_service_check,
            continue_on_failure: policy.continue_on_failure,
        }
    }
}

/// Aggregated outcome of one suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration_ms: u64,
    pub stats: SuiteStats,
    /// Keyed by module, in order of first appearance
    pub by_module: IndexMap<String, ModuleStats>,
    pub results: Vec<PageResult>,
    pub environment: RunEnvironment,
}

impl SuiteReport {
    pub fn build(
        results: Vec<PageResult>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        environment: RunEnvironment,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };

        let mut by_module: IndexMap<String, ModuleStats> = IndexMap::new();
        for result in &results {
            let stats = by_module.entry(module_key(&result.route)).or_default();
            stats.total += 1;
            if result.passed {
                stats.passed += 1;
            } else {
                stats.failed += 1;
            }
        }

        let total_duration_ms = (end_time - start_time).num_milliseconds().max(0) as u64;

        Self {
            start_time,
            end_time,
            total_duration_ms,
            stats: SuiteStats {
                total,
                passed,
                failed: total - passed,
                pass_rate,
            },
            by_module,
            results,
            environment,
        }
    }

    pub fn from_run(run: SuiteRun, environment: RunEnvironment) -> Self {
        Self::build(run.results, run.started_at, run.finished_at, environment)
    }

    pub fn failed_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Module a route belongs to: its first path segment, or "root"
///
/// `/datasets/list?page=2` belongs to `datasets`, `/` and `` to `root`.
pub fn module_key(route: &str) -> String {
    let path = route.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("root")
        .to_string()
}
