//! Headless browser capture target.
//!
//! Runs a Chromium-compatible binary once per capture with `--screenshot`,
//! pointed at `base_url + route`. Anything that renders the route and writes
//! a PNG works, so the binary is configurable.
//!
//! Screenshot mode only exists in headless mode: a headed browser ignores
//! `--screenshot` and never exits, so captures with `headless = false` are
//! refused before anything is spawned.

use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use super::types::{CaptureTarget, SnapshotError, SnapshotResult};
use super::utils::{generate_filename, generate_timestamp};
use crate::config;

/// Height used for full-page captures, the CLI screenshot mode cannot scroll
const FULL_SURFACE_HEIGHT: u32 = 4000;

/// Configuration for browser-based capture
#[derive(Debug, Clone)]
pub struct BrowserTargetConfig {
    /// Browser binary to execute
    pub binary: String,
    /// Base URL routes are joined onto
    pub base_url: String,
    /// Directory captures are written to
    pub output_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headless: bool,
    /// Extra flags passed before the URL
    pub extra_args: Vec<String>,
}

impl Default for BrowserTargetConfig {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            binary: cfg.browser.binary.clone(),
            base_url: cfg.browser.base_url.clone(),
            output_dir: PathBuf::from("./screenshots"),
            viewport_width: cfg.browser.viewport_width,
            viewport_height: cfg.browser.viewport_height,
            headless: cfg.browser.headless,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserTargetConfig {
    pub fn new(base_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Add an extra browser flag
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

/// Capture target backed by a headless browser process
pub struct BrowserTarget {
    config: BrowserTargetConfig,
    current: Option<(String, String)>,
}

impl BrowserTarget {
    pub fn new(config: BrowserTargetConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Join a route onto the base URL
    pub fn url_for(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }

    fn command_args(&self, url: &str, screenshot: &std::path::Path, full_surface: bool) -> Vec<String> {
        let height = if full_surface {
            self.config.viewport_height.max(FULL_SURFACE_HEIGHT)
        } else {
            self.config.viewport_height
        };

        let mut args = vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            format!("--window-size={},{}", self.config.viewport_width, height),
            format!("--screenshot={}", screenshot.display()),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(url.to_string());
        args
    }
}

impl CaptureTarget for BrowserTarget {
    fn source_type(&self) -> &str {
        "browser"
    }

    async fn navigate(&mut self, route: &str) -> SnapshotResult<()> {
        if !route.starts_with('/') {
            return Err(SnapshotError::Navigation(format!(
                "route '{}' must start with '/'",
                route
            )));
        }
        self.current = Some((route.to_string(), self.url_for(route)));
        Ok(())
    }

    async fn capture(&mut self, full_surface: bool) -> SnapshotResult<PathBuf> {
        let (route, url) = self
            .current
            .clone()
            .ok_or_else(|| SnapshotError::Capture("navigate before capturing".into()))?;
        if !self.config.headless {
            return Err(SnapshotError::Capture(format!(
                "cannot capture {} with a headed browser, screenshot mode needs headless",
                url
            )));
        }

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self
            .config
            .output_dir
            .join(generate_filename(self.source_type(), &route, &generate_timestamp()));
        let args = self.command_args(&url, &path, full_surface);

        debug!(binary = %self.config.binary, url = %url, "capturing page");
        let output = Command::new(&self.config.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                SnapshotError::Capture(format!("Failed to spawn '{}': {}", self.config.binary, e))
            })?;

        if !output.status.success() {
            return Err(SnapshotError::Navigation(format!(
                "{} exited with {} for {}: {}",
                self.config.binary,
                output.status,
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !tokio::fs::try_exists(&path).await? {
            return Err(SnapshotError::Capture(format!(
                "no screenshot written for {}",
                url
            )));
        }
        Ok(path)
    }
}
