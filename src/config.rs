//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for Page Vision, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults for a local OCR service and a local dev server
//! - A process-wide cached view via [`get`]
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PAGE_VISION_OCR_ENDPOINT` | OCR service endpoint URL | `http://127.0.0.1:8866/ocr` |
//! | `PAGE_VISION_OCR_TIMEOUT_MS` | Recognition timeout (milliseconds) | `30000` |
//! | `PAGE_VISION_OCR_CONNECT_TIMEOUT` | OCR connection timeout (seconds) | `10` |
//! | `PAGE_VISION_SESSION_DIR` | Base directory for run sessions | `/tmp/page-vision` |
//! | `PAGE_VISION_BASE_URL` | Base URL of the application under test | `http://localhost:3000` |
//! | `PAGE_VISION_BROWSER` | Headless browser binary | `chromium` |
//! | `PAGE_VISION_VIEWPORT` | Viewport preset or `WxH` | `desktop` |
//! | `PAGE_VISION_HEADLESS` | Run the browser headless | `true` |
//! | `PAGE_VISION_SKIP_SERVICE_CHECK` | Only assert that capture succeeds | `false` |
//! | `PAGE_VISION_CONTINUE_ON_FAILURE` | Keep going after a page fails to capture | `true` |
//! | `PAGE_VISION_TITLE_TOLERANCE` | Word ratio needed for fuzzy matches | `0.8` |
//!
//! # Example
//!
//! ```bash
//! # Point at a remote OCR service and give it more time
//! export PAGE_VISION_OCR_ENDPOINT="http://ocr.internal:8866/ocr"
//! export PAGE_VISION_OCR_TIMEOUT_MS=60000
//!
//! # OCR is down today, just make sure every page renders
//! export PAGE_VISION_SKIP_SERVICE_CHECK=1
//! ```

use std::env;
use std::sync::OnceLock;

// ============================================================================
// Default Values
// ============================================================================

/// Default OCR service endpoint
pub const DEFAULT_OCR_ENDPOINT: &str = "http://127.0.0.1:8866/ocr";

/// Default recognition timeout (milliseconds)
pub const DEFAULT_OCR_TIMEOUT_MS: u64 = 30_000;

/// Default OCR connection timeout (seconds)
pub const DEFAULT_OCR_CONNECT_TIMEOUT: u64 = 10;

/// Default session base directory
pub const DEFAULT_SESSION_DIR: &str = "/tmp/page-vision";

/// Default base URL of the application under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default browser binary used for captures
pub const DEFAULT_BROWSER: &str = "chromium";

/// Default viewport preset
pub const DEFAULT_VIEWPORT: &str = "desktop";

/// Default viewport width (pixels)
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1920;

/// Default viewport height (pixels)
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1080;

/// Default fuzzy-match tolerance for titles and required texts
pub const DEFAULT_TOLERANCE: f64 = 0.8;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_OCR_ENDPOINT: &str = "PAGE_VISION_OCR_ENDPOINT";
pub const ENV_OCR_TIMEOUT_MS: &str = "PAGE_VISION_OCR_TIMEOUT_MS";
pub const ENV_OCR_CONNECT_TIMEOUT: &str = "PAGE_VISION_OCR_CONNECT_TIMEOUT";
pub const ENV_SESSION_DIR: &str = "PAGE_VISION_SESSION_DIR";
pub const ENV_BASE_URL: &str = "PAGE_VISION_BASE_URL";
pub const ENV_BROWSER: &str = "PAGE_VISION_BROWSER";
pub const ENV_VIEWPORT: &str = "PAGE_VISION_VIEWPORT";
pub const ENV_HEADLESS: &str = "PAGE_VISION_HEADLESS";
pub const ENV_SKIP_SERVICE_CHECK: &str = "PAGE_VISION_SKIP_SERVICE_CHECK";
pub const ENV_CONTINUE_ON_FAILURE: &str = "PAGE_VISION_CONTINUE_ON_FAILURE";
pub const ENV_TOLERANCE: &str = "PAGE_VISION_TITLE_TOLERANCE";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for Page Vision
#[derive(Debug, Clone)]
pub struct Config {
    pub ocr: OcrSettings,
    pub browser: BrowserSettings,
    pub suite: SuiteSettings,
    pub session: SessionSettings,
}

/// OCR service settings
#[derive(Debug, Clone)]
pub struct OcrSettings {
    /// API endpoint URL
    pub endpoint: String,
    /// Recognition timeout (milliseconds)
    pub timeout_ms: u64,
    /// Connection timeout (seconds)
    pub connect_timeout: u64,
}

/// Browser capture settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Base URL that page routes are joined onto
    pub base_url: String,
    /// Browser binary
    pub binary: String,
    /// Viewport preset as given
    pub viewport: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headless: bool,
}

/// Suite run-mode toggles
#[derive(Debug, Clone)]
pub struct SuiteSettings {
    pub skip_service_check: bool,
    pub continue_on_failure: bool,
    pub tolerance: f64,
}

/// Session-related settings
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Base directory for session storage
    pub base_dir: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            ocr: OcrSettings::from_env(),
            browser: BrowserSettings::from_env(),
            suite: SuiteSettings::from_env(),
            session: SessionSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            ocr: OcrSettings::defaults(),
            browser: BrowserSettings::defaults(),
            suite: SuiteSettings::defaults(),
            session: SessionSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl OcrSettings {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var(ENV_OCR_ENDPOINT)
                .unwrap_or_else(|_| DEFAULT_OCR_ENDPOINT.to_string()),
            timeout_ms: env_parsed(ENV_OCR_TIMEOUT_MS).unwrap_or(DEFAULT_OCR_TIMEOUT_MS),
            connect_timeout: env_parsed(ENV_OCR_CONNECT_TIMEOUT)
                .unwrap_or(DEFAULT_OCR_CONNECT_TIMEOUT),
        }
    }

    pub fn defaults() -> Self {
        Self {
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_OCR_TIMEOUT_MS,
            connect_timeout: DEFAULT_OCR_CONNECT_TIMEOUT,
        }
    }
}

impl BrowserSettings {
    pub fn from_env() -> Self {
        let viewport = env::var(ENV_VIEWPORT).unwrap_or_else(|_| DEFAULT_VIEWPORT.to_string());
        let (width, height) = parse_viewport(&viewport)
            .unwrap_or((DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT));

        Self {
            base_url: env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            binary: env::var(ENV_BROWSER).unwrap_or_else(|_| DEFAULT_BROWSER.to_string()),
            viewport,
            viewport_width: width,
            viewport_height: height,
            headless: env_flag(ENV_HEADLESS).unwrap_or(true),
        }
    }

    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            binary: DEFAULT_BROWSER.to_string(),
            viewport: DEFAULT_VIEWPORT.to_string(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            headless: true,
        }
    }
}

impl SuiteSettings {
    pub fn from_env() -> Self {
        Self {
            skip_service_check: env_flag(ENV_SKIP_SERVICE_CHECK).unwrap_or(false),
            continue_on_failure: env_flag(ENV_CONTINUE_ON_FAILURE).unwrap_or(true),
            tolerance: env_parsed(ENV_TOLERANCE).unwrap_or(DEFAULT_TOLERANCE),
        }
    }

    pub fn defaults() -> Self {
        Self {
            skip_service_check: false,
            continue_on_failure: true,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SessionSettings {
    pub fn from_env() -> Self {
        Self {
            base_dir: env::var(ENV_SESSION_DIR).unwrap_or_else(|_| DEFAULT_SESSION_DIR.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            base_dir: DEFAULT_SESSION_DIR.to_string(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|s| parse_flag(&s))
}

/// Parse a boolean toggle: "1/true/yes/on" and "0/false/no/off"
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Parse a viewport string into (width, height)
/// Supports: "desktop" (1920x1080), "laptop" (1366x768), "tablet" (768x1024), "mobile" (390x844), or "WxH"
pub fn parse_viewport(viewport: &str) -> Option<(u32, u32)> {
    match viewport.to_lowercase().as_str() {
        "desktop" => Some((1920, 1080)),
        "laptop" => Some((1366, 768)),
        "tablet" => Some((768, 1024)),
        "mobile" => Some((390, 844)),
        custom => {
            let (w, h) = custom.split_once('x')?;
            let w = w.parse().ok()?;
            let h = h.parse().ok()?;
            Some((w, h))
        }
    }
}

/// Get session base directory (convenience function)
pub fn session_base_dir() -> String {
    get().session.base_dir.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport_presets() {
        assert_eq!(parse_viewport("desktop"), Some((1920, 1080)));
        assert_eq!(parse_viewport("Laptop"), Some((1366, 768)));
        assert_eq!(parse_viewport("tablet"), Some((768, 1024)));
        assert_eq!(parse_viewport("mobile"), Some((390, 844)));
    }

    #[test]
    fn test_parse_viewport_custom() {
        assert_eq!(parse_viewport("1280x720"), Some((1280, 720)));
    }

    #[test]
    fn test_parse_viewport_invalid() {
        assert_eq!(parse_viewport("huge"), None);
        assert_eq!(parse_viewport("1280"), None);
        assert_eq!(parse_viewport("1280xabc"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert_eq!(config.ocr.endpoint, DEFAULT_OCR_ENDPOINT);
        assert_eq!(config.ocr.timeout_ms, 30_000);
        assert!(config.browser.headless);
        assert!(!config.suite.skip_service_check);
        assert!(config.suite.continue_on_failure);
        assert_eq!(config.suite.tolerance, 0.8);
        assert_eq!(config.session.base_dir, DEFAULT_SESSION_DIR);
    }
}
