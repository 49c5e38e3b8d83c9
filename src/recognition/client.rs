//! HTTP OCR service client.
//!
//! Sends a captured PNG to an OCR endpoint and parses the recognized text
//! and tables out of the JSON answer. Requests go through `curl` so the
//! crate carries no HTTP stack of its own.
//!
//! # Configuration
//!
//! OCR settings can be configured via environment variables:
//! - `PAGE_VISION_OCR_ENDPOINT`: API endpoint URL
//! - `PAGE_VISION_OCR_CONNECT_TIMEOUT`: Connection timeout (seconds)
//!
//! The overall recognition timeout is enforced by the adapter, not here.
//!
//! # Wire format
//!
//! Request body:
//!
//! ```json
//! { "image": "<base64 png>", "format": "png", "extract_tables": true }
//! ```
//!
//! Response body (`text` may also be spelled `raw_text` or `rawText`):
//!
//! ```json
//! { "status": "completed", "text": "...", "confidence": 0.93,
//!   "tables": [{ "headers": ["a"], "rows": [["1"]] }] }
//! ```

use base64::Engine;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::types::{RecognitionError, RecognitionResult, RecognitionStatus, Recognizer, Table};
use crate::config;

/// Configuration for the OCR client
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// API endpoint URL
    pub endpoint: String,
    /// Timeout for the initial connection (seconds)
    pub connection_timeout: u64,
    /// Ask the service for table structure as well as text
    pub extract_tables: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            endpoint: cfg.ocr.endpoint.clone(),
            connection_timeout: cfg.ocr.connect_timeout,
            extract_tables: true,
        }
    }
}

impl OcrConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn connection_timeout(mut self, seconds: u64) -> Self {
        self.connection_timeout = seconds;
        self
    }

    pub fn extract_tables(mut self, extract: bool) -> Self {
        self.extract_tables = extract;
        self
    }
}

/// Recognizer backed by an HTTP OCR service
#[derive(Debug, Clone)]
pub struct OcrClient {
    config: OcrConfig,
}

impl OcrClient {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn post(&self, image_data: &[u8]) -> Result<Vec<u8>, RecognitionError> {
        let img_base64 = base64::engine::general_purpose::STANDARD.encode(image_data);
        let request = serde_json::json!({
            "image": img_base64,
            "format": "png",
            "extract_tables": self.config.extract_tables,
        });
        let request_json = serde_json::to_vec(&request)
            .map_err(|e| RecognitionError::InvalidResponse(e.to_string()))?;

        // Body goes through stdin, base64 screenshots exceed argv limits
        let mut child = Command::new("curl")
            .args([
                "-s",
                "-S",
                "-X",
                "POST",
                &self.config.endpoint,
                "-H",
                "Content-Type: application/json",
                "--data-binary",
                "@-",
                "--connect-timeout",
                &self.config.connection_timeout.to_string(),
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            RecognitionError::Io(std::io::Error::other("Failed to capture stdin"))
        })?;
        stdin.write_all(&request_json).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(RecognitionError::ConnectionFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

impl Recognizer for OcrClient {
    async fn recognize(&self, artifact: &Path) -> Result<RecognitionResult, RecognitionError> {
        let image_data = tokio::fs::read(artifact).await?;
        debug!(
            artifact = %artifact.display(),
            bytes = image_data.len(),
            endpoint = %self.config.endpoint,
            "sending capture to OCR service"
        );
        let body = self.post(&image_data).await?;
        parse_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "raw_text", alias = "rawText")]
    text: String,
    #[serde(default)]
    tables: Vec<ServiceTable>,
    #[serde(default)]
    confidence: f64,
    #[serde(default, alias = "errorMessage", alias = "error_message")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceTable {
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

/// Parse an OCR service response body.
///
/// A response whose status is `failed`/`error` becomes
/// [`RecognitionError::Service`] so the adapter's failure policy applies to
/// it like any other service failure.
pub fn parse_response(body: &[u8]) -> Result<RecognitionResult, RecognitionError> {
    let response: ServiceResponse = serde_json::from_slice(body)
        .map_err(|e| RecognitionError::InvalidResponse(e.to_string()))?;

    let status = match response.status.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("completed") | Some("success") | Some("ok") => RecognitionStatus::Completed,
        Some("failed") | Some("error") => RecognitionStatus::Failed,
        Some(other) => {
            return Err(RecognitionError::InvalidResponse(format!(
                "unknown status '{}'",
                other
            )));
        }
    };

    if status == RecognitionStatus::Failed {
        return Err(RecognitionError::Service(
            response.error.unwrap_or_else(|| "service reported failure".to_string()),
        ));
    }

    let tables = response
        .tables
        .into_iter()
        .map(|t| Table::new(t.headers, t.rows))
        .collect();

    Ok(RecognitionResult::completed(response.text, response.confidence).with_tables(tables))
}

/// Origin of an endpoint (scheme plus host and port) probed by [`check_health`].
///
/// Endpoints without a scheme are treated as plain HTTP.
pub fn health_probe_url(endpoint: &str) -> String {
    let (scheme, rest) = endpoint.split_once("://").unwrap_or(("http", endpoint));
    let host_port = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|h| !h.is_empty())
        .unwrap_or("127.0.0.1:8866");
    format!("{}://{}", scheme, host_port)
}

/// Check if an OCR endpoint is reachable (connection-only check).
///
/// Any HTTP answer, even 4xx/5xx, counts as reachable.
pub async fn check_health(endpoint: &str, timeout_secs: u64) -> Result<bool, RecognitionError> {
    let url = health_probe_url(endpoint);
    debug!(url = %url, "probing OCR service");

    let output = Command::new("curl")
        .args([
            "-s",
            "-o",
            "/dev/null",
            "-w",
            "%{http_code}",
            "--connect-timeout",
            &timeout_secs.to_string(),
            "--max-time",
            &timeout_secs.to_string(),
            "-I",
            &url,
        ])
        .output()
        .await?;

    let status = String::from_utf8_lossy(&output.stdout);
    // 000 means connection failed entirely
    let code: u16 = status.trim().parse().unwrap_or(0);
    Ok(code > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completed_response() {
        let body = br#"{
            "status": "completed",
            "text": "Dataset List\nName Owner",
            "confidence": 0.91,
            "tables": [{"headers": ["Name", "Owner"], "rows": [["orders", "etl"], ["users", "crm"]]}]
        }"#;
        let result = parse_response(body).unwrap();
        assert_eq!(result.status, RecognitionStatus::Completed);
        assert_eq!(result.raw_text, "Dataset List\nName Owner");
        assert_eq!(result.confidence, 0.91);
        assert_eq!(result.tables.len(), 1);
        assert_eq!(result.tables[0].row_count, 2);
        assert_eq!(result.tables[0].col_count, 2);
    }

    #[test]
    fn test_parse_alias_fields() {
        let body = br#"{"rawText": "hello", "confidence": 0.5}"#;
        let result = parse_response(body).unwrap();
        assert_eq!(result.raw_text, "hello");
        assert!(result.tables.is_empty());
    }

    #[test]
    fn test_parse_failed_response_is_error() {
        let body = br#"{"status": "failed", "errorMessage": "model not loaded"}"#;
        match parse_response(body) {
            Err(RecognitionError::Service(msg)) => assert_eq!(msg, "model not loaded"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_is_invalid() {
        assert!(matches!(
            parse_response(b"<html>502 Bad Gateway</html>"),
            Err(RecognitionError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_response(br#"{"status": "pending"}"#),
            Err(RecognitionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_health_probe_keeps_scheme() {
        assert_eq!(
            health_probe_url("https://ocr.internal:8443/v1/recognize"),
            "https://ocr.internal:8443"
        );
        assert_eq!(health_probe_url("http://localhost:8866/ocr"), "http://localhost:8866");
        assert_eq!(health_probe_url("localhost:9000/ocr"), "http://localhost:9000");
        assert_eq!(health_probe_url("http://"), "http://127.0.0.1:8866");
    }

    #[test]
    fn test_ocr_config_builder() {
        let config = OcrConfig::new("http://localhost:9000/ocr")
            .connection_timeout(3)
            .extract_tables(false);

        assert_eq!(config.endpoint, "http://localhost:9000/ocr");
        assert_eq!(config.connection_timeout, 3);
        assert!(!config.extract_tables);
    }
}
