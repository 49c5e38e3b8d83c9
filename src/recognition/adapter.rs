//! Capture-and-recognize round trip with a bounded timeout.
//!
//! The adapter owns the failure policy for recognition: by default a
//! service error or timeout becomes a failed [`RecognitionResult`] so callers
//! never see an error, with `throw_on_error` the error is returned instead.
//!
//! It also keeps the most recent capture and recognition so follow-up
//! questions ("is this text on the page?") can reuse the last capture
//! without taking a new one.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{RecognitionError, RecognitionResult, Recognizer};
use crate::config;
use crate::matcher::{self, MatchMode};
use crate::snapshot::{CaptureTarget, SnapshotError};

/// Errors surfaced by a capture-and-recognize round trip
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Capture(#[from] SnapshotError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

/// Adapter settings
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Upper bound for one recognition call
    pub timeout: Duration,
    /// Return recognition errors instead of a failed result
    pub throw_on_error: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(config::get().ocr.timeout_ms),
            throw_on_error: false,
        }
    }
}

impl AdapterConfig {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn throw_on_error(mut self, throw: bool) -> Self {
        self.throw_on_error = throw;
        self
    }
}

/// Last capture and recognition seen by one adapter
#[derive(Debug, Clone, Default)]
struct RecognitionCache {
    artifact: Option<PathBuf>,
    result: Option<RecognitionResult>,
}

impl RecognitionCache {
    fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    fn result(&self) -> Option<&RecognitionResult> {
        self.result.as_ref()
    }

    fn store_artifact(&mut self, artifact: PathBuf) {
        // A new capture invalidates the previous recognition
        self.artifact = Some(artifact);
        self.result = None;
    }

    fn store_result(&mut self, result: RecognitionResult) {
        self.result = Some(result);
    }
}

/// Acquires recognition results for captures of one target
pub struct CaptureAdapter<'r, R: Recognizer> {
    recognizer: &'r R,
    config: AdapterConfig,
    cache: RecognitionCache,
}

impl<'r, R: Recognizer> CaptureAdapter<'r, R> {
    pub fn new(recognizer: &'r R, config: AdapterConfig) -> Self {
        Self {
            recognizer,
            config,
            cache: RecognitionCache::default(),
        }
    }

    pub fn last_result(&self) -> Option<&RecognitionResult> {
        self.cache.result()
    }

    pub fn last_artifact(&self) -> Option<&Path> {
        self.cache.artifact()
    }

    /// Capture the target's current surface and remember the artifact
    pub async fn capture<T: CaptureTarget>(
        &mut self,
        target: &mut T,
        full_surface: bool,
    ) -> Result<PathBuf, SnapshotError> {
        let artifact = target.capture(full_surface).await?;
        debug!(artifact = %artifact.display(), source = target.source_type(), "captured surface");
        self.cache.store_artifact(artifact.clone());
        Ok(artifact)
    }

    /// Recognize a stored capture, applying the timeout and failure policy
    pub async fn recognize(
        &mut self,
        artifact: &Path,
    ) -> Result<RecognitionResult, RecognitionError> {
        let outcome =
            match tokio::time::timeout(self.config.timeout, self.recognizer.recognize(artifact))
                .await
            {
                Ok(inner) => inner,
                Err(_) => Err(RecognitionError::Timeout(self.config.timeout)),
            };

        let result = match outcome {
            Ok(result) => result,
            Err(err) if self.config.throw_on_error => return Err(err),
            Err(err) => {
                warn!(artifact = %artifact.display(), error = %err, "recognition failed");
                RecognitionResult::failed(err.to_string())
            }
        };

        self.cache.store_result(result.clone());
        Ok(result)
    }

    /// Recognize the cached capture again
    pub async fn recognize_last(&mut self) -> Result<RecognitionResult, RecognitionError> {
        let artifact = self
            .cache
            .artifact
            .clone()
            .ok_or(RecognitionError::NoCapture)?;
        self.recognize(&artifact).await
    }

    /// Capture then recognize in one step
    pub async fn capture_and_recognize<T: CaptureTarget>(
        &mut self,
        target: &mut T,
        full_surface: bool,
    ) -> Result<RecognitionResult, AdapterError> {
        let artifact = self.capture(target, full_surface).await?;
        Ok(self.recognize(&artifact).await?)
    }

    /// Whether the last recognition contains `needle` (partial match).
    ///
    /// Returns `false` when nothing has been recognized yet or the last
    /// recognition failed.
    pub fn contains_text(&self, needle: &str, tolerance: f64) -> bool {
        match self.cache.result() {
            Some(result) if !result.is_failed() => {
                matcher::matches(&result.raw_text, needle, MatchMode::Partial, tolerance)
            }
            _ => false,
        }
    }

    /// Re-capture until `needle` is recognized or `attempts` run out.
    ///
    /// Returns whether the text was seen; the last recognition stays cached
    /// either way.
    pub async fn wait_for_text<T: CaptureTarget>(
        &mut self,
        target: &mut T,
        needle: &str,
        tolerance: f64,
        attempts: u32,
        interval: Duration,
    ) -> Result<bool, AdapterError> {
        for attempt in 1..=attempts.max(1) {
            self.capture_and_recognize(target, false).await?;
            if self.contains_text(needle, tolerance) {
                return Ok(true);
            }
            debug!(needle, attempt, "text not recognized yet");
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(false)
    }
}
