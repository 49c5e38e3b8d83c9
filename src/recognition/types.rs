// Core types for recognition results and recognition failures

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Outcome of one recognition call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionStatus {
    Completed,
    Failed,
}

/// A table extracted from a captured surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
    pub col_count: usize,
}

impl Table {
    /// Build a table, deriving the row and column counts
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let col_count = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        Self {
            row_count: rows.len(),
            col_count,
            headers,
            rows,
        }
    }
}

/// Text and structure recognized from one capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub status: RecognitionStatus,
    pub raw_text: String,
    #[serde(default)]
    pub tables: Vec<Table>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RecognitionResult {
    /// A successful recognition with no tables
    pub fn completed(raw_text: impl Into<String>, confidence: f64) -> Self {
        Self {
            status: RecognitionStatus::Completed,
            raw_text: raw_text.into(),
            tables: Vec::new(),
            confidence,
            error_message: None,
        }
    }

    /// The stand-in result returned when recognition could not run
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: RecognitionStatus::Failed,
            raw_text: String::new(),
            tables: Vec::new(),
            confidence: 0.0,
            error_message: Some(error_message.into()),
        }
    }

    pub fn with_tables(mut self, tables: Vec<Table>) -> Self {
        self.tables = tables;
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == RecognitionStatus::Failed
    }

    /// Failure reason for messages, falling back to a generic one
    pub fn failure_reason(&self) -> &str {
        self.error_message.as_deref().unwrap_or("recognition failed")
    }

    /// Total rows across every extracted table
    pub fn total_table_rows(&self) -> usize {
        self.tables.iter().map(|t| t.row_count).sum()
    }
}

/// Errors that can occur while recognizing a capture
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    /// Failed to reach the recognition service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered but reported a failure
    #[error("Service error: {0}")]
    Service(String),

    /// The service did not answer in time
    #[error("Recognition timed out after {0:?}")]
    Timeout(Duration),

    /// The response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No capture is available to recognize
    #[error("No capture available to recognize")]
    NoCapture,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A text/structure recognition service
///
/// Implementations receive the path of a stored capture and return what
/// they recognized in it.
pub trait Recognizer {
    fn recognize(
        &self,
        artifact: &Path,
    ) -> impl Future<Output = Result<RecognitionResult, RecognitionError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_counts() {
        let table = Table::new(
            vec!["name".into(), "owner".into()],
            vec![
                vec!["orders".into(), "etl".into()],
                vec!["users".into(), "crm".into(), "extra".into()],
            ],
        );
        assert_eq!(table.row_count, 2);
        assert_eq!(table.col_count, 3);
    }

    #[test]
    fn test_failed_result_shape() {
        let result = RecognitionResult::failed("network timeout");
        assert!(result.is_failed());
        assert_eq!(result.raw_text, "");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.failure_reason(), "network timeout");
    }

    #[test]
    fn test_total_table_rows() {
        let result = RecognitionResult::completed("", 0.9).with_tables(vec![
            Table::new(vec![], vec![vec!["a".into()]]),
            Table::new(vec![], vec![vec!["b".into()], vec!["c".into()]]),
        ]);
        assert_eq!(result.total_table_rows(), 3);
    }
}
