pub mod adapter;
pub mod client;
pub mod types;

pub use adapter::{AdapterConfig, AdapterError, CaptureAdapter};
pub use client::{OcrClient, OcrConfig, check_health, parse_response};
pub use types::{RecognitionError, RecognitionResult, RecognitionStatus, Recognizer, Table};
