// Core types for surface capture

use std::future::Future;
use std::path::PathBuf;

/// Result type for capture operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Error types for capture operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The target could not be opened at the requested route
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Error during capture process
    #[error("Capture error: {0}")]
    Capture(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for SnapshotError {
    fn from(err: image::ImageError) -> Self {
        SnapshotError::Capture(err.to_string())
    }
}

/// A renderable surface that can be pointed at a route and captured
///
/// Implementations:
/// - `BrowserTarget` drives a headless browser against a live application
/// - `FramebufferTarget` renders pages offline through `MockFramebuffer`
pub trait CaptureTarget {
    /// Source type identifier (e.g., "browser", "framebuffer")
    fn source_type(&self) -> &str;

    /// Point the surface at a route of the application under test
    fn navigate(&mut self, route: &str) -> impl Future<Output = SnapshotResult<()>> + Send;

    /// Capture the surface and return the path of the stored image.
    ///
    /// `full_surface` asks for the whole scrollable page rather than the
    /// visible viewport.
    fn capture(&mut self, full_surface: bool)
    -> impl Future<Output = SnapshotResult<PathBuf>> + Send;
}
