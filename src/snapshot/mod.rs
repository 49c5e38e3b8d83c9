pub mod backend;
pub mod browser;
pub mod types;
pub mod utils;

pub use backend::{FramebufferTarget, MockFramebuffer};
pub use browser::{BrowserTarget, BrowserTargetConfig};
pub use types::{CaptureTarget, SnapshotError, SnapshotResult};
pub use utils::{generate_filename, generate_timestamp, route_slug, sanitize_name};
