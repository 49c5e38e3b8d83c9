//! Run session directories.
//!
//! Every suite run gets its own directory under the session base dir
//! (`PAGE_VISION_SESSION_DIR`):
//!
//! ```text
//! /tmp/page-vision/run_20260301_090000_12345/
//!     .session.json
//!     screenshots/
//!     report.json  report.md  report.html
//! ```
//!
//! Runs are kept by default since the reports live there. Old runs are
//! removed with [`cleanup_old_sessions`] (`page-vision clean`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config;
use crate::snapshot::{generate_timestamp, sanitize_name};

const SCREENSHOTS_DIR: &str = "screenshots";
const METADATA_FILE: &str = ".session.json";

/// A suite run with organized file management
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID
    pub id: String,
    /// Root directory for this session
    pub dir: PathBuf,
    /// Whether to keep files after the session is dropped
    pub keep: bool,
}

impl Session {
    /// Create a session with a unique ID under the configured base dir
    pub fn new() -> Self {
        Self::with_name("run")
    }

    /// Create a session whose ID starts with `name`
    pub fn with_name(name: &str) -> Self {
        Self::in_base(config::session_base_dir(), name)
    }

    /// Create a named session under an explicit base directory
    pub fn in_base(base: impl AsRef<Path>, name: &str) -> Self {
        let id = format!(
            "{}_{}_{}",
            sanitize_name(name),
            generate_timestamp(),
            std::process::id()
        );
        let dir = base.as_ref().join(&id);
        Self { id, dir, keep: true }
    }

    /// Use `dir` as the session directory as-is
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let id = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "session".to_string());
        Self { id, dir, keep: true }
    }

    pub fn keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    /// Create the session directories and write the metadata file
    pub fn init(&self, registry: Option<&Path>, base_url: &str) -> std::io::Result<()> {
        fs::create_dir_all(self.screenshots_dir())?;

        let metadata = serde_json::json!({
            "id": self.id,
            "created": chrono::Utc::now().to_rfc3339(),
            "registry": registry.map(|p| p.display().to_string()),
            "base_url": base_url,
            "version": env!("CARGO_PKG_VERSION"),
        });
        fs::write(
            self.dir.join(METADATA_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;
        Ok(())
    }

    /// Where capture targets write their screenshots
    pub fn screenshots_dir(&self) -> PathBuf {
        self.dir.join(SCREENSHOTS_DIR)
    }

    /// List all PNG captures of the session
    pub fn list_captures(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut captures = Vec::new();
        let dir = self.screenshots_dir();
        if dir.exists() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|e| e == "png") {
                    captures.push(path);
                }
            }
        }
        captures.sort();
        Ok(captures)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.keep {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }
}

/// Remove sessions under the configured base dir older than `max_age`
pub fn cleanup_old_sessions(max_age: Duration) -> std::io::Result<usize> {
    cleanup_sessions_in(config::session_base_dir(), max_age)
}

/// Remove session directories under `base` older than `max_age`
pub fn cleanup_sessions_in(base: impl AsRef<Path>, max_age: Duration) -> std::io::Result<usize> {
    let base = base.as_ref();
    if !base.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut cleaned = 0;
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if age.is_some_and(|age| age > max_age) && fs::remove_dir_all(&path).is_ok() {
            cleaned += 1;
        }
    }
    Ok(cleaned)
}

/// List all existing sessions
pub fn list_sessions() -> std::io::Result<Vec<PathBuf>> {
    let base = PathBuf::from(config::session_base_dir());
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in fs::read_dir(&base)? {
        let path = entry?.path();
        if path.is_dir() {
            sessions.push(path);
        }
    }
    sessions.sort();
    Ok(sessions)
}
