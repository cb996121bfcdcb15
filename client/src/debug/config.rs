//! Logging configuration from environment variables

use std::path::PathBuf;

pub const DEFAULT_LOG_LEVEL: &str = "notemarket=info,warn";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Log level filter (e.g., "notemarket=debug,info")
    pub log_level: String,
    /// Directory for the daily-rotated log file; `None` logs to stderr only
    pub log_dir: Option<PathBuf>,
    /// Write the log file as JSON lines
    pub json: bool,
    /// Colored stderr output
    pub ansi: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            json: false,
            ansi: true,
        }
    }
}

impl DebugConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: std::env::var("NOTEMARKET_LOG_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            json: std::env::var("NOTEMARKET_LOG_JSON")
                .map(|v| v == "1")
                .unwrap_or(false),
            ansi: std::env::var("NO_COLOR").is_err(),
        }
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.is_trace_enabled()
    }

    /// Check if trace logging is enabled
    pub fn is_trace_enabled(&self) -> bool {
        self.log_level.contains("trace")
    }
}
