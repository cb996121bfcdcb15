//! # Logging and Tracing
//!
//! - **[`logger`]**: `tracing-subscriber` setup (stderr, optional rotated file)
//! - **[`config`]**: [`DebugConfig`] from environment variables
//! - **[`trace_context`]**: Trace IDs that correlate the requests of one
//!   user action
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (e.g., `notemarket=debug,info`)
//! - `NOTEMARKET_LOG_DIR`: Directory for `notemarket.log` (daily rotation)
//! - `NOTEMARKET_LOG_JSON`: Write the file as JSON lines (1=on)
//! - `NO_COLOR`: Disable colored stderr output

pub mod config;
pub mod logger;
pub mod trace_context;

pub use config::DebugConfig;
pub use logger::{init as init_logger, LogGuard};
pub use trace_context::{current_trace_id, in_trace, new_trace_id, with_trace_id};

/// Initialize logging from the environment. Hold the guard until exit.
///
/// ```rust,no_run
/// let _log = notemarket::debug::init();
/// tracing::info!("ready");
/// ```
pub fn init() -> LogGuard {
    init_logger(&DebugConfig::from_env())
}
