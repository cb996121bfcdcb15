//! Logging initialization

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::config::{DebugConfig, DEFAULT_LOG_LEVEL};

pub const LOG_FILE_NAME: &str = "notemarket.log";

/// Keeps the non-blocking file writer alive; flushes on drop.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the logging system
///
/// Sets up:
/// - An `EnvFilter` from `RUST_LOG` (default `notemarket=info,warn`)
/// - Human-readable output on stderr
/// - A daily-rotated file in `log_dir` when configured, optionally JSON
/// - A panic hook that logs panics before the default handler runs
///
/// Calling it twice is harmless: the second subscriber is not installed.
pub fn init(config: &DebugConfig) -> LogGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(config.ansi);

    let mut file_guard = None;
    let mut file_plain = None;
    let mut file_json = None;

    if let Some(dir) = &config.log_dir {
        match fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                file_guard = Some(guard);
                if config.json {
                    file_json = Some(
                        fmt::layer()
                            .json()
                            .with_writer(writer)
                            .with_thread_ids(true)
                            .with_file(true)
                            .with_line_number(true),
                    );
                } else {
                    file_plain = Some(
                        fmt::layer()
                            .with_writer(writer)
                            .with_target(true)
                            .with_thread_ids(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_ansi(false),
                    );
                }
            }
            Err(e) => eprintln!("Warning: Failed to create log directory {}: {}", dir.display(), e),
        }
    }

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_plain)
        .with(file_json)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            log_level = %config.log_level,
            log_dir = ?config.log_dir,
            json = config.json,
            "Logging initialized"
        );
        setup_panic_hook();
    }

    LogGuard { _file: file_guard }
}

/// Set up panic hook to log panics with their location
fn setup_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic message".to_string()
        };

        tracing::error!(
            trace_id = ?super::trace_context::current_trace_id(),
            location = %location,
            message = %message,
            "Panic"
        );

        default_panic(panic_info);
    }));
}
