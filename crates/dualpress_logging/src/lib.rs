#![deny(missing_docs)]
//! Shared logging utilities for the dualpress workspace.
//!
//! This crate provides the `dp_*` logging macros used across the codebase,
//! a thread-local job context that prefixes every message with the active
//! job, and a minimal test initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local storage for the job currently driven by this thread.
    static CURRENT_JOB: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Sets the job id that subsequent log lines on this thread refer to.
/// Pass `None` once the job has reached a terminal phase.
pub fn set_current_job(job_id: Option<u64>) {
    CURRENT_JOB.with(|v| v.set(job_id));
}

/// Retrieves the job id set for the current thread, if any.
pub fn current_job() -> Option<u64> {
    CURRENT_JOB.with(|v| v.get())
}

/// Returns the `[job N] ` prefix for the current thread, or an empty string.
#[doc(hidden)]
pub fn job_prefix() -> String {
    match current_job() {
        Some(job_id) => format!("[job {job_id}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! dp_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! dp_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! dp_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! dp_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! dp_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
