#![deny(missing_docs)]
//! Shared logging utilities for the grid workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a thread-local run tag so every line emitted during a scrape run carries the
//! run's correlation id, and a minimal test initializer for the global logger.

use std::cell::RefCell;

thread_local! {
    /// Correlation id of the run currently executing on this thread.
    static RUN_ID: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Marks the current thread as executing the given run until the guard drops.
///
/// Nested scopes restore the outer run id when they end.
pub fn enter_run(run_id: Option<&str>) -> RunScope {
    let previous = RUN_ID.with(|v| v.replace(run_id.map(str::to_string)));
    RunScope { previous }
}

/// Guard returned by [`enter_run`].
pub struct RunScope {
    previous: Option<String>,
}

impl Drop for RunScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        RUN_ID.with(|v| *v.borrow_mut() = previous);
    }
}

/// Returns the prefix prepended to engine log lines, e.g. `[run abc] `.
/// Empty when no run is active on this thread.
pub fn run_tag() -> String {
    RUN_ID.with(|v| match v.borrow().as_deref() {
        Some(id) => format!("[run {id}] "),
        None => String::new(),
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::run_tag(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::run_tag(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::run_tag(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::run_tag(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::run_tag(), format_args!($($arg)*));
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
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}
