//! Subscriber setup for test binaries.
//!
//! pagewire emits `tracing` events (component resolution and dispatch at
//! `debug`, each wait poll at `trace`). Libraries never install a
//! subscriber on their own; call [`init`] from a test harness to see them.
//!
//! The filter comes from `PAGEWIRE_LOG` using `EnvFilter` syntax, e.g.
//! `PAGEWIRE_LOG=pagewire=trace`. Without it only warnings are shown.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::result::{PagewireError, PagewireResult};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PAGEWIRE_LOG";

/// Filter used when `PAGEWIRE_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Build the filter from `PAGEWIRE_LOG`, falling back to [`DEFAULT_FILTER`]
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber with human-readable output.
///
/// # Errors
/// Returns error if a global subscriber is already installed.
pub fn try_init() -> PagewireResult<()> {
    try_init_with(LogFormat::Pretty)
}

/// Install a global subscriber with the given output format.
///
/// # Errors
/// Returns error if a global subscriber is already installed.
pub fn try_init_with(format: LogFormat) -> PagewireResult<()> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let result = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_test_writer())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_test_writer())
            .try_init(),
    };
    result.map_err(|e| PagewireError::config(format!("logging already initialized: {e}")))
}

/// Install a subscriber, ignoring the error if one already exists.
///
/// Safe to call from every test.
pub fn init() {
    let _ = try_init();
}
