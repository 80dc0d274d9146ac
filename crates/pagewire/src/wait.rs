//! Wait engine.
//!
//! Turns a one-shot [`evaluate`] into a polling assertion:
//!
//! - an already-satisfied condition returns without sleeping;
//! - transient driver errors (not attached, stale, navigating) count as
//!   "not yet" and are retried;
//! - anything else, including unsupported conditions and structural locator
//!   misuse, propagates on the first poll;
//! - the loop never sleeps past the deadline.
//!
//! Defaults are process-wide and can be changed with [`set_default_timeout`],
//! [`set_default_poll_interval`] or [`crate::config::EngineConfig::install`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::component::Component;
use crate::condition::Condition;
use crate::dispatch::evaluate;
use crate::result::{LastObserved, PagewireError, PagewireResult};

/// Default timeout for `should` (4 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 4_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

static TIMEOUT_MS: AtomicU64 = AtomicU64::new(DEFAULT_TIMEOUT_MS);
static POLL_INTERVAL_MS: AtomicU64 = AtomicU64::new(DEFAULT_POLL_INTERVAL_MS);

/// Change the process-wide default timeout
pub fn set_default_timeout(timeout: Duration) {
    TIMEOUT_MS.store(duration_ms(timeout), Ordering::Relaxed);
}

/// Change the process-wide default poll interval; zero is clamped to 1ms
pub fn set_default_poll_interval(interval: Duration) {
    POLL_INTERVAL_MS.store(duration_ms(interval).max(1), Ordering::Relaxed);
}

/// Current process-wide default timeout
#[must_use]
pub fn default_timeout() -> Duration {
    Duration::from_millis(TIMEOUT_MS.load(Ordering::Relaxed))
}

/// Current process-wide default poll interval
#[must_use]
pub fn default_poll_interval() -> Duration {
    Duration::from_millis(POLL_INTERVAL_MS.load(Ordering::Relaxed))
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Options for wait operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    /// Snapshot of the process-wide defaults
    fn default() -> Self {
        Self {
            timeout_ms: TIMEOUT_MS.load(Ordering::Relaxed),
            poll_interval_ms: POLL_INTERVAL_MS.load(Ordering::Relaxed),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with the current defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set timeout from a duration
    #[must_use]
    pub fn with_timeout_duration(self, timeout: Duration) -> Self {
        self.with_timeout(duration_ms(timeout))
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration, at least 1ms
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Whether the wait was successful
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Number of evaluations performed
    pub attempts: u32,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>, attempts: u32) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
            attempts,
        }
    }
}

/// Poll until `condition` holds.
///
/// # Errors
/// `ConditionTimeout` when the deadline passes; any non-transient error from
/// evaluation as soon as it happens.
pub fn await_condition<C: Component>(
    component: &C,
    condition: &Condition,
    options: &WaitOptions,
) -> PagewireResult<WaitResult> {
    poll(component, condition, true, options)
}

/// Poll until `condition` no longer holds.
///
/// # Errors
/// Same as [`await_condition`].
pub fn await_not<C: Component>(
    component: &C,
    condition: &Condition,
    options: &WaitOptions,
) -> PagewireResult<WaitResult> {
    poll(component, condition, false, options)
}

fn poll<C: Component>(
    component: &C,
    condition: &Condition,
    expected: bool,
    options: &WaitOptions,
) -> PagewireResult<WaitResult> {
    let core = component.core();
    let expectation = if expected { "be" } else { "not be" };
    let timeout = options.timeout();
    let poll_interval = options.poll_interval();
    let start = Instant::now();
    let mut attempts = 0_u32;
    let mut last_observed = LastObserved::NotEvaluated;

    tracing::debug!(
        component = %core,
        condition = %condition,
        expectation,
        timeout_ms = options.timeout_ms,
        "waiting"
    );

    loop {
        attempts = attempts.saturating_add(1);
        match evaluate(component, condition) {
            Ok(actual) if actual == expected => {
                let elapsed = start.elapsed();
                tracing::debug!(
                    component = %core,
                    condition = %condition,
                    attempts,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "condition met"
                );
                return Ok(WaitResult::success(
                    elapsed,
                    format!("{core} to {expectation} {condition}"),
                    attempts,
                ));
            }
            Ok(actual) => {
                tracing::trace!(component = %core, condition = %condition, actual, "poll");
                last_observed = LastObserved::Evaluated(actual);
            }
            Err(err) if err.is_transient() => {
                tracing::trace!(
                    component = %core,
                    condition = %condition,
                    error = %err,
                    "transient"
                );
                last_observed = LastObserved::Transient(err.to_string());
            }
            Err(err) => return Err(err),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            tracing::debug!(
                component = %core,
                condition = %condition,
                attempts,
                last_observed = %last_observed,
                "wait timed out"
            );
            return Err(PagewireError::ConditionTimeout {
                component: core.to_string(),
                condition: condition.to_string(),
                expectation,
                timeout_ms: options.timeout_ms,
                last_observed,
            });
        }
        std::thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

/// Waiter for plain predicates
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a new waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options used by [`Waiter::wait`]
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait for `predicate` with this waiter's options.
    ///
    /// # Errors
    /// `Timeout` when the predicate never returns true.
    pub fn wait<F>(&self, predicate: F) -> PagewireResult<WaitResult>
    where
        F: Fn() -> bool,
    {
        self.wait_for_function(predicate, &self.options)
    }

    /// Wait for function/predicate to return true.
    ///
    /// # Errors
    /// `Timeout` when the predicate never returns true.
    pub fn wait_for_function<F>(
        &self,
        predicate: F,
        options: &WaitOptions,
    ) -> PagewireResult<WaitResult>
    where
        F: Fn() -> bool,
    {
        let start = Instant::now();
        let timeout = options.timeout();
        let mut attempts = 0_u32;

        loop {
            attempts = attempts.saturating_add(1);
            if predicate() {
                return Ok(WaitResult::success(start.elapsed(), "custom function", attempts));
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(PagewireError::Timeout {
                    ms: options.timeout_ms,
                    waited_for: "custom function".to_string(),
                });
            }
            std::thread::sleep(options.poll_interval().min(timeout - elapsed));
        }
    }
}

/// Wait for a predicate with the default poll interval.
///
/// # Errors
/// `Timeout` when the predicate never returns true.
pub fn wait_until<F>(predicate: F, timeout_ms: u64) -> PagewireResult<()>
where
    F: Fn() -> bool,
{
    let options = WaitOptions::new().with_timeout(timeout_ms);
    Waiter::new().wait_for_function(predicate, &options)?;
    Ok(())
}
