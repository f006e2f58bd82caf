// error.rs — Error types for scheduler setup and control.
//
// Failures inside a cycle never surface here: they end up as a health state.

use thiserror::Error;

use crate::config::IntervalUnit;

/// Errors that can occur while configuring or controlling the lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start` was called while a schedule is already running.
    #[error("lifecycle is already started; call stop() first")]
    AlreadyStarted,

    /// The configured tick interval is zero.
    #[error("interval must be greater than zero")]
    ZeroInterval,

    /// The configured interval does not fit the scheduler's clock.
    #[error("interval of {interval} {unit} exceeds the maximum of 36500 days")]
    IntervalTooLarge { interval: u64, unit: IntervalUnit },

    /// The configured interval unit is not a known time unit name.
    #[error("unknown interval unit '{0}' (expected NANOSECONDS, MICROSECONDS, MILLISECONDS, SECONDS, MINUTES, HOURS or DAYS)")]
    UnknownIntervalUnit(String),
}
