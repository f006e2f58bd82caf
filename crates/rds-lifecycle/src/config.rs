// config.rs — Tick interval and retry pause.
//
// Read once when the lifecycle is built; changing any of it needs a restart.
// The interval is an integer plus a time unit name, as in
// `interval = 3600, interval_unit = "SECONDS"`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

/// Unit for the tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum IntervalUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// Longest accepted tick interval, 36500 days.
pub const MAX_INTERVAL: Duration = Duration::from_secs(36_500 * 24 * 60 * 60);

impl IntervalUnit {
    /// `amount` of this unit as a duration, or `None` if it overflows.
    pub fn duration(self, amount: u64) -> Option<Duration> {
        match self {
            IntervalUnit::Nanoseconds => Some(Duration::from_nanos(amount)),
            IntervalUnit::Microseconds => Some(Duration::from_micros(amount)),
            IntervalUnit::Milliseconds => Some(Duration::from_millis(amount)),
            IntervalUnit::Seconds => Some(Duration::from_secs(amount)),
            IntervalUnit::Minutes => amount.checked_mul(60).map(Duration::from_secs),
            IntervalUnit::Hours => amount.checked_mul(60 * 60).map(Duration::from_secs),
            IntervalUnit::Days => amount.checked_mul(24 * 60 * 60).map(Duration::from_secs),
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntervalUnit::Nanoseconds => "NANOSECONDS",
            IntervalUnit::Microseconds => "MICROSECONDS",
            IntervalUnit::Milliseconds => "MILLISECONDS",
            IntervalUnit::Seconds => "SECONDS",
            IntervalUnit::Minutes => "MINUTES",
            IntervalUnit::Hours => "HOURS",
            IntervalUnit::Days => "DAYS",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for IntervalUnit {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NANOSECONDS" => Ok(IntervalUnit::Nanoseconds),
            "MICROSECONDS" => Ok(IntervalUnit::Microseconds),
            "MILLISECONDS" => Ok(IntervalUnit::Milliseconds),
            "SECONDS" => Ok(IntervalUnit::Seconds),
            "MINUTES" => Ok(IntervalUnit::Minutes),
            "HOURS" => Ok(IntervalUnit::Hours),
            "DAYS" => Ok(IntervalUnit::Days),
            _ => Err(LifecycleError::UnknownIntervalUnit(s.to_string())),
        }
    }
}

impl TryFrom<String> for IntervalUnit {
    type Error = LifecycleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle section of the downloader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Ticks between cycles, in `interval_unit`.
    #[serde(default = "default_interval")]
    pub interval: u64,

    #[serde(default = "default_interval_unit")]
    pub interval_unit: IntervalUnit,

    /// Pause before the single retry of a failed fetch.
    #[serde(default = "default_retry_pause_secs")]
    pub retry_pause_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            interval_unit: default_interval_unit(),
            retry_pause_secs: default_retry_pause_secs(),
        }
    }
}

fn default_interval() -> u64 {
    3600
}

fn default_interval_unit() -> IntervalUnit {
    IntervalUnit::Seconds
}

fn default_retry_pause_secs() -> u64 {
    3 * 60
}

impl LifecycleConfig {
    /// Tick interval; zero and anything above [`MAX_INTERVAL`] are rejected.
    pub fn interval_duration(&self) -> Result<Duration, LifecycleError> {
        let interval = self
            .interval_unit
            .duration(self.interval)
            .filter(|interval| *interval <= MAX_INTERVAL)
            .ok_or(LifecycleError::IntervalTooLarge {
                interval: self.interval,
                unit: self.interval_unit,
            })?;
        if interval.is_zero() {
            return Err(LifecycleError::ZeroInterval);
        }
        Ok(interval)
    }

    pub fn retry_pause(&self) -> Duration {
        Duration::from_secs(self.retry_pause_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_hourly_with_three_minute_pause() {
        let config = LifecycleConfig::default();
        assert_eq!(
            config.interval_duration().unwrap(),
            Duration::from_secs(3600)
        );
        assert_eq!(config.retry_pause(), Duration::from_secs(180));
    }

    #[test]
    fn unit_names_parse_case_insensitively() {
        assert_eq!("MILLISECONDS".parse::<IntervalUnit>(), Ok(IntervalUnit::Milliseconds));
        assert_eq!(" minutes ".parse::<IntervalUnit>(), Ok(IntervalUnit::Minutes));
        assert_eq!(
            "fortnights".parse::<IntervalUnit>(),
            Err(LifecycleError::UnknownIntervalUnit("fortnights".to_string()))
        );
    }

    #[test]
    fn unit_durations() {
        assert_eq!(
            IntervalUnit::Milliseconds.duration(200),
            Some(Duration::from_millis(200))
        );
        assert_eq!(IntervalUnit::Hours.duration(2), Some(Duration::from_secs(7200)));
        assert_eq!(IntervalUnit::Days.duration(1), Some(Duration::from_secs(86_400)));
        assert_eq!(IntervalUnit::Days.duration(u64::MAX), None);
    }

    #[test]
    fn oversized_interval_is_rejected() {
        for (interval, interval_unit) in [
            (u64::MAX, IntervalUnit::Seconds),
            (u64::MAX, IntervalUnit::Days),
            (36_501, IntervalUnit::Days),
        ] {
            let config = LifecycleConfig {
                interval,
                interval_unit,
                ..LifecycleConfig::default()
            };
            assert_eq!(
                config.interval_duration(),
                Err(LifecycleError::IntervalTooLarge {
                    interval,
                    unit: interval_unit
                })
            );
        }
    }

    #[test]
    fn longest_interval_is_accepted() {
        let config = LifecycleConfig {
            interval: 36_500,
            interval_unit: IntervalUnit::Days,
            ..LifecycleConfig::default()
        };
        assert_eq!(config.interval_duration(), Ok(MAX_INTERVAL));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = LifecycleConfig {
            interval: 0,
            ..LifecycleConfig::default()
        };
        assert_eq!(config.interval_duration(), Err(LifecycleError::ZeroInterval));
    }

    #[test]
    fn deserializes_unit_names() {
        let config: LifecycleConfig =
            serde_json::from_str(r#"{"interval": 200, "interval_unit": "milliseconds"}"#).unwrap();
        assert_eq!(config.interval_duration().unwrap(), Duration::from_millis(200));
        assert_eq!(config.retry_pause_secs, 180);

        let bad = serde_json::from_str::<LifecycleConfig>(r#"{"interval_unit": "weeks"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_matches_serialized_name() {
        assert_eq!(IntervalUnit::Seconds.to_string(), "SECONDS");
        assert_eq!(
            serde_json::to_string(&IntervalUnit::Seconds).unwrap(),
            "\"SECONDS\""
        );
    }
}
