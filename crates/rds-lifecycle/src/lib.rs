//! # rds-lifecycle
//!
//! Drives the RDS download on a fixed interval.
//!
//! Each tick runs one cycle: acquire a clean staging sink, let the fetcher
//! fill it, commit it over the published file, and report the outcome. A
//! failed fetch is retried exactly once after a pause; a second failure skips
//! publishing for that cycle and leaves the previous file in place.
//!
//! ## Key components
//!
//! - [`Lifecycle`] — the scheduler (`start` / `stop` / `run_once`)
//! - [`HealthState`] — READY, WARNING, or FAULTY with a message
//! - [`StatePushFacet`] — where a component pushes its health
//! - [`HealthRegistry`] — in-process aggregate of all component states
//! - [`Clock`] — time source for ticks and retry pauses ([`TokioClock`])
//! - [`LifecycleConfig`] — interval, interval unit, retry pause

pub mod clock;
pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;

pub use clock::{Clock, TokioClock};
pub use config::{IntervalUnit, LifecycleConfig, MAX_INTERVAL};
pub use error::LifecycleError;
pub use health::{ComponentHealth, HealthRegistry, HealthState, RegisteredFacet, StatePushFacet};
pub use lifecycle::{Lifecycle, COMPONENT_NAME, FETCH_ATTEMPTS};
