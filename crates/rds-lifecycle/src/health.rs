// health.rs — Process health states and their aggregation.
//
// Components push their state through a StatePushFacet. The HealthRegistry
// is the in-process aggregator: it keeps the last state of every registered
// component and reports the worst of them as the process state.
//
// Health is never persisted; it lives in memory for the lifetime of the
// process.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    Ready,
    /// Degraded but expected to recover on its own.
    Warning(String),
    /// Not doing its job.
    Faulty(String),
}

impl HealthState {
    pub fn warning(message: impl Into<String>) -> Self {
        HealthState::Warning(message.into())
    }

    pub fn faulty(message: impl Into<String>) -> Self {
        HealthState::Faulty(message.into())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, HealthState::Ready)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            HealthState::Ready => None,
            HealthState::Warning(msg) | HealthState::Faulty(msg) => Some(msg),
        }
    }

    /// Higher is worse.
    fn severity(&self) -> u8 {
        match self {
            HealthState::Ready => 0,
            HealthState::Warning(_) => 1,
            HealthState::Faulty(_) => 2,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HealthState::Ready => "READY",
            HealthState::Warning(_) => "WARNING",
            HealthState::Faulty(_) => "FAULTY",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}: {}", self.name(), msg),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Where a component pushes its health.
pub trait StatePushFacet: Send + Sync {
    fn set_state(&self, state: HealthState);
}

/// Last reported state of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    pub state: HealthState,
    pub changed_at: DateTime<Utc>,
}

/// In-process aggregate of component health.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    components: Mutex<BTreeMap<String, ComponentHealth>>,
}

impl HealthRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a component and hand out its facet.
    ///
    /// A new component starts out as WARNING until it reports for the first
    /// time, so the process is not READY before any work has been done.
    pub fn register(self: &Arc<Self>, name: impl Into<String>) -> Arc<RegisteredFacet> {
        let name = name.into();
        self.set(&name, HealthState::warning("No state reported yet"));
        Arc::new(RegisteredFacet {
            registry: Arc::clone(self),
            name,
        })
    }

    /// Record the state of `name`. Logs only when the state changes.
    pub fn set(&self, name: &str, state: HealthState) {
        let mut components = self
            .components
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if components.get(name).is_some_and(|c| c.state == state) {
            return;
        }

        match &state {
            HealthState::Ready => tracing::info!(component = name, "health: {}", state),
            HealthState::Warning(_) => tracing::warn!(component = name, "health: {}", state),
            HealthState::Faulty(_) => tracing::error!(component = name, "health: {}", state),
        }

        components.insert(
            name.to_string(),
            ComponentHealth {
                state,
                changed_at: Utc::now(),
            },
        );
    }

    pub fn component(&self, name: &str) -> Option<ComponentHealth> {
        self.components
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Worst state across all components; READY when nothing is registered.
    pub fn overall(&self) -> HealthState {
        self.components
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|c| &c.state)
            .max_by_key(|state| state.severity())
            .cloned()
            .unwrap_or(HealthState::Ready)
    }

    pub fn snapshot(&self) -> BTreeMap<String, ComponentHealth> {
        self.components
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Facet bound to one named component of a [`HealthRegistry`].
#[derive(Debug)]
pub struct RegisteredFacet {
    registry: Arc<HealthRegistry>,
    name: String,
}

impl RegisteredFacet {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl StatePushFacet for RegisteredFacet {
    fn set_state(&self, state: HealthState) {
        self.registry.set(&self.name, state);
    }
}
