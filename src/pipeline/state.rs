//! Shared Monitor State and Service Status
//!
//! Shared state for the monitoring pipeline, accessible from API handlers,
//! the cycle processing loop, and chat command renderers.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config;
use crate::engine::RuleEngine;
use crate::error::CoreError;
use crate::session::MonitoringSession;
use crate::simulator::DegradationSimulator;

// ============================================================================
// Monitor State
// ============================================================================

/// Shared handle to the monitoring session, accessible from API handlers and
/// the processing loop.
///
/// Cloning is cheap: the session lives behind an `Arc<RwLock<>>`, so every
/// clone observes the same rule activation state and wear catalog.
#[derive(Clone)]
pub struct MonitorState {
    /// The monitoring session owning the rule engine and simulator
    pub session: Arc<RwLock<MonitoringSession>>,

    /// Current service status, written by the processing loop
    pub status: Arc<RwLock<ServiceStatus>>,

    /// Process start instant for uptime reporting
    pub started_at: Instant,
}

impl Default for MonitorState {
    /// Returns a deterministic empty state suitable for tests.
    /// For production startup use [`MonitorState::from_config()`].
    fn default() -> Self {
        Self::new(MonitoringSession::default())
    }
}

impl MonitorState {
    /// Wrap an already-built session for sharing.
    pub fn new(session: MonitoringSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            status: Arc::new(RwLock::new(ServiceStatus::Initializing)),
            started_at: Instant::now(),
        }
    }

    /// Build the production state from the global config.
    ///
    /// Parses the configured rule set, applies any scenario wear-curve
    /// overrides, and opens a session for the configured equipment at its
    /// default operating hours. Call after `config::init()`.
    pub fn from_config() -> Result<Self, CoreError> {
        let cfg = config::get();

        let rules = cfg
            .threshold_rules()
            .map_err(|e| CoreError::Configuration(e.to_string()))?;
        let engine = RuleEngine::new(rules)?;

        let mut simulator = DegradationSimulator::new();
        for (kind, curve) in cfg.scenarios.entries() {
            simulator.set_wear_curve(kind, curve.base_life_pct, curve.decay_rate_per_hour)?;
        }

        let session = MonitoringSession::new(
            engine,
            simulator,
            cfg.equipment.id.clone(),
            cfg.equipment.default_operating_hours,
        )?;

        Ok(Self::new(session))
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Set the service status, logging transitions.
    pub async fn set_status(&self, next: ServiceStatus) {
        let mut status = self.status.write().await;
        if *status != next {
            tracing::info!(from = %*status, to = %next, "Service status changed");
            *status = next;
        }
    }
}

// ============================================================================
// Service Status
// ============================================================================

/// Service operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    /// Service is starting up
    Initializing,
    /// Normal operation, rules armed and samples flowing
    Monitoring,
    /// At least one rule is currently latched active
    Alert,
    /// Sample source failure or degraded operation
    Error,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Initializing => write!(f, "Initializing"),
            ServiceStatus::Monitoring => write!(f, "Monitoring"),
            ServiceStatus::Alert => write!(f, "Alert"),
            ServiceStatus::Error => write!(f, "Error"),
        }
    }
}
