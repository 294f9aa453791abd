//! Vigia: Predictive Maintenance Monitoring
//!
//! Threshold alerting and degradation simulation for rotating equipment.
//!
//! ## Architecture
//!
//! - **Rule Engine**: Edge-triggered threshold evaluation with per-rule hysteresis
//! - **Degradation Simulator**: Deterministic remaining-life projection per scenario
//! - **Monitoring Session**: Composes both into batch monitoring cycles
//! - **Pipeline**: Source-agnostic cycle loop with shared state for the API

pub mod api;
pub mod chat;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod simulator;
pub mod telemetry;
pub mod types;

// Re-export monitor configuration
pub use config::MonitorConfig;

// Re-export commonly used types
pub use types::{
    Alert, Channel, Comparator, Condition, CycleReport, HealthSnapshot, MetricSample,
    ScenarioKind, ScenarioProfile, Severity, ThresholdRule,
};

// Re-export the core engine pieces
pub use engine::{RuleEngine, RuleState};
pub use error::CoreError;
pub use session::MonitoringSession;
pub use simulator::DegradationSimulator;
