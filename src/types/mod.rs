//! Shared data structures for the predictive maintenance monitoring core
//!
//! - Channel / MetricSample: telemetry input
//! - Severity / Comparator / ThresholdRule: rule definitions
//! - Alert: rule engine output
//! - ScenarioKind / Condition / ScenarioProfile / HealthSnapshot: simulator types
//! - CycleReport: monitoring session output

mod alert;
mod report;
mod rule;
mod sample;
mod scenario;

pub use alert::*;
pub use report::*;
pub use rule::*;
pub use sample::*;
pub use scenario::*;
