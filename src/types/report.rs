//! Monitoring cycle output: CycleReport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Alert, HealthSnapshot, Severity};

/// Everything one monitoring cycle produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// Rising-edge alerts in sample order (equal timestamps ordered by rule id)
    pub alerts: Vec<Alert>,
    /// Present when the cycle ran a degradation scenario
    pub snapshot: Option<HealthSnapshot>,
    pub generated_at: DateTime<Utc>,
}

impl CycleReport {
    /// Highest severity among this cycle's alerts
    pub fn max_severity(&self) -> Option<Severity> {
        self.alerts.iter().map(|a| a.severity).max()
    }

    pub fn has_critical(&self) -> bool {
        self.max_severity() == Some(Severity::Critical)
    }
}
