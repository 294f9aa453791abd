//! Alert emitted by the rule engine on a rising edge

use serde::{Deserialize, Serialize};

use super::{Channel, Comparator, Severity};

/// One rising-edge threshold violation
///
/// Carries the rule's bound and comparator as seen at evaluation time so
/// the alert stays meaningful after rules are swapped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// Id of the rule that fired
    pub rule_id: String,
    pub channel: Channel,
    pub severity: Severity,
    /// Sample value that tripped the rule
    pub value: f64,
    pub comparator: Comparator,
    pub bound: f64,
    /// Timestamp of the offending sample, unix epoch seconds
    pub timestamp: i64,
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} = {:.1} {} ({} {:.1}, rule {}, t={})",
            self.severity,
            self.channel,
            self.value,
            self.channel.unit(),
            self.comparator.phrase(),
            self.bound,
            self.rule_id,
            self.timestamp
        )
    }
}
