//! Rule types: Severity, Comparator, ThresholdRule

use serde::{Deserialize, Serialize};

use super::Channel;
use crate::error::CoreError;

// ============================================================================
// Severity
// ============================================================================

/// Severity level for threshold alerts
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Warning = 1,
    Critical = 2,
}

impl Severity {
    /// Parse from string (for API/config)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "warning" | "warn" => Some(Severity::Warning),
            "critical" | "crit" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ============================================================================
// Comparator
// ============================================================================

/// Comparison relating a sample value to a rule bound
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
}

impl Comparator {
    /// Does `value` satisfy the comparison against `bound`?
    pub fn check(self, value: f64, bound: f64) -> bool {
        match self {
            Comparator::GreaterThan => value > bound,
            Comparator::GreaterEqual => value >= bound,
            Comparator::LessThan => value < bound,
            Comparator::LessEqual => value <= bound,
        }
    }

    /// Parse from string (for API/config)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            ">" | "gt" | "greater_than" => Some(Comparator::GreaterThan),
            ">=" | "ge" | "gte" | "greater_equal" => Some(Comparator::GreaterEqual),
            "<" | "lt" | "less_than" => Some(Comparator::LessThan),
            "<=" | "le" | "lte" | "less_equal" => Some(Comparator::LessEqual),
            _ => None,
        }
    }

    /// Human phrasing for alert messages
    pub fn phrase(self) -> &'static str {
        match self {
            Comparator::GreaterThan => "above",
            Comparator::GreaterEqual => "at or above",
            Comparator::LessThan => "below",
            Comparator::LessEqual => "at or below",
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparator::GreaterThan => write!(f, ">"),
            Comparator::GreaterEqual => write!(f, ">="),
            Comparator::LessThan => write!(f, "<"),
            Comparator::LessEqual => write!(f, "<="),
        }
    }
}

// ============================================================================
// Threshold Rule
// ============================================================================

/// Declarative alerting rule: fires when a sample on `channel` satisfies
/// `comparator` against `bound`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdRule {
    /// Caller-supplied id, unique within an engine
    pub id: String,
    pub channel: Channel,
    pub comparator: Comparator,
    pub bound: f64,
    pub severity: Severity,
}

impl ThresholdRule {
    /// Build a validated rule
    ///
    /// Rejects empty ids, non-finite bounds (a NaN bound would make the
    /// comparison unanswerable) and rules aimed at the unknown channel.
    pub fn new(
        id: impl Into<String>,
        channel: Channel,
        comparator: Comparator,
        bound: f64,
        severity: Severity,
    ) -> Result<Self, CoreError> {
        let rule = Self {
            id: id.into(),
            channel,
            comparator,
            bound,
            severity,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Re-check the construction invariants
    ///
    /// Fields are public so rules can arrive via struct literals or
    /// deserialization; `RuleEngine::new` runs this on every rule it accepts.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.trim().is_empty() {
            return Err(CoreError::Configuration(
                "rule id must not be empty".to_string(),
            ));
        }
        if !self.bound.is_finite() {
            return Err(CoreError::InvalidInput(format!(
                "rule '{}': bound must be finite, got {}",
                self.id, self.bound
            )));
        }
        if self.channel == Channel::Unknown {
            return Err(CoreError::Configuration(format!(
                "rule '{}': cannot target the unknown channel",
                self.id
            )));
        }
        Ok(())
    }

    /// Does `value` trip this rule?
    pub fn is_tripped(&self, value: f64) -> bool {
        self.comparator.check(value, self.bound)
    }
}
