//! Edge-triggered threshold rule engine
//!
//! Evaluates batches of metric samples against a validated rule set. Each
//! rule carries its own activation flag: the first sample that trips a rule
//! emits an alert and latches the flag, further tripping samples stay
//! silent, and a sample back inside the bound re-arms the rule. A burst of
//! consecutive violations therefore produces one alert, not one per sample.

use tracing::debug;

use crate::error::CoreError;
use crate::types::{Alert, Channel, MetricSample, ThresholdRule};

/// Activation state backing the edge trigger for one rule
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RuleState {
    /// True while the rule's condition held at the last sample on its channel
    pub is_active: bool,
    /// Rising edges seen since construction or the last reset
    pub trip_count: u64,
}

/// Stateful rule evaluator
///
/// Rules are sorted by id at construction and hold their order for the
/// engine's lifetime; `states` is index-aligned with `rules`.
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<ThresholdRule>,
    states: Vec<RuleState>,
    samples_processed: u64,
    samples_skipped: u64,
    alerts_emitted: u64,
}

impl RuleEngine {
    /// Build an engine over a validated rule set
    ///
    /// Every rule is re-validated (finite bound, non-empty id, known
    /// channel) and ids must be unique. Order of the input does not matter.
    pub fn new(mut rules: Vec<ThresholdRule>) -> Result<Self, CoreError> {
        for rule in &rules {
            rule.validate()?;
        }
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        for pair in rules.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(CoreError::Configuration(format!(
                    "duplicate rule id '{}'",
                    pair[0].id
                )));
            }
        }
        let states = vec![RuleState::default(); rules.len()];
        Ok(Self {
            rules,
            states,
            samples_processed: 0,
            samples_skipped: 0,
            alerts_emitted: 0,
        })
    }

    /// Evaluate a batch of samples, returning rising-edge alerts
    ///
    /// Samples are processed in the order given, so activation state follows
    /// the caller's sequence. The returned alerts are sorted by sample
    /// timestamp, equal timestamps by rule id ascending. Samples on
    /// `Channel::Unknown` and non-finite values are counted and skipped.
    pub fn evaluate(&mut self, samples: &[MetricSample]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for sample in samples {
            self.samples_processed += 1;

            if sample.channel == Channel::Unknown {
                self.samples_skipped += 1;
                debug!(timestamp = sample.timestamp, "Skipping sample on unknown channel");
                continue;
            }
            if !sample.value.is_finite() {
                self.samples_skipped += 1;
                debug!(
                    channel = %sample.channel,
                    timestamp = sample.timestamp,
                    "Skipping non-finite sample value"
                );
                continue;
            }

            for (rule, state) in self.rules.iter().zip(self.states.iter_mut()) {
                if rule.channel != sample.channel {
                    continue;
                }
                if rule.is_tripped(sample.value) {
                    if !state.is_active {
                        state.is_active = true;
                        state.trip_count += 1;
                        alerts.push(Alert {
                            rule_id: rule.id.clone(),
                            channel: rule.channel,
                            severity: rule.severity,
                            value: sample.value,
                            comparator: rule.comparator,
                            bound: rule.bound,
                            timestamp: sample.timestamp,
                        });
                    }
                } else {
                    state.is_active = false;
                }
            }
        }

        alerts.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });
        self.alerts_emitted += alerts.len() as u64;
        alerts
    }

    /// Clear all activation state, re-arming every rule
    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = RuleState::default();
        }
    }

    /// Rules in evaluation order (id ascending)
    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Activation state for one rule id
    pub fn state(&self, rule_id: &str) -> Option<&RuleState> {
        self.rules
            .iter()
            .position(|r| r.id == rule_id)
            .map(|i| &self.states[i])
    }

    /// Ids of rules currently latched active
    pub fn active_rule_ids(&self) -> Vec<&str> {
        self.rules
            .iter()
            .zip(self.states.iter())
            .filter(|(_, s)| s.is_active)
            .map(|(r, _)| r.id.as_str())
            .collect()
    }

    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    pub fn samples_skipped(&self) -> u64 {
        self.samples_skipped
    }

    pub fn alerts_emitted(&self) -> u64 {
        self.alerts_emitted
    }
}

impl Default for RuleEngine {
    /// An engine with no rules; evaluation over it emits nothing
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            states: Vec::new(),
            samples_processed: 0,
            samples_skipped: 0,
            alerts_emitted: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Comparator, Severity};

    fn rule(
        id: &str,
        channel: Channel,
        comparator: Comparator,
        bound: f64,
        severity: Severity,
    ) -> ThresholdRule {
        ThresholdRule {
            id: id.to_string(),
            channel,
            comparator,
            bound,
            severity,
        }
    }

    fn temp_crit() -> ThresholdRule {
        rule(
            "temp-crit",
            Channel::Temperature,
            Comparator::GreaterThan,
            100.0,
            Severity::Critical,
        )
    }

    fn s(channel: Channel, value: f64, timestamp: i64) -> MetricSample {
        MetricSample::new(channel, value, timestamp)
    }

    #[test]
    fn test_burst_emits_single_alert() {
        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();
        let samples: Vec<_> = (0..5)
            .map(|i| s(Channel::Temperature, 110.0, i))
            .collect();

        let alerts = engine.evaluate(&samples);

        assert_eq!(alerts.len(), 1, "only the rising edge should alert");
        assert_eq!(alerts[0].timestamp, 0);
        assert_eq!(alerts[0].value, 110.0);
    }

    #[test]
    fn test_recovery_rearms_rule() {
        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();
        let samples = vec![
            s(Channel::Temperature, 95.0, 0),
            s(Channel::Temperature, 105.0, 1),
            s(Channel::Temperature, 98.0, 2),
        ];

        let alerts = engine.evaluate(&samples);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].timestamp, 1);
        assert_eq!(alerts[0].rule_id, "temp-crit");

        // After dropping back under the bound the next excursion fires again
        let alerts = engine.evaluate(&[s(Channel::Temperature, 101.0, 3)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].timestamp, 3);
    }

    #[test]
    fn test_state_survives_across_batches() {
        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();

        let first = engine.evaluate(&[s(Channel::Temperature, 120.0, 0)]);
        assert_eq!(first.len(), 1);

        // Still latched: the same violation in a later batch stays silent
        let second = engine.evaluate(&[s(Channel::Temperature, 121.0, 10)]);
        assert!(second.is_empty());
        assert_eq!(engine.active_rule_ids(), vec!["temp-crit"]);
    }

    #[test]
    fn test_one_sample_trips_multiple_rules() {
        let rules = vec![
            rule(
                "temp-warn",
                Channel::Temperature,
                Comparator::GreaterThan,
                90.0,
                Severity::Warning,
            ),
            temp_crit(),
        ];
        let mut engine = RuleEngine::new(rules).unwrap();

        let alerts = engine.evaluate(&[s(Channel::Temperature, 105.0, 7)]);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].rule_id, "temp-crit", "ties order by rule id");
        assert_eq!(alerts[1].rule_id, "temp-warn");
        assert_eq!(alerts[0].timestamp, alerts[1].timestamp);
    }

    #[test]
    fn test_rules_trigger_independently() {
        let rules = vec![
            rule(
                "temp-warn",
                Channel::Temperature,
                Comparator::GreaterThan,
                90.0,
                Severity::Warning,
            ),
            temp_crit(),
        ];
        let mut engine = RuleEngine::new(rules).unwrap();

        // 95 trips only the warning; 105 then trips the critical while the
        // warning stays latched
        let alerts = engine.evaluate(&[
            s(Channel::Temperature, 95.0, 0),
            s(Channel::Temperature, 105.0, 1),
        ]);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].rule_id, "temp-warn");
        assert_eq!(alerts[0].timestamp, 0);
        assert_eq!(alerts[1].rule_id, "temp-crit");
        assert_eq!(alerts[1].timestamp, 1);
    }

    #[test]
    fn test_alert_ordering() {
        let rules = vec![
            rule(
                "z-rpm",
                Channel::Rpm,
                Comparator::GreaterThan,
                4800.0,
                Severity::Warning,
            ),
            rule(
                "a-press",
                Channel::Pressure,
                Comparator::LessThan,
                2.0,
                Severity::Critical,
            ),
        ];
        let mut engine = RuleEngine::new(rules).unwrap();

        // Same timestamp on both channels, fed rpm first
        let alerts = engine.evaluate(&[
            s(Channel::Rpm, 5000.0, 5),
            s(Channel::Pressure, 1.5, 5),
        ]);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].rule_id, "a-press");
        assert_eq!(alerts[1].rule_id, "z-rpm");
    }

    #[test]
    fn test_unknown_channel_skipped() {
        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();

        let alerts = engine.evaluate(&[
            s(Channel::Unknown, 9999.0, 0),
            s(Channel::Temperature, 50.0, 1),
        ]);

        assert!(alerts.is_empty());
        assert_eq!(engine.samples_processed(), 2);
        assert_eq!(engine.samples_skipped(), 1);
    }

    #[test]
    fn test_non_finite_value_skipped() {
        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();

        let alerts = engine.evaluate(&[s(Channel::Temperature, f64::NAN, 0)]);

        assert!(alerts.is_empty());
        assert_eq!(engine.samples_skipped(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let mut empty_rules = RuleEngine::new(Vec::new()).unwrap();
        assert!(empty_rules
            .evaluate(&[s(Channel::Temperature, 200.0, 0)])
            .is_empty());

        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();
        assert!(engine.evaluate(&[]).is_empty());
    }

    #[test]
    fn test_equality_bounds() {
        let rules = vec![
            rule(
                "strict",
                Channel::Pressure,
                Comparator::LessThan,
                2.0,
                Severity::Critical,
            ),
            rule(
                "inclusive",
                Channel::Pressure,
                Comparator::LessEqual,
                2.0,
                Severity::Warning,
            ),
        ];
        let mut engine = RuleEngine::new(rules).unwrap();

        let alerts = engine.evaluate(&[s(Channel::Pressure, 2.0, 0)]);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule_id, "inclusive");
    }

    #[test]
    fn test_deterministic_evaluation() {
        let samples = vec![
            s(Channel::Temperature, 95.0, 0),
            s(Channel::Temperature, 105.0, 1),
            s(Channel::Rpm, 4900.0, 2),
            s(Channel::Temperature, 98.0, 3),
        ];
        let rules = || {
            vec![
                temp_crit(),
                rule(
                    "rpm-warn",
                    Channel::Rpm,
                    Comparator::GreaterThan,
                    4800.0,
                    Severity::Warning,
                ),
            ]
        };

        let a = RuleEngine::new(rules()).unwrap().evaluate(&samples);
        let b = RuleEngine::new(rules()).unwrap().evaluate(&samples);

        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = RuleEngine::new(vec![temp_crit(), temp_crit()]).unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
        assert!(err.to_string().contains("temp-crit"));
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let nan = rule(
            "nan",
            Channel::Rpm,
            Comparator::GreaterThan,
            f64::NAN,
            Severity::Warning,
        );
        assert!(RuleEngine::new(vec![nan]).is_err());
    }

    #[test]
    fn test_reset_rearms() {
        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();
        assert_eq!(engine.evaluate(&[s(Channel::Temperature, 110.0, 0)]).len(), 1);
        assert!(engine.evaluate(&[s(Channel::Temperature, 110.0, 1)]).is_empty());

        engine.reset();

        assert_eq!(
            engine.evaluate(&[s(Channel::Temperature, 110.0, 2)]).len(),
            1,
            "reset should re-arm the latched rule"
        );
    }

    #[test]
    fn test_counters() {
        let mut engine = RuleEngine::new(vec![temp_crit()]).unwrap();
        engine.evaluate(&[
            s(Channel::Temperature, 110.0, 0),
            s(Channel::Temperature, 95.0, 1),
            s(Channel::Temperature, 110.0, 2),
        ]);

        assert_eq!(engine.samples_processed(), 3);
        assert_eq!(engine.alerts_emitted(), 2);
        let state = engine.state("temp-crit").unwrap();
        assert_eq!(state.trip_count, 2);
        assert!(state.is_active);
    }
}
