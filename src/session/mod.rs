//! Monitoring session facade
//!
//! Owns one rule engine and one degradation simulator for a single piece of
//! equipment and composes them into monitoring cycles. Engine activation
//! state carries across cycles, so hysteresis spans cycle boundaries.

use chrono::Utc;
use tracing::debug;

use crate::engine::RuleEngine;
use crate::error::CoreError;
use crate::simulator::DegradationSimulator;
use crate::types::{CycleReport, MetricSample, ScenarioKind, ThresholdRule};

#[derive(Debug)]
pub struct MonitoringSession {
    engine: RuleEngine,
    simulator: DegradationSimulator,
    equipment_id: String,
    operating_hours: f64,
    cycles_completed: u64,
}

impl MonitoringSession {
    pub fn new(
        engine: RuleEngine,
        simulator: DegradationSimulator,
        equipment_id: impl Into<String>,
        operating_hours: f64,
    ) -> Result<Self, CoreError> {
        if !operating_hours.is_finite() || operating_hours < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "operating hours must be non-negative, got {operating_hours}"
            )));
        }
        Ok(Self {
            engine,
            simulator,
            equipment_id: equipment_id.into(),
            operating_hours,
            cycles_completed: 0,
        })
    }

    /// Run one monitoring cycle
    ///
    /// Evaluates the batch against the rule set and, when a scenario is
    /// given, projects a health snapshot for this session's equipment at its
    /// current operating hours. Component errors propagate unchanged.
    pub fn run_cycle(
        &mut self,
        samples: &[MetricSample],
        scenario: Option<ScenarioKind>,
    ) -> Result<CycleReport, CoreError> {
        let alerts = self.engine.evaluate(samples);

        let snapshot = match scenario {
            Some(kind) => Some(self.simulator.simulate(
                kind,
                &self.equipment_id,
                self.operating_hours,
            )?),
            None => None,
        };

        self.cycles_completed += 1;
        debug!(
            cycle = self.cycles_completed,
            samples = samples.len(),
            alerts = alerts.len(),
            scenario = scenario.map(|s| s.to_string()),
            "Monitoring cycle complete"
        );

        Ok(CycleReport {
            alerts,
            snapshot,
            generated_at: Utc::now(),
        })
    }

    /// Swap the rule set, re-arming all activation state
    pub fn replace_rules(&mut self, rules: Vec<ThresholdRule>) -> Result<(), CoreError> {
        self.engine = RuleEngine::new(rules)?;
        Ok(())
    }

    pub fn set_operating_hours(&mut self, hours: f64) -> Result<(), CoreError> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "operating hours must be non-negative, got {hours}"
            )));
        }
        self.operating_hours = hours;
        Ok(())
    }

    pub fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    pub fn operating_hours(&self) -> f64 {
        self.operating_hours
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn simulator(&self) -> &DegradationSimulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut DegradationSimulator {
        &mut self.simulator
    }
}

impl Default for MonitoringSession {
    /// A deterministic empty session suitable for tests: no rules, stock
    /// wear curves, "motor_principal" at zero operating hours. Production
    /// startup goes through [`MonitoringSession::new`] with configured parts.
    fn default() -> Self {
        Self {
            engine: RuleEngine::default(),
            simulator: DegradationSimulator::new(),
            equipment_id: "motor_principal".to_string(),
            operating_hours: 0.0,
            cycles_completed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, Comparator, Condition, Severity};

    fn session() -> MonitoringSession {
        let rules = vec![ThresholdRule {
            id: "temp-crit".to_string(),
            channel: Channel::Temperature,
            comparator: Comparator::GreaterThan,
            bound: 100.0,
            severity: Severity::Critical,
        }];
        MonitoringSession::new(
            RuleEngine::new(rules).unwrap(),
            DegradationSimulator::new(),
            "motor_principal",
            500.0,
        )
        .unwrap()
    }

    #[test]
    fn test_cycle_without_scenario_has_no_snapshot() {
        let mut session = session();
        let report = session
            .run_cycle(&[MetricSample::new(Channel::Temperature, 85.0, 0)], None)
            .unwrap();

        assert!(report.alerts.is_empty());
        assert!(report.snapshot.is_none());
    }

    #[test]
    fn test_cycle_with_scenario_includes_snapshot() {
        let mut session = session();
        let report = session
            .run_cycle(
                &[MetricSample::new(Channel::Temperature, 85.0, 0)],
                Some(ScenarioKind::Normal),
            )
            .unwrap();

        let snap = report.snapshot.expect("scenario cycle must carry a snapshot");
        assert_eq!(snap.equipment_id, "motor_principal");
        assert!((snap.remaining_life_pct - 85.0).abs() < 1e-10);
        assert_eq!(snap.condition, Condition::Optimal);
    }

    #[test]
    fn test_simulator_errors_propagate_unchanged() {
        let mut session = session();
        session.operating_hours = -5.0; // bypass the setter to hit the simulator check

        let err = session
            .run_cycle(&[], Some(ScenarioKind::Normal))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn test_hysteresis_spans_cycles() {
        let mut session = session();

        let first = session
            .run_cycle(&[MetricSample::new(Channel::Temperature, 110.0, 0)], None)
            .unwrap();
        assert_eq!(first.alerts.len(), 1);

        let second = session
            .run_cycle(&[MetricSample::new(Channel::Temperature, 111.0, 1)], None)
            .unwrap();
        assert!(
            second.alerts.is_empty(),
            "rule latched in cycle one must stay silent in cycle two"
        );
    }

    #[test]
    fn test_replace_rules_rearms_engine() {
        let mut session = session();
        session
            .run_cycle(&[MetricSample::new(Channel::Temperature, 110.0, 0)], None)
            .unwrap();

        let rules = session.engine().rules().to_vec();
        session.replace_rules(rules).unwrap();

        let report = session
            .run_cycle(&[MetricSample::new(Channel::Temperature, 110.0, 1)], None)
            .unwrap();
        assert_eq!(report.alerts.len(), 1);
    }

    #[test]
    fn test_set_operating_hours_validation() {
        let mut session = session();
        assert!(session.set_operating_hours(-1.0).is_err());
        assert!(session.set_operating_hours(f64::NAN).is_err());
        session.set_operating_hours(750.0).unwrap();
        assert_eq!(session.operating_hours(), 750.0);
    }

    #[test]
    fn test_cycle_counter_increments() {
        let mut session = session();
        session.run_cycle(&[], None).unwrap();
        session.run_cycle(&[], Some(ScenarioKind::Overheat)).unwrap();
        assert_eq!(session.cycles_completed(), 2);
    }
}
