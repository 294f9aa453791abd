//! Degradation scenario simulator
//!
//! Projects equipment health under a named failure scenario with a linear
//! wear model: remaining life starts at the scenario's base percentage and
//! decays at a fixed rate per operating hour. The projection is pure math,
//! no clock and no randomness, so equal inputs always give equal snapshots.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::types::{Condition, HealthSnapshot, ScenarioKind, ScenarioProfile};

/// Recommendation issued once a projection reaches zero remaining life
const END_OF_LIFE_RECOMMENDATION: &str =
    "Remaining life exhausted: replace the unit before returning to service";

/// Scenario catalog plus the linear remaining-life model
#[derive(Debug, Clone)]
pub struct DegradationSimulator {
    profiles: HashMap<ScenarioKind, ScenarioProfile>,
}

impl Default for DegradationSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationSimulator {
    /// Simulator with the built-in scenario catalog
    pub fn new() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            ScenarioKind::Normal,
            ScenarioProfile {
                base_life_pct: 100.0,
                decay_rate_per_hour: 0.03,
                condition: Condition::Optimal,
                recommendation: "Schedule preventive maintenance within 30 days".to_string(),
            },
        );
        profiles.insert(
            ScenarioKind::Overheat,
            ScenarioProfile {
                base_life_pct: 70.0,
                decay_rate_per_hour: 0.10,
                condition: Condition::Critical,
                recommendation: "Shut down and inspect the cooling system immediately".to_string(),
            },
        );
        profiles.insert(
            ScenarioKind::ExcessVibration,
            ScenarioProfile {
                base_life_pct: 80.0,
                decay_rate_per_hour: 0.06,
                condition: Condition::Degraded,
                recommendation: "Check bearing wear and shaft alignment".to_string(),
            },
        );
        profiles.insert(
            ScenarioKind::PressureLoss,
            ScenarioProfile {
                base_life_pct: 75.0,
                decay_rate_per_hour: 0.08,
                condition: Condition::Degraded,
                recommendation: "Inspect hydraulic lines and seals for leaks".to_string(),
            },
        );
        Self { profiles }
    }

    /// Override the numeric fields of one scenario profile
    ///
    /// Condition and recommendation stay fixed per scenario; only the wear
    /// numbers are site-tunable. Values are validated the same way the
    /// config layer validates them.
    pub fn set_wear_curve(
        &mut self,
        kind: ScenarioKind,
        base_life_pct: f64,
        decay_rate_per_hour: f64,
    ) -> Result<(), CoreError> {
        if !(base_life_pct.is_finite() && base_life_pct > 0.0 && base_life_pct <= 100.0) {
            return Err(CoreError::Configuration(format!(
                "scenario '{kind}': base life must be in (0, 100], got {base_life_pct}"
            )));
        }
        if !(decay_rate_per_hour.is_finite() && decay_rate_per_hour >= 0.0) {
            return Err(CoreError::Configuration(format!(
                "scenario '{kind}': decay rate must be non-negative, got {decay_rate_per_hour}"
            )));
        }
        if let Some(profile) = self.profiles.get_mut(&kind) {
            profile.base_life_pct = base_life_pct;
            profile.decay_rate_per_hour = decay_rate_per_hour;
        }
        Ok(())
    }

    /// Project equipment health under `scenario` after `operating_hours`
    ///
    /// remaining = clamp(base_life - decay_rate * hours, 0, 100). At zero
    /// remaining life the condition escalates to Critical and the
    /// recommendation becomes a replacement notice regardless of profile.
    pub fn simulate(
        &self,
        scenario: ScenarioKind,
        equipment_id: &str,
        operating_hours: f64,
    ) -> Result<HealthSnapshot, CoreError> {
        if !operating_hours.is_finite() {
            return Err(CoreError::InvalidInput(format!(
                "operating hours must be finite, got {operating_hours}"
            )));
        }
        if operating_hours < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "operating hours must be non-negative, got {operating_hours}"
            )));
        }

        let profile = self.profiles.get(&scenario).ok_or_else(|| {
            CoreError::UnknownScenario(scenario.to_string())
        })?;

        let raw = profile.base_life_pct - profile.decay_rate_per_hour * operating_hours;
        let remaining_life_pct = raw.clamp(0.0, 100.0);

        let (condition, recommendation) = if remaining_life_pct <= 0.0 {
            (Condition::Critical, END_OF_LIFE_RECOMMENDATION.to_string())
        } else {
            (profile.condition, profile.recommendation.clone())
        };

        Ok(HealthSnapshot {
            equipment_id: equipment_id.to_string(),
            scenario,
            condition,
            remaining_life_pct,
            operating_hours,
            recommendation,
        })
    }

    /// Catalog entries in a stable order (scenario kind declaration order)
    pub fn profiles(&self) -> Vec<(ScenarioKind, &ScenarioProfile)> {
        ScenarioKind::ALL
            .iter()
            .filter_map(|kind| self.profiles.get(kind).map(|p| (*kind, p)))
            .collect()
    }
}
