//! Degradation scenario types: ScenarioKind, Condition, ScenarioProfile, HealthSnapshot

use serde::{Deserialize, Serialize};

// ============================================================================
// Condition
// ============================================================================

/// Operating condition band reported in a health snapshot
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    #[default]
    Optimal = 1,
    Degraded = 2,
    Critical = 3,
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Optimal => write!(f, "OPTIMAL"),
            Condition::Degraded => write!(f, "DEGRADED"),
            Condition::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ============================================================================
// Scenario Kind
// ============================================================================

/// Named degradation scenario the simulator can project
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Healthy equipment wearing at its routine rate
    #[default]
    Normal,
    /// Cooling failure, thermal stress on windings and bearings
    Overheat,
    /// Mechanical looseness, imbalance or bearing wear
    ExcessVibration,
    /// Hydraulic leak or seal failure
    PressureLoss,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Normal,
        ScenarioKind::Overheat,
        ScenarioKind::ExcessVibration,
        ScenarioKind::PressureLoss,
    ];

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            ScenarioKind::Normal => "Normal operation",
            ScenarioKind::Overheat => "Overheat",
            ScenarioKind::ExcessVibration => "Excess vibration",
            ScenarioKind::PressureLoss => "Pressure loss",
        }
    }

    /// Parse from string (for API/chat/config)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" | "nominal" => Some(ScenarioKind::Normal),
            "overheat" | "overheating" => Some(ScenarioKind::Overheat),
            "excess_vibration" | "excessvibration" | "vibration" => {
                Some(ScenarioKind::ExcessVibration)
            }
            "pressure_loss" | "pressureloss" | "pressure" => Some(ScenarioKind::PressureLoss),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioKind::Normal => write!(f, "normal"),
            ScenarioKind::Overheat => write!(f, "overheat"),
            ScenarioKind::ExcessVibration => write!(f, "excess_vibration"),
            ScenarioKind::PressureLoss => write!(f, "pressure_loss"),
        }
    }
}

// ============================================================================
// Scenario Profile
// ============================================================================

/// Degradation profile backing one scenario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioProfile {
    /// Life percentage before any operating hours are applied
    pub base_life_pct: f64,
    /// Life percentage lost per operating hour
    pub decay_rate_per_hour: f64,
    /// Condition reported while remaining life stays above zero
    pub condition: Condition,
    /// Maintenance recommendation for this failure mode
    pub recommendation: String,
}

// ============================================================================
// Health Snapshot
// ============================================================================

/// Projected equipment health under a degradation scenario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthSnapshot {
    pub equipment_id: String,
    pub scenario: ScenarioKind,
    pub condition: Condition,
    /// Remaining useful life, clamped to [0, 100]
    pub remaining_life_pct: f64,
    pub operating_hours: f64,
    pub recommendation: String,
}

impl std::fmt::Display for HealthSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {:.1}% life remaining after {:.0} h ({})",
            self.equipment_id,
            self.condition,
            self.remaining_life_pct,
            self.operating_hours,
            self.scenario
        )
    }
}
