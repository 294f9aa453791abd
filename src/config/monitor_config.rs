//! Monitor configuration - equipment identity, rule set and wear curves as
//! operator-tunable TOML values
//!
//! Every struct implements `Default` with the built-in values, so an absent
//! or empty config file yields the stock monitoring setup unchanged.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::{Channel, Comparator, ScenarioKind, Severity, ThresholdRule};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one monitored equipment deployment.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$VIGIA_CONFIG` env var
/// 2. `./vigia.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Monitored equipment identity
    #[serde(default)]
    pub equipment: EquipmentConfig,

    /// Threshold rules evaluated against incoming samples
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleEntry>,

    /// Per-scenario wear curve overrides
    #[serde(default)]
    pub scenarios: ScenarioOverrides,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            equipment: EquipmentConfig::default(),
            rules: default_rules(),
            scenarios: ScenarioOverrides::default(),
            server: ServerConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$VIGIA_CONFIG` environment variable
    /// 2. `./vigia.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("VIGIA_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), equipment = %config.equipment.id, "Loaded monitor config from VIGIA_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from VIGIA_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "VIGIA_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("vigia.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(equipment = %config.equipment.id, "Loaded monitor config from ./vigia.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./vigia.toml, using defaults");
                }
            }
        }

        info!("No vigia.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the whole config, collecting every problem before failing.
    ///
    /// Rules:
    /// - Equipment id must be non-empty, default hours non-negative
    /// - Every rule entry must parse (known channel/comparator/severity,
    ///   finite bound) and ids must be unique
    /// - For a warning/critical pair on the same channel and direction, the
    ///   critical rule must trip later than the warning rule
    /// - Wear curve overrides must keep base life in (0, 100] and a
    ///   non-negative finite decay rate
    /// - The server address must parse as a socket address
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.equipment.id.trim().is_empty() {
            errors.push("equipment.id must not be empty".to_string());
        }
        let hours = self.equipment.default_operating_hours;
        if !hours.is_finite() || hours < 0.0 {
            errors.push(format!(
                "equipment.default_operating_hours must be non-negative, got {hours}"
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut parsed: Vec<ThresholdRule> = Vec::new();
        for entry in &self.rules {
            if !seen.insert(entry.id.as_str()) {
                errors.push(format!("duplicate rule id '{}'", entry.id));
            }
            match entry.parse() {
                Ok(rule) => parsed.push(rule),
                Err(e) => errors.push(e),
            }
        }
        Self::check_escalation_pairs(&parsed, &mut errors);

        for (kind, curve) in self.scenarios.entries() {
            if !(curve.base_life_pct.is_finite()
                && curve.base_life_pct > 0.0
                && curve.base_life_pct <= 100.0)
            {
                errors.push(format!(
                    "scenarios.{kind}: base_life_pct must be in (0, 100], got {}",
                    curve.base_life_pct
                ));
            }
            if !curve.decay_rate_per_hour.is_finite() || curve.decay_rate_per_hour < 0.0 {
                errors.push(format!(
                    "scenarios.{kind}: decay_rate_per_hour must be non-negative, got {}",
                    curve.decay_rate_per_hour
                ));
            }
        }

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr is not a valid socket address: '{}'",
                self.server.addr
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the validated rule set for the engine.
    pub fn threshold_rules(&self) -> Result<Vec<ThresholdRule>, ConfigError> {
        let mut rules = Vec::with_capacity(self.rules.len());
        let mut errors = Vec::new();
        for entry in &self.rules {
            match entry.parse() {
                Ok(rule) => rules.push(rule),
                Err(e) => errors.push(e),
            }
        }
        if errors.is_empty() {
            Ok(rules)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// For each channel+direction pair that has both severities, the warning
    /// rule must trip before the critical one.
    fn check_escalation_pairs(rules: &[ThresholdRule], errors: &mut Vec<String>) {
        for warn_rule in rules.iter().filter(|r| r.severity == Severity::Warning) {
            for crit_rule in rules.iter().filter(|r| {
                r.severity == Severity::Critical
                    && r.channel == warn_rule.channel
                    && direction(r.comparator) == direction(warn_rule.comparator)
            }) {
                let ok = match direction(warn_rule.comparator) {
                    Direction::Upper => crit_rule.bound >= warn_rule.bound,
                    Direction::Lower => crit_rule.bound <= warn_rule.bound,
                };
                if !ok {
                    errors.push(format!(
                        "rules '{}' / '{}': critical bound ({:.3}) must escalate past warning bound ({:.3})",
                        warn_rule.id, crit_rule.id, crit_rule.bound, warn_rule.bound
                    ));
                }
            }
        }
    }
}

#[derive(PartialEq)]
enum Direction {
    Upper,
    Lower,
}

fn direction(comparator: Comparator) -> Direction {
    match comparator {
        Comparator::GreaterThan | Comparator::GreaterEqual => Direction::Upper,
        Comparator::LessThan | Comparator::LessEqual => Direction::Lower,
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// Identification of the monitored equipment, as it appears in snapshots and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentConfig {
    /// Equipment identifier
    #[serde(default = "default_equipment_id")]
    pub id: String,

    /// Operating hours assumed when a caller does not supply them
    #[serde(default = "default_operating_hours")]
    pub default_operating_hours: f64,
}

fn default_equipment_id() -> String {
    "motor_principal".to_string()
}
fn default_operating_hours() -> f64 {
    500.0
}

impl Default for EquipmentConfig {
    fn default() -> Self {
        Self {
            id: default_equipment_id(),
            default_operating_hours: default_operating_hours(),
        }
    }
}

// ============================================================================
// Rule Entries
// ============================================================================

/// One `[[rules]]` table entry.
///
/// Channel, comparator and severity arrive as strings so config files can
/// use the same spellings the API accepts; `parse()` turns an entry into a
/// typed `ThresholdRule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    pub id: String,
    pub channel: String,
    pub comparator: String,
    pub bound: f64,
    pub severity: String,
}

impl RuleEntry {
    fn entry(id: &str, channel: &str, comparator: &str, bound: f64, severity: &str) -> Self {
        Self {
            id: id.to_string(),
            channel: channel.to_string(),
            comparator: comparator.to_string(),
            bound,
            severity: severity.to_string(),
        }
    }

    /// Convert to a typed rule, reporting the offending field on failure.
    pub fn parse(&self) -> Result<ThresholdRule, String> {
        let channel = Channel::from_str(&self.channel)
            .ok_or_else(|| format!("rule '{}': unknown channel '{}'", self.id, self.channel))?;
        let comparator = Comparator::from_str(&self.comparator).ok_or_else(|| {
            format!(
                "rule '{}': unknown comparator '{}'",
                self.id, self.comparator
            )
        })?;
        let severity = Severity::from_str(&self.severity)
            .ok_or_else(|| format!("rule '{}': unknown severity '{}'", self.id, self.severity))?;
        ThresholdRule::new(self.id.clone(), channel, comparator, self.bound, severity)
            .map_err(|e| e.to_string())
    }
}

/// Stock rule set: temperature bands from the motor reference curve, ISO
/// 10816-3 vibration zone boundaries, rpm near the top of the operating
/// range and hydraulic pressure floors.
fn default_rules() -> Vec<RuleEntry> {
    vec![
        RuleEntry::entry("temp-warn", "temperature", ">", 90.0, "warning"),
        RuleEntry::entry("temp-crit", "temperature", ">", 100.0, "critical"),
        RuleEntry::entry("rpm-warn", "rpm", ">", 4800.0, "warning"),
        RuleEntry::entry("vib-warn", "vibration", ">", 7.1, "warning"),
        RuleEntry::entry("vib-crit", "vibration", ">", 18.0, "critical"),
        RuleEntry::entry("press-warn", "pressure", "<", 3.0, "warning"),
        RuleEntry::entry("press-crit", "pressure", "<", 2.0, "critical"),
    ]
}

// ============================================================================
// Scenario Overrides
// ============================================================================

/// Numeric wear curve for one scenario.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WearCurve {
    pub base_life_pct: f64,
    pub decay_rate_per_hour: f64,
}

/// Optional per-scenario overrides of the built-in wear curves.
///
/// Condition and recommendation are not tunable; only the numbers are.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenarioOverrides {
    #[serde(default)]
    pub normal: Option<WearCurve>,
    #[serde(default)]
    pub overheat: Option<WearCurve>,
    #[serde(default)]
    pub excess_vibration: Option<WearCurve>,
    #[serde(default)]
    pub pressure_loss: Option<WearCurve>,
}

impl ScenarioOverrides {
    /// The overrides that are actually set, in scenario declaration order.
    pub fn entries(&self) -> Vec<(ScenarioKind, WearCurve)> {
        [
            (ScenarioKind::Normal, self.normal),
            (ScenarioKind::Overheat, self.overheat),
            (ScenarioKind::ExcessVibration, self.excess_vibration),
            (ScenarioKind::PressureLoss, self.pressure_loss),
        ]
        .into_iter()
        .filter_map(|(kind, curve)| curve.map(|c| (kind, c)))
        .collect()
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `VIGIA_SERVER_ADDR` env var or `--bind` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validates() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: MonitorConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.equipment.id, "motor_principal");
        assert_eq!(config.equipment.default_operating_hours, 500.0);
        assert_eq!(config.rules.len(), 7);
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert!(config.scenarios.entries().is_empty());
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[equipment]
id = "pump-07"

[scenarios.overheat]
base_life_pct = 60.0
decay_rate_per_hour = 0.2
"#;
        let config: MonitorConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.equipment.id, "pump-07");
        // Non-overridden values retain defaults
        assert_eq!(config.equipment.default_operating_hours, 500.0);
        assert_eq!(config.rules.len(), 7);
        let entries = config.scenarios.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, ScenarioKind::Overheat);
        assert_eq!(entries[0].1.base_life_pct, 60.0);
    }

    #[test]
    fn test_explicit_rules_replace_defaults() {
        let toml_str = r#"
[[rules]]
id = "only-rule"
channel = "pressure"
comparator = "<="
bound = 1.5
severity = "critical"
"#;
        let config: MonitorConfig = toml::from_str(toml_str).expect("rules TOML should parse");
        assert!(config.validate().is_ok());
        let rules = config.threshold_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "only-rule");
        assert_eq!(rules[0].channel, Channel::Pressure);
        assert_eq!(rules[0].comparator, Comparator::LessEqual);
    }

    #[test]
    fn test_validation_catches_unknown_channel() {
        let mut config = MonitorConfig::default();
        config.rules.push(RuleEntry::entry("bad", "voltage", ">", 1.0, "warning"));
        let result = config.validate();
        assert!(result.is_err(), "Unknown channel should fail validation");
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("voltage")));
        }
    }

    #[test]
    fn test_validation_catches_inverted_escalation() {
        let toml_str = r#"
[[rules]]
id = "t-warn"
channel = "temperature"
comparator = ">"
bound = 100.0
severity = "warning"

[[rules]]
id = "t-crit"
channel = "temperature"
comparator = ">"
bound = 90.0
severity = "critical"
"#;
        let config: MonitorConfig = toml::from_str(toml_str).expect("TOML should parse");
        let result = config.validate();
        assert!(result.is_err(), "Critical below warning should fail validation");
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("escalate")));
        }
    }

    #[test]
    fn test_validation_catches_duplicate_ids() {
        let mut config = MonitorConfig::default();
        config
            .rules
            .push(RuleEntry::entry("temp-warn", "temperature", ">", 95.0, "warning"));
        let result = config.validate();
        assert!(result.is_err(), "Duplicate rule ids should fail validation");
    }

    #[test]
    fn test_validation_catches_bad_wear_curve() {
        let mut config = MonitorConfig::default();
        config.scenarios.normal = Some(WearCurve {
            base_life_pct: 150.0,
            decay_rate_per_hour: -0.5,
        });
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert_eq!(errors.len(), 2, "both curve fields should be reported");
        }
    }

    #[test]
    fn test_validation_catches_bad_server_addr() {
        let mut config = MonitorConfig::default();
        config.server.addr = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = MonitorConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: MonitorConfig =
            toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original.equipment.id, roundtripped.equipment.id);
        assert_eq!(original.rules.len(), roundtripped.rules.len());
        assert_eq!(original.server.addr, roundtripped.server.addr);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[equipment]
id = "compressor-3"
default_operating_hours = 1200.0
"#
        )
        .expect("write temp config");

        let config = MonitorConfig::load_from_file(file.path()).expect("load should succeed");
        assert_eq!(config.equipment.id, "compressor-3");
        assert_eq!(config.equipment.default_operating_hours, 1200.0);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[[rules]]
id = "bad"
channel = "temperature"
comparator = "between"
bound = 90.0
severity = "warning"
"#
        )
        .expect("write temp config");

        let err = MonitorConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MonitorConfig::load_from_file(Path::new("/no/such/vigia.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
