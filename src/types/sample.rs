//! Telemetry input types: Channel, MetricSample

use serde::{Deserialize, Serialize};

// ============================================================================
// Metric Channel
// ============================================================================

/// Metric channel reported by equipment sensors
///
/// `Unknown` is the catch-all for channel names this build does not know
/// about. Samples carrying it are skipped during rule evaluation instead of
/// failing the whole batch; rules may not target it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Rpm,
    Temperature,
    Vibration,
    Pressure,
    #[serde(other)]
    Unknown,
}

impl Channel {
    /// Engineering unit for logs and UI
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Rpm => "rev/min",
            Channel::Temperature => "°C",
            Channel::Vibration => "mm/s",
            Channel::Pressure => "bar",
            Channel::Unknown => "",
        }
    }

    /// Parse from string (for API/config)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rpm" | "speed" | "revolutions" => Some(Channel::Rpm),
            "temperature" | "temp" => Some(Channel::Temperature),
            "vibration" | "vib" => Some(Channel::Vibration),
            "pressure" | "press" => Some(Channel::Pressure),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Rpm => write!(f, "rpm"),
            Channel::Temperature => write!(f, "temperature"),
            Channel::Vibration => write!(f, "vibration"),
            Channel::Pressure => write!(f, "pressure"),
            Channel::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Metric Sample
// ============================================================================

/// One sensor reading on one channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricSample {
    pub channel: Channel,
    pub value: f64,
    /// Sampling instant, unix epoch seconds
    pub timestamp: i64,
}

impl MetricSample {
    pub fn new(channel: Channel, value: f64, timestamp: i64) -> Self {
        Self {
            channel,
            value,
            timestamp,
        }
    }
}
