//! Error taxonomy shared by the engine, simulator and session layers

use thiserror::Error;

/// Failure modes surfaced at the library boundary
///
/// The session facade propagates these unchanged; HTTP and chat adapters map
/// them to their own status codes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Malformed value at an operation boundary (negative hours, NaN input)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Scenario name not in the catalog
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// Channel name not in the catalog
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Invalid rule or profile definition
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        CoreError::InvalidInput(msg.into())
    }

    /// Stable machine-readable code (used by the API error envelope)
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidInput(_) => "INVALID_INPUT",
            CoreError::UnknownScenario(_) => "UNKNOWN_SCENARIO",
            CoreError::UnknownChannel(_) => "UNKNOWN_CHANNEL",
            CoreError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
