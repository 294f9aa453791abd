//! API route handlers
//!
//! Request handling logic for all API endpoints including:
//! - Service status and counters
//! - Threshold rule listing with live activation state
//! - Degradation scenario catalog and on-demand simulation
//! - Batch alert evaluation and full monitoring cycles

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::error::CoreError;
use crate::pipeline::MonitorState;
use crate::types::{Alert, Channel, Comparator, Condition, MetricSample, ScenarioKind, Severity};

// ============================================================================
// Response Types
// ============================================================================

/// Root-level `/health` response, shape-compatible with the original probe.
#[derive(Debug, Serialize)]
pub struct LegacyHealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Service status for `GET /api/v1/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub equipment_id: String,
    pub uptime_secs: u64,
    pub operating_hours: f64,
    pub cycles_completed: u64,
    pub samples_processed: u64,
    pub samples_skipped: u64,
    pub alerts_emitted: u64,
    pub rules_loaded: usize,
    pub active_rules: Vec<String>,
}

/// One rule with its live activation state for `GET /api/v1/rules`.
#[derive(Debug, Serialize)]
pub struct RuleView {
    pub id: String,
    pub channel: Channel,
    pub comparator: Comparator,
    pub bound: f64,
    pub severity: Severity,
    pub is_active: bool,
    pub trip_count: u64,
}

/// One scenario profile for `GET /api/v1/scenarios`.
#[derive(Debug, Serialize)]
pub struct ScenarioView {
    pub scenario: ScenarioKind,
    pub display_name: &'static str,
    pub base_life_pct: f64,
    pub decay_rate_per_hour: f64,
    pub condition: Condition,
    pub recommendation: String,
}

/// Result of `POST /api/v1/evaluate`.
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub alerts: Vec<Alert>,
    /// Cumulative engine counter since startup, not just this batch.
    pub alerts_emitted: u64,
    pub active_rules: Vec<String>,
}

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /api/v1/simulate`.
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub scenario: String,
    #[serde(default)]
    pub equipment_id: Option<String>,
    #[serde(default)]
    pub operating_hours: Option<f64>,
}

/// One sample row as it arrives on the wire.
///
/// The channel stays a string here so unknown names can be rejected with a
/// 400 instead of silently dropped.
#[derive(Debug, Deserialize)]
pub struct SampleEntry {
    pub channel: String,
    pub value: f64,
    pub timestamp: i64,
}

/// Body of `POST /api/v1/evaluate`.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub samples: Vec<SampleEntry>,
}

/// Body of `POST /api/v1/cycle`.
#[derive(Debug, Deserialize)]
pub struct CycleRequest {
    pub samples: Vec<SampleEntry>,
    #[serde(default)]
    pub scenario: Option<String>,
}

// ============================================================================
// Decode Helpers
// ============================================================================

fn decode_samples(entries: &[SampleEntry]) -> Result<Vec<MetricSample>, CoreError> {
    entries
        .iter()
        .map(|entry| {
            let channel = Channel::from_str(&entry.channel)
                .ok_or_else(|| CoreError::UnknownChannel(entry.channel.clone()))?;
            Ok(MetricSample::new(channel, entry.value, entry.timestamp))
        })
        .collect()
}

fn decode_scenario(name: &str) -> Result<ScenarioKind, CoreError> {
    ScenarioKind::from_str(name).ok_or_else(|| CoreError::UnknownScenario(name.to_string()))
}

// ============================================================================
// Health & Status
// ============================================================================

/// GET /health, legacy liveness probe with a plain shape without the envelope.
pub async fn legacy_health_check() -> Json<LegacyHealthResponse> {
    Json(LegacyHealthResponse {
        status: "active",
        service: "maintenance-api",
    })
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<MonitorState>) -> Response {
    let status = state.status.read().await.to_string();
    let session = state.session.read().await;
    let engine = session.engine();

    ApiResponse::ok(StatusResponse {
        status,
        equipment_id: session.equipment_id().to_string(),
        uptime_secs: state.uptime_secs(),
        operating_hours: session.operating_hours(),
        cycles_completed: session.cycles_completed(),
        samples_processed: engine.samples_processed(),
        samples_skipped: engine.samples_skipped(),
        alerts_emitted: engine.alerts_emitted(),
        rules_loaded: engine.rules().len(),
        active_rules: engine
            .active_rule_ids()
            .into_iter()
            .map(|id| id.to_string())
            .collect(),
    })
}

/// GET /api/v1/rules
pub async fn get_rules(State(state): State<MonitorState>) -> Response {
    let session = state.session.read().await;
    let engine = session.engine();

    let rules: Vec<RuleView> = engine
        .rules()
        .iter()
        .map(|rule| {
            let (is_active, trip_count) = engine
                .state(&rule.id)
                .map_or((false, 0), |s| (s.is_active, s.trip_count));
            RuleView {
                id: rule.id.clone(),
                channel: rule.channel,
                comparator: rule.comparator,
                bound: rule.bound,
                severity: rule.severity,
                is_active,
                trip_count,
            }
        })
        .collect();

    ApiResponse::ok(rules)
}

/// GET /api/v1/scenarios
pub async fn get_scenarios(State(state): State<MonitorState>) -> Response {
    let session = state.session.read().await;

    let scenarios: Vec<ScenarioView> = session
        .simulator()
        .profiles()
        .into_iter()
        .map(|(kind, profile)| ScenarioView {
            scenario: kind,
            display_name: kind.display_name(),
            base_life_pct: profile.base_life_pct,
            decay_rate_per_hour: profile.decay_rate_per_hour,
            condition: profile.condition,
            recommendation: profile.recommendation.clone(),
        })
        .collect();

    ApiResponse::ok(scenarios)
}

// ============================================================================
// Simulation & Evaluation
// ============================================================================

/// POST /api/v1/simulate
///
/// Projects equipment health without touching rule state. Equipment id and
/// operating hours default to the session's configured values.
pub async fn simulate(
    State(state): State<MonitorState>,
    Json(request): Json<SimulateRequest>,
) -> Response {
    let kind = match decode_scenario(&request.scenario) {
        Ok(kind) => kind,
        Err(e) => return ApiErrorResponse::from_core(&e),
    };

    let session = state.session.read().await;
    let equipment_id = request
        .equipment_id
        .as_deref()
        .unwrap_or_else(|| session.equipment_id());
    let hours = request
        .operating_hours
        .unwrap_or_else(|| session.operating_hours());

    match session.simulator().simulate(kind, equipment_id, hours) {
        Ok(snapshot) => ApiResponse::ok(snapshot),
        Err(e) => ApiErrorResponse::from_core(&e),
    }
}

/// POST /api/v1/evaluate
///
/// Runs a batch through the shared rule engine. Activation state persists,
/// so repeated violations across requests stay suppressed until recovery.
pub async fn evaluate(
    State(state): State<MonitorState>,
    Json(request): Json<EvaluateRequest>,
) -> Response {
    let samples = match decode_samples(&request.samples) {
        Ok(samples) => samples,
        Err(e) => return ApiErrorResponse::from_core(&e),
    };

    let mut session = state.session.write().await;
    match session.run_cycle(&samples, None) {
        Ok(report) => {
            let engine = session.engine();
            ApiResponse::ok(EvaluateResponse {
                alerts: report.alerts,
                alerts_emitted: engine.alerts_emitted(),
                active_rules: engine
                    .active_rule_ids()
                    .into_iter()
                    .map(|id| id.to_string())
                    .collect(),
            })
        }
        Err(e) => ApiErrorResponse::from_core(&e),
    }
}

/// POST /api/v1/cycle
///
/// Full monitoring cycle: evaluate the batch and, when a scenario is given,
/// attach a health snapshot.
pub async fn run_cycle(
    State(state): State<MonitorState>,
    Json(request): Json<CycleRequest>,
) -> Response {
    let samples = match decode_samples(&request.samples) {
        Ok(samples) => samples,
        Err(e) => return ApiErrorResponse::from_core(&e),
    };
    let scenario = match request.scenario.as_deref().map(decode_scenario).transpose() {
        Ok(kind) => kind,
        Err(e) => return ApiErrorResponse::from_core(&e),
    };

    let mut session = state.session.write().await;
    match session.run_cycle(&samples, scenario) {
        Ok(report) => ApiResponse::ok(report),
        Err(e) => ApiErrorResponse::from_core(&e),
    }
}
