//! Unified cycle processing loop shared across all input modes.
//!
//! Extracts the batch -> cycle -> log pattern shared by CSV replay and
//! synthetic runs into a single [`ProcessingLoop`] that any
//! [`SampleSource`] can drive.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::source::{SampleSource, SourceEvent};
use super::state::{MonitorState, ServiceStatus};
use crate::types::{Alert, ScenarioKind, Severity};

// ============================================================================
// Run Statistics
// ============================================================================

/// Counters accumulated over one processing run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub batches_processed: u64,
    pub alerts_emitted: u64,
}

// ============================================================================
// Processing Loop
// ============================================================================

/// Owns everything needed to drive batches from a source through the
/// shared monitoring session.
///
/// Built with [`new()`](ProcessingLoop::new), then consumed by
/// [`run()`](ProcessingLoop::run).
pub struct ProcessingLoop {
    state: MonitorState,
    /// Scenario attached to every cycle; `None` runs alerting only.
    scenario: Option<ScenarioKind>,
    cancel_token: CancellationToken,
}

impl ProcessingLoop {
    pub fn new(
        state: MonitorState,
        scenario: Option<ScenarioKind>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            state,
            scenario,
            cancel_token,
        }
    }

    /// Run the processing loop until the source is exhausted or cancellation.
    ///
    /// Returns the run's counters.
    pub async fn run<S: SampleSource>(self, source: &mut S) -> RunStats {
        let mut stats = RunStats::default();

        info!("📊 Processing metric batches from {}...", source.source_name());
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        loop {
            let event = tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("[CycleRunner] Shutdown signal received");
                    break;
                }
                result = source.next_batch() => {
                    match result {
                        Ok(ev) => ev,
                        Err(e) => {
                            warn!("[CycleRunner] Source error: {}", e);
                            self.state.set_status(ServiceStatus::Error).await;
                            break;
                        }
                    }
                }
            };

            let samples = match event {
                SourceEvent::Batch(batch) => batch,
                SourceEvent::Eof => {
                    info!(
                        "[CycleRunner] Source reached end ({} batches processed)",
                        stats.batches_processed
                    );
                    break;
                }
            };

            stats.batches_processed += 1;

            let report = {
                let mut session = self.state.session.write().await;
                match session.run_cycle(&samples, self.scenario) {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("[CycleRunner] Cycle failed: {}", e);
                        self.state.set_status(ServiceStatus::Error).await;
                        continue;
                    }
                }
            };

            for alert in &report.alerts {
                stats.alerts_emitted += 1;
                log_alert(stats.alerts_emitted, alert);
            }

            if let Some(ref snapshot) = report.snapshot {
                info!("🩺 {}", snapshot);
            }

            // Status tracks whether any rule is latched right now.
            let latched = {
                let session = self.state.session.read().await;
                !session.engine().active_rule_ids().is_empty()
            };
            self.state
                .set_status(if latched {
                    ServiceStatus::Alert
                } else {
                    ServiceStatus::Monitoring
                })
                .await;

            // Progress indicator every 10 quiet batches
            if report.alerts.is_empty() && stats.batches_processed % 10 == 0 {
                info!(
                    "📈 Progress: {} batches | Alerts: {}",
                    stats.batches_processed, stats.alerts_emitted
                );
            }
        }

        // Final statistics
        let (samples_processed, samples_skipped, cycles) = {
            let session = self.state.session.read().await;
            (
                session.engine().samples_processed(),
                session.engine().samples_skipped(),
                session.cycles_completed(),
            )
        };
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("📊 FINAL STATISTICS");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("   Batches Processed:  {}", stats.batches_processed);
        info!("   Samples Processed:  {}", samples_processed);
        info!("   Samples Skipped:    {}", samples_skipped);
        info!("   Alerts Emitted:     {}", stats.alerts_emitted);
        info!("   Cycles Completed:   {}", cycles);
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        stats
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Log one alert at a level matching its severity.
fn log_alert(count: u64, alert: &Alert) {
    match alert.severity {
        Severity::Critical => error!("🚨 ALERT #{}: {}", count, alert),
        Severity::Warning => warn!("⚠️ ALERT #{}: {}", count, alert),
    }
}
