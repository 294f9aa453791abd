//! Sample source abstraction for the monitoring pipeline.
//!
//! Provides a unified trait for obtaining metric batches from different
//! sources: CSV files (replay) and the built-in synthetic generator, so the
//! processing loop is written once.

use anyhow::Result;
use async_trait::async_trait;

use crate::telemetry;
use crate::types::MetricSample;

/// Events produced by a sample source.
pub enum SourceEvent {
    /// A batch of samples ready for one monitoring cycle.
    Batch(Vec<MetricSample>),
    /// Source reached end of data.
    Eof,
}

/// Trait abstracting where metric batches come from.
///
/// Implementations handle parsing and pacing internally. The processing
/// loop calls [`next_batch`] in a select! with cancellation.
#[async_trait]
pub trait SampleSource: Send + 'static {
    /// Read the next batch from the source.
    ///
    /// Returns `SourceEvent::Eof` when no more data is available.
    async fn next_batch(&mut self) -> Result<SourceEvent>;

    /// Human-readable name for logging (e.g. "CSV", "synthetic").
    fn source_name(&self) -> &str;
}

// ============================================================================
// CSV Source (file replay)
// ============================================================================

/// Replays batches parsed from a CSV file with optional inter-batch delay.
///
/// Rows sharing a timestamp are grouped into one batch, so a reading instant
/// across several channels arrives at the engine together.
pub struct CsvSource {
    batches: std::vec::IntoIter<Vec<MetricSample>>,
    delay_ms: u64,
    yielded_first: bool,
}

impl CsvSource {
    /// Load and group a CSV file. Unreadable files come back as an empty
    /// source; the reason is already logged by the telemetry layer.
    pub fn from_path(path: &str, delay_ms: u64) -> Self {
        let batches = batch_by_timestamp(telemetry::read_csv_samples(path));
        Self {
            batches: batches.into_iter(),
            delay_ms,
            yielded_first: false,
        }
    }

    /// Batches left to replay.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}

#[async_trait]
impl SampleSource for CsvSource {
    async fn next_batch(&mut self) -> Result<SourceEvent> {
        // Delay between batches (skip the delay before the first batch so
        // replay starts immediately).
        if self.yielded_first && self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }
        match self.batches.next() {
            Some(batch) => {
                self.yielded_first = true;
                Ok(SourceEvent::Batch(batch))
            }
            None => Ok(SourceEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        "CSV"
    }
}

/// Group consecutive samples that share a timestamp into batches.
///
/// Rows are taken in file order; an out-of-order timestamp simply starts a
/// new batch rather than being merged backwards.
fn batch_by_timestamp(samples: Vec<MetricSample>) -> Vec<Vec<MetricSample>> {
    let mut batches: Vec<Vec<MetricSample>> = Vec::new();
    for sample in samples {
        match batches.last_mut() {
            Some(batch) if batch[0].timestamp == sample.timestamp => batch.push(sample),
            _ => batches.push(vec![sample]),
        }
    }
    batches
}

// ============================================================================
// Synthetic Source (seeded demo data)
// ============================================================================

/// Yields the built-in degradation walk: healthy operation, a fault
/// excursion, then recovery.
///
/// The walk is generated up front from the seed, so two sources with the
/// same seed replay identical data.
pub struct SyntheticSource {
    batches: std::vec::IntoIter<Vec<MetricSample>>,
    delay_ms: u64,
    yielded_first: bool,
}

impl SyntheticSource {
    pub fn new(seed: u64, delay_ms: u64) -> Self {
        Self {
            batches: telemetry::generate_demo_batches(seed).into_iter(),
            delay_ms,
            yielded_first: false,
        }
    }
}

#[async_trait]
impl SampleSource for SyntheticSource {
    async fn next_batch(&mut self) -> Result<SourceEvent> {
        if self.yielded_first && self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }
        match self.batches.next() {
            Some(batch) => {
                self.yielded_first = true;
                Ok(SourceEvent::Batch(batch))
            }
            None => Ok(SourceEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        "synthetic"
    }
}
