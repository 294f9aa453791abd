//! Telemetry acquisition helpers: CSV replay parsing and synthetic demo data
//!
//! CSV rows are `timestamp,channel,value`. Malformed rows and unknown
//! channel names are logged and skipped, so one bad row never kills a
//! replay.

use std::fs::File;
use std::io::{BufRead, BufReader};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Channel, MetricSample};

/// Read metric samples from a CSV file.
///
/// Returns whatever parsed; open failures return an empty vec after an
/// error log, matching replay semantics where missing data is not fatal.
pub fn read_csv_samples(path: &str) -> Vec<MetricSample> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to open CSV file");
            return Vec::new();
        }
    };

    let reader = BufReader::new(file);
    let mut samples = Vec::new();
    let mut line_num = 0;

    for line_result in reader.lines() {
        line_num += 1;

        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error reading CSV line");
                continue;
            }
        };

        // Skip header line
        if line_num == 1 && line.starts_with("timestamp") {
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        match parse_csv_line(&line) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error parsing CSV line");
                continue;
            }
        }
    }

    tracing::info!(path = %path, samples = samples.len(), "Loaded CSV telemetry");
    samples
}

fn parse_csv_line(line: &str) -> Result<MetricSample, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(format!("expected 3 fields, got {}", fields.len()));
    }

    let timestamp: i64 = fields[0]
        .parse()
        .map_err(|e| format!("bad timestamp '{}': {e}", fields[0]))?;
    let channel = Channel::from_str(fields[1])
        .ok_or_else(|| format!("unknown channel '{}'", fields[1]))?;
    let value: f64 = fields[2]
        .parse()
        .map_err(|e| format!("bad value '{}': {e}", fields[2]))?;

    Ok(MetricSample::new(channel, value, timestamp))
}

// ============================================================================
// Synthetic demo telemetry
// ============================================================================

/// Batches per phase of the demo walk
const HEALTHY_BATCHES: usize = 10;
const EXCURSION_BATCHES: usize = 6;
const RECOVERY_BATCHES: usize = 8;

/// Seconds between successive batches
const BATCH_INTERVAL_SECS: i64 = 60;

/// Generate a deterministic demo run: healthy operation, an overheat
/// excursion that trips the stock temperature/vibration/pressure rules, then
/// recovery so edge-triggered rules re-arm.
///
/// Each batch holds one sample per channel. The same seed always produces
/// the same batches.
pub fn generate_demo_batches(seed: u64) -> Vec<Vec<MetricSample>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut batches = Vec::with_capacity(HEALTHY_BATCHES + EXCURSION_BATCHES + RECOVERY_BATCHES);
    let base_timestamp = 1_705_564_800i64;
    let mut tick = 0i64;

    // Phase 1: healthy operation around nominal set points
    for i in 0..HEALTHY_BATCHES {
        let wobble = (i as f64 * 0.35).sin();
        batches.push(batch_at(
            base_timestamp + tick,
            2500.0 + wobble * 40.0 + rng.gen_range(-15.0..15.0),
            85.0 + wobble * 1.5 + rng.gen_range(-0.5..0.5),
            2.0 + wobble * 0.3 + rng.gen_range(-0.1..0.1),
            5.0 + wobble * 0.1 + rng.gen_range(-0.05..0.05),
        ));
        tick += BATCH_INTERVAL_SECS;
    }

    // Phase 2: overheat excursion; temperature ramps through the warning and
    // critical bounds while vibration climbs and pressure sags
    for i in 0..EXCURSION_BATCHES {
        let ramp = (i + 1) as f64 / EXCURSION_BATCHES as f64;
        batches.push(batch_at(
            base_timestamp + tick,
            2500.0 + ramp * 2400.0 + rng.gen_range(-15.0..15.0),
            88.0 + ramp * 18.0 + rng.gen_range(-0.5..0.5),
            2.0 + ramp * 6.5 + rng.gen_range(-0.1..0.1),
            5.0 - ramp * 2.5 + rng.gen_range(-0.05..0.05),
        ));
        tick += BATCH_INTERVAL_SECS;
    }

    // Phase 3: recovery back to nominal
    for i in 0..RECOVERY_BATCHES {
        let fall = 1.0 - (i + 1) as f64 / RECOVERY_BATCHES as f64;
        batches.push(batch_at(
            base_timestamp + tick,
            2500.0 + fall * 2200.0 + rng.gen_range(-15.0..15.0),
            86.0 + fall * 16.0 + rng.gen_range(-0.5..0.5),
            2.0 + fall * 5.5 + rng.gen_range(-0.1..0.1),
            5.0 - fall * 2.2 + rng.gen_range(-0.05..0.05),
        ));
        tick += BATCH_INTERVAL_SECS;
    }

    batches
}

fn batch_at(timestamp: i64, rpm: f64, temp: f64, vib: f64, press: f64) -> Vec<MetricSample> {
    vec![
        MetricSample::new(Channel::Rpm, rpm, timestamp),
        MetricSample::new(Channel::Temperature, temp, timestamp),
        MetricSample::new(Channel::Vibration, vib, timestamp),
        MetricSample::new(Channel::Pressure, press, timestamp),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_csv_line() {
        let sample = parse_csv_line("1705564800,temperature,92.5").unwrap();
        assert_eq!(sample.channel, Channel::Temperature);
        assert_eq!(sample.value, 92.5);
        assert_eq!(sample.timestamp, 1_705_564_800);
    }

    #[test]
    fn test_parse_csv_line_rejects_garbage() {
        assert!(parse_csv_line("only-one-field").is_err());
        assert!(parse_csv_line("x,temperature,92.5").is_err());
        assert!(parse_csv_line("1,voltage,92.5").is_err());
        assert!(parse_csv_line("1,temperature,hot").is_err());
    }

    #[test]
    fn test_read_csv_skips_bad_rows() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "timestamp,channel,value").expect("write");
        writeln!(file, "1705564800,temperature,85.0").expect("write");
        writeln!(file, "not,a,row,at,all").expect("write");
        writeln!(file, "1705564860,voltage,3.3").expect("write");
        writeln!(file, "1705564920,pressure,4.8").expect("write");

        let path = file.path().to_string_lossy().to_string();
        let samples = read_csv_samples(&path);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].channel, Channel::Temperature);
        assert_eq!(samples[1].channel, Channel::Pressure);
    }

    #[test]
    fn test_missing_csv_yields_empty() {
        assert!(read_csv_samples("/no/such/telemetry.csv").is_empty());
    }

    #[test]
    fn test_demo_batches_walk_through_a_fault() {
        let batches = generate_demo_batches(42);
        assert_eq!(
            batches.len(),
            HEALTHY_BATCHES + EXCURSION_BATCHES + RECOVERY_BATCHES
        );

        let temp_of = |batch: &[MetricSample]| {
            batch
                .iter()
                .find(|s| s.channel == Channel::Temperature)
                .map(|s| s.value)
                .unwrap()
        };

        // Healthy phase stays under the warning bound
        assert!(temp_of(&batches[0]) < 90.0);
        // Excursion peak crosses the critical bound
        let peak = batches
            .iter()
            .map(|b| temp_of(b))
            .fold(f64::MIN, f64::max);
        assert!(peak > 100.0, "demo walk must trip the critical bound, peak {peak}");
        // Recovery ends under the warning bound
        let last = batches.last().unwrap();
        assert!(temp_of(last) < 90.0);
    }

    #[test]
    fn test_demo_batches_are_deterministic_per_seed() {
        assert_eq!(generate_demo_batches(7), generate_demo_batches(7));
        assert_ne!(generate_demo_batches(7), generate_demo_batches(8));
    }

    #[test]
    fn test_demo_timestamps_advance_monotonically() {
        let batches = generate_demo_batches(1);
        let timestamps: Vec<i64> = batches.iter().map(|b| b[0].timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    }
}
