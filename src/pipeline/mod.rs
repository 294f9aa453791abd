//! Monitoring Pipeline Module
//!
//! ```text
//! Sample Source (CSV replay / synthetic)
//!        |
//!        v
//! Processing Loop -- run_cycle --> MonitoringSession (rules + wear model)
//!        |                                 |
//!        v                                 v
//! Alert / snapshot logging          MonitorState (shared with API)
//! ```
//!
//! The loop is source-agnostic: anything implementing [`SampleSource`]
//! can drive it, and all modes share the same shared-state handling.

mod state;
pub mod processing_loop;
pub mod source;

pub use processing_loop::{ProcessingLoop, RunStats};
pub use source::{CsvSource, SampleSource, SourceEvent, SyntheticSource};
pub use state::*;
