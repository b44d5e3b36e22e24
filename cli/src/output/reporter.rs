//! `LogReporter` — production implementation of `ProgressReporter`.
//!
//! Forwards every application event to `tracing`, so the subscriber set up in
//! `main` decides filtering and formatting.

use crate::application::ports::ProgressReporter;

/// Progress reporter that emits `tracing` events under the `paws` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn step(&self, message: &str) {
        tracing::info!(target: "paws", "{message}");
    }

    fn success(&self, message: &str) {
        tracing::info!(target: "paws", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "paws", "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "paws", "{message}");
    }
}
