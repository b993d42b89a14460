//! Metric names and the synthesis instrument set

use std::time::Duration;

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

pub const SYNTHESIS_DURATION: &str = "tts.synthesis.duration";
pub const SYNTHESIS_COUNT: &str = "tts.synthesis.count";

/// Outcome attribute values
pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";

/// Instruments recorded around every backend call
///
/// Built from the global meter provider, so recording is a no-op until
/// [`crate::init`] installs an exporter.
#[derive(Clone)]
pub struct SynthesisMetrics {
    duration: Histogram<f64>,
    count: Counter<u64>,
}

impl SynthesisMetrics {
    #[must_use]
    pub fn new() -> Self {
        let meter = global::meter("vibelog-tts");

        Self {
            duration: meter
                .f64_histogram(SYNTHESIS_DURATION)
                .with_unit("s")
                .with_description("Wall-clock time spent in the synthesis backend")
                .build(),
            count: meter
                .u64_counter(SYNTHESIS_COUNT)
                .with_description("Synthesis calls by backend, language and outcome")
                .build(),
        }
    }

    /// Record one finished backend call
    pub fn record(&self, backend: &str, language: &str, outcome: &'static str, elapsed: Duration) {
        let attributes = [
            KeyValue::new("backend", backend.to_string()),
            KeyValue::new("language", language.to_string()),
            KeyValue::new("outcome", outcome),
        ];

        self.duration.record(elapsed.as_secs_f64(), &attributes);
        self.count.add(1, &attributes);
    }
}

impl Default for SynthesisMetrics {
    fn default() -> Self {
        Self::new()
    }
}
