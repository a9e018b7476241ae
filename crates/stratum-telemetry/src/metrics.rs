//! Metric names and recording helpers for model invocations

use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};

pub const MODEL_INVOCATION_COUNT: &str = "model.invocation.count";
pub const MODEL_INVOCATION_DURATION: &str = "model.invocation.duration";
pub const MODEL_TOKEN_USAGE: &str = "model.token.usage";

/// Instruments recorded around each model invocation
///
/// Backed by the global meter provider; a no-op until
/// [`init`](crate::init) installs an exporter.
#[derive(Clone)]
pub struct ModelMetrics {
    invocations: Counter<u64>,
    duration: Histogram<f64>,
    tokens: Counter<u64>,
}

impl ModelMetrics {
    pub fn new() -> Self {
        let meter = global::meter("stratum");

        Self {
            invocations: meter
                .u64_counter(MODEL_INVOCATION_COUNT)
                .with_description("Model invocations by outcome")
                .build(),
            duration: meter
                .f64_histogram(MODEL_INVOCATION_DURATION)
                .with_unit("s")
                .with_description("Wall time of a single model invocation")
                .build(),
            tokens: meter
                .u64_counter(MODEL_TOKEN_USAGE)
                .with_description("Tokens consumed by model invocations")
                .build(),
        }
    }

    /// Count one invocation and record how long it took
    pub fn record_invocation(&self, model_id: &str, outcome: &'static str, start: Instant) {
        let attributes = [
            KeyValue::new("model.id", model_id.to_owned()),
            KeyValue::new("outcome", outcome),
        ];
        self.invocations.add(1, &attributes);
        self.duration.record(start.elapsed().as_secs_f64(), &attributes);
    }

    /// Add input and output token counts for a model
    pub fn record_usage(&self, model_id: &str, input_tokens: u64, output_tokens: u64) {
        let model = KeyValue::new("model.id", model_id.to_owned());
        self.tokens
            .add(input_tokens, &[model.clone(), KeyValue::new("token.type", "input")]);
        self.tokens.add(output_tokens, &[model, KeyValue::new("token.type", "output")]);
    }
}

impl Default for ModelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelMetrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_provider_is_a_no_op() {
        let metrics = ModelMetrics::new();
        metrics.record_invocation("test-model", "success", Instant::now());
        metrics.record_usage("test-model", 10, 5);
    }
}
