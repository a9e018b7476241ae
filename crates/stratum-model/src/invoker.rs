//! Single-shot completion invocation with centralized error mapping

use std::sync::Arc;
use std::time::Instant;

use stratum_telemetry::ModelMetrics;

use crate::error::{ModelError, classify};
use crate::transport::ConverseTransport;
use crate::types::{CompletionResponse, ConverseRequest};

/// Issues exactly one backend call per invocation
///
/// The transport handle is injected and shared. Failures are classified
/// once, here, so every call path reports the same error kinds.
#[derive(Clone)]
pub struct CompletionInvoker {
    transport: Arc<dyn ConverseTransport>,
    metrics: ModelMetrics,
}

impl CompletionInvoker {
    pub fn new(transport: Arc<dyn ConverseTransport>) -> Self {
        Self {
            transport,
            metrics: ModelMetrics::new(),
        }
    }

    /// Send the request and return the raw response unmodified
    ///
    /// No retries happen at this layer.
    #[tracing::instrument(skip_all, fields(model_id = %request.model_id, transport = self.transport.name()))]
    pub async fn invoke(&self, request: &ConverseRequest) -> Result<CompletionResponse, ModelError> {
        let start = Instant::now();

        match self.transport.converse(request).await {
            Ok(response) => {
                self.metrics.record_invocation(&request.model_id, "success", start);
                self.metrics.record_usage(
                    &request.model_id,
                    u64::from(response.usage.input_tokens),
                    u64::from(response.usage.output_tokens),
                );

                tracing::debug!(
                    total_tokens = response.usage.total_tokens,
                    tool_use = response.has_tool_use(),
                    "model invocation completed"
                );

                Ok(response)
            }
            Err(transport_error) => {
                let error = classify(transport_error);
                self.metrics.record_invocation(&request.model_id, error.kind(), start);

                tracing::warn!(kind = error.kind(), error = %error, "model invocation failed");

                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for CompletionInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionInvoker")
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}
