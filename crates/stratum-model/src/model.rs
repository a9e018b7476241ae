//! Configured Converse model: request seeding plus the non-streaming chunk path

use std::sync::Arc;

use stratum_config::ModelConfig;

use crate::error::ModelError;
use crate::invoker::CompletionInvoker;
use crate::normalize::{ChunkStream, normalize};
use crate::transport::ConverseTransport;
use crate::types::{CompletionResponse, ConverseRequest, InferenceParams, Message};

/// A Bedrock Converse model bound to its configuration and transport
#[derive(Debug, Clone)]
pub struct ConverseModel {
    config: ModelConfig,
    invoker: CompletionInvoker,
}

impl ConverseModel {
    pub fn new(config: ModelConfig, transport: Arc<dyn ConverseTransport>) -> Self {
        Self {
            config,
            invoker: CompletionInvoker::new(transport),
        }
    }

    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Whether the incremental streaming path is selected
    pub const fn is_streaming(&self) -> bool {
        self.config.streaming
    }

    /// Build a request for this model, seeded with the configured system
    /// prompt and inference parameters
    pub fn request(&self, messages: Vec<Message>) -> ConverseRequest {
        ConverseRequest {
            system: self.config.system_prompt.iter().cloned().collect(),
            messages,
            inference: InferenceParams {
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                stop_sequences: self.config.stop_sequences.clone(),
            },
            ..ConverseRequest::new(self.config.model_id.clone())
        }
    }

    /// One backend call returning the raw response
    pub async fn complete(&self, request: &ConverseRequest) -> Result<CompletionResponse, ModelError> {
        self.invoker.invoke(request).await
    }

    /// Produce the response as a chunk sequence
    ///
    /// The backend call completes before the first chunk exists, so
    /// failures surface here rather than mid-sequence.
    pub async fn stream(&self, request: &ConverseRequest) -> Result<ChunkStream, ModelError> {
        if self.config.streaming {
            return Err(ModelError::StreamingUnavailable);
        }

        let response = self.complete(request).await?;
        Ok(normalize(response))
    }
}
