//! Backend transports that execute a single Converse call

pub mod bedrock;

use async_trait::async_trait;

pub use bedrock::BedrockTransport;

use crate::error::TransportError;
use crate::types::{CompletionResponse, ConverseRequest};

/// Issues one request against the inference backend
///
/// Implementations own connection setup, credentials and any
/// transport-level retries. Errors are reported as normalized
/// [`TransportError`]s and classified by the caller.
#[async_trait]
pub trait ConverseTransport: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Send the request and wait for the complete response
    async fn converse(&self, request: &ConverseRequest) -> Result<CompletionResponse, TransportError>;
}
