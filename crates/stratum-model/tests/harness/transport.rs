//! Scripted in-memory transport for integration tests
//!
//! Replays queued outcomes in order and records every request it receives

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use stratum_model::types::{CompletionResponse, ConverseRequest, ResponseMessage, Usage};
use stratum_model::{ConverseTransport, TransportError};

/// Transport that returns pre-scripted outcomes
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<CompletionResponse, TransportError>>>,
    requests: Mutex<Vec<ConverseRequest>>,
    call_count: AtomicU32,
}

impl ScriptedTransport {
    /// Transport that answers every queued call in order
    pub fn new(outcomes: impl IntoIterator<Item = Result<CompletionResponse, TransportError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Transport with nothing scripted
    pub fn idle() -> Self {
        Self::new(Vec::<Result<CompletionResponse, TransportError>>::new())
    }

    /// Transport that answers once with the given response
    pub fn responding(response: CompletionResponse) -> Self {
        Self::new([Ok(response)])
    }

    /// Transport that fails once with the given code and message
    pub fn failing(code: &str, message: &str) -> Self {
        Self::new([Err(TransportError::new(code, message))])
    }

    /// Number of `converse` calls received
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Requests received, in order
    pub fn requests(&self) -> Vec<ConverseRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConverseTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn converse(&self, request: &ConverseRequest) -> Result<CompletionResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().unwrap().push(request.clone());

        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::uncoded("no scripted outcome left")))
    }
}

/// The canned text response used across tests
pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: ResponseMessage::text(text),
        usage: Usage::new(10, 5, 15),
    }
}
