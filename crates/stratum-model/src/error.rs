use thiserror::Error;

/// Error codes the backend uses to signal request-rate limiting
pub const THROTTLING_CODES: &[&str] = &["ThrottlingException", "TooManyRequestsException"];

/// Message fragments (lowercase) that mean the input exceeded the model's context
pub const CONTEXT_OVERFLOW_MESSAGES: &[&str] = &[
    "input is too long for requested model",
    "input length and `max_tokens` exceed context limit",
    "too many total text bytes",
];

/// Failure reported by the transport, before domain classification
///
/// A normalized `(code, message)` pair so classification does not depend on
/// any SDK's exception types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", .code.as_deref().unwrap_or("TransportError"))]
pub struct TransportError {
    /// Machine-readable error code, when the backend supplied one
    pub code: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl TransportError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Error with no machine-readable code (timeouts, dispatch failures)
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// Errors surfaced to callers of the model
///
/// `Throttled`, `ContextWindowOverflow` and `ModelApi` are the only kinds
/// [`classify`] produces. `StreamingUnavailable` is a configuration error
/// raised before any transport call and never comes from the mapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Backend signaled rate limiting
    #[error("model throttled: {message}")]
    Throttled { message: String },

    /// Input exceeds the model's context capacity
    #[error("context window overflow: {message}")]
    ContextWindowOverflow { message: String },

    /// Any other backend failure
    #[error("model API error: {message}")]
    ModelApi { code: Option<String>, message: String },

    /// Configuration selected incremental streaming, which this model does not provide
    ///
    /// Returned before the backend is contacted.
    #[error("incremental streaming is not available; set `streaming = false` to use complete responses")]
    StreamingUnavailable,
}

impl ModelError {
    /// Whether retrying the same request later may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// Short label for logs and metrics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Throttled { .. } => "throttled",
            Self::ContextWindowOverflow { .. } => "context_window_overflow",
            Self::ModelApi { .. } => "model_api_error",
            Self::StreamingUnavailable => "streaming_unavailable",
        }
    }
}

impl From<TransportError> for ModelError {
    fn from(error: TransportError) -> Self {
        classify(error)
    }
}

/// Map a transport failure onto the domain taxonomy
///
/// Throttling codes are checked first, so a throttled request is never
/// reported as an overflow.
pub fn classify(error: TransportError) -> ModelError {
    let TransportError { code, message } = error;

    if code.as_deref().is_some_and(is_throttling_code) {
        return ModelError::Throttled { message };
    }

    if is_context_overflow(&message) {
        return ModelError::ContextWindowOverflow { message };
    }

    ModelError::ModelApi { code, message }
}

fn is_throttling_code(code: &str) -> bool {
    THROTTLING_CODES.contains(&code)
}

fn is_context_overflow(message: &str) -> bool {
    let message = message.to_lowercase();
    CONTEXT_OVERFLOW_MESSAGES
        .iter()
        .any(|pattern| message.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_code_maps_to_throttled() {
        let error = classify(TransportError::new("ThrottlingException", "Rate exceeded"));
        assert_eq!(
            error,
            ModelError::Throttled {
                message: "Rate exceeded".to_owned()
            }
        );
        assert!(error.is_retryable());
    }

    #[test]
    fn too_many_requests_maps_to_throttled() {
        let error = classify(TransportError::new("TooManyRequestsException", "slow down"));
        assert_eq!(
            error,
            ModelError::Throttled {
                message: "slow down".to_owned()
            }
        );
    }

    #[test]
    fn text_byte_limit_maps_to_context_window_overflow() {
        let error = classify(TransportError::new(
            "ValidationException",
            "Too many total text bytes in the request",
        ));
        assert!(matches!(error, ModelError::ContextWindowOverflow { .. }));
    }

    #[test]
    fn throttling_wins_over_overflow_message() {
        let error = classify(TransportError::new(
            "ThrottlingException",
            "Input is too long for requested model",
        ));
        assert!(matches!(error, ModelError::Throttled { .. }));
    }

    #[test]
    fn overflow_message_maps_to_context_window_overflow() {
        let error = classify(TransportError::new(
            "ValidationException",
            "Input is too long for requested model",
        ));
        assert_eq!(
            error,
            ModelError::ContextWindowOverflow {
                message: "Input is too long for requested model".to_owned()
            }
        );
        assert!(!error.is_retryable());
    }

    #[test]
    fn overflow_is_detected_without_code() {
        let error = classify(TransportError::uncoded(
            "prompt rejected: input length and `max_tokens` exceed context limit",
        ));
        assert!(matches!(error, ModelError::ContextWindowOverflow { .. }));
    }

    #[test]
    fn other_errors_map_to_model_api() {
        let error = classify(TransportError::new("AccessDeniedException", "not authorized"));
        assert_eq!(
            error,
            ModelError::ModelApi {
                code: Some("AccessDeniedException".to_owned()),
                message: "not authorized".to_owned(),
            }
        );
        assert_eq!(error.kind(), "model_api_error");
    }

    #[test]
    fn validation_errors_without_overflow_stay_generic() {
        let error: ModelError = TransportError::new("ValidationException", "malformed tool schema").into();
        assert!(matches!(error, ModelError::ModelApi { .. }));
    }

    #[test]
    fn throttling_code_match_is_exact() {
        let error = classify(TransportError::new("throttling", "slow down"));
        assert!(matches!(error, ModelError::ModelApi { .. }));
    }

    #[test]
    fn transport_error_display_includes_code() {
        assert_eq!(
            TransportError::new("ThrottlingException", "Rate exceeded").to_string(),
            "ThrottlingException: Rate exceeded"
        );
        assert_eq!(TransportError::uncoded("timed out").to_string(), "TransportError: timed out");
    }
}
