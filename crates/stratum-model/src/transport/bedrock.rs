//! AWS Bedrock transport using the Converse API

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::types as bedrock;
use aws_smithy_types::{Document, Number};
use secrecy::ExposeSecret;
use stratum_config::BedrockConfig;

use super::ConverseTransport;
use crate::error::TransportError;
use crate::types::{
    CompletionResponse, Content, ContentBlock, ConverseRequest, InferenceParams, Message, MessageBlock,
    ResponseMessage, Role, ToolInvocation, ToolResultStatus, ToolSpec, Usage,
};

/// Transport backed by a Bedrock runtime client
///
/// The client is built once and shared; clone the handle or wrap the
/// transport in an `Arc` to reuse it across models.
#[derive(Debug, Clone)]
pub struct BedrockTransport {
    client: BedrockClient,
}

impl BedrockTransport {
    /// Build a client from configuration
    ///
    /// Static credentials are used when configured, otherwise the default
    /// AWS credential chain.
    pub async fn from_config(config: &BedrockConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key_id, &config.secret_access_key) {
            let credentials = aws_credential_types::Credentials::new(
                access_key.expose_secret(),
                secret_key.expose_secret(),
                config.session_token.as_ref().map(|t| t.expose_secret().to_owned()),
                None,
                "stratum-config",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;

        Self {
            client: BedrockClient::new(&sdk_config),
        }
    }

}

#[async_trait]
impl ConverseTransport for BedrockTransport {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn converse(&self, request: &ConverseRequest) -> Result<CompletionResponse, TransportError> {
        let mut converse = self.client.converse().model_id(&request.model_id);

        for text in &request.system {
            converse = converse.system(bedrock::SystemContentBlock::Text(text.clone()));
        }

        for message in &request.messages {
            converse = converse.messages(build_message(message)?);
        }

        converse = converse.inference_config(build_inference_config(&request.inference));

        if let Some(tool_config) = build_tool_config(&request.tools)? {
            converse = converse.tool_config(tool_config);
        }

        let output = converse.send().await.map_err(|e| converse_error(&e))?;

        let content = match output.output() {
            Some(bedrock::ConverseOutput::Message(message)) => extract_content(message),
            _ => Vec::new(),
        };

        let usage = output.usage().map_or_else(
            || {
                tracing::warn!("bedrock converse response carried no usage");
                Usage::default()
            },
            convert_usage,
        );

        tracing::debug!(
            stop_reason = output.stop_reason().as_str(),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "bedrock converse completed"
        );

        Ok(CompletionResponse {
            message: ResponseMessage {
                content: Some(Content::Blocks(content)),
                tool_calls: Vec::new(),
            },
            usage,
        })
    }
}

/// Normalize an SDK failure into a `(code, message)` pair
fn converse_error<R: Debug>(error: &SdkError<ConverseError, R>) -> TransportError {
    let service_error = error.as_service_error();

    let code = error
        .code()
        .or_else(|| service_error.and_then(modeled_code))
        .map(str::to_owned);

    let message = error
        .message()
        .map(str::to_owned)
        .or_else(|| service_error.map(ToString::to_string))
        .unwrap_or_else(|| DisplayErrorContext(error).to_string());

    TransportError { code, message }
}

/// Error code for modeled exceptions that arrived without error metadata
const fn modeled_code(error: &ConverseError) -> Option<&'static str> {
    match error {
        ConverseError::ThrottlingException(_) => Some("ThrottlingException"),
        ConverseError::ValidationException(_) => Some("ValidationException"),
        ConverseError::AccessDeniedException(_) => Some("AccessDeniedException"),
        ConverseError::ModelTimeoutException(_) => Some("ModelTimeoutException"),
        ConverseError::ResourceNotFoundException(_) => Some("ResourceNotFoundException"),
        _ => None,
    }
}

fn invalid_request(error: impl std::fmt::Display) -> TransportError {
    TransportError::uncoded(format!("invalid request: {error}"))
}

fn build_message(message: &Message) -> Result<bedrock::Message, TransportError> {
    let role = match message.role {
        Role::User => bedrock::ConversationRole::User,
        Role::Assistant => bedrock::ConversationRole::Assistant,
    };

    let mut blocks = message
        .content
        .iter()
        .map(build_content_block)
        .collect::<Result<Vec<_>, _>>()?;

    // Converse rejects messages without content
    if blocks.is_empty() {
        blocks.push(bedrock::ContentBlock::Text(String::new()));
    }

    bedrock::Message::builder()
        .role(role)
        .set_content(Some(blocks))
        .build()
        .map_err(invalid_request)
}

fn build_content_block(block: &MessageBlock) -> Result<bedrock::ContentBlock, TransportError> {
    match block {
        MessageBlock::Text(text) => Ok(bedrock::ContentBlock::Text(text.clone())),
        MessageBlock::ToolUse {
            tool_use_id,
            name,
            input,
        } => bedrock::ToolUseBlock::builder()
            .tool_use_id(tool_use_id)
            .name(name)
            .input(value_to_document(input))
            .build()
            .map(bedrock::ContentBlock::ToolUse)
            .map_err(invalid_request),
        MessageBlock::ToolResult {
            tool_use_id,
            content,
            status,
        } => {
            let status = status.map(|s| match s {
                ToolResultStatus::Success => bedrock::ToolResultStatus::Success,
                ToolResultStatus::Error => bedrock::ToolResultStatus::Error,
            });

            bedrock::ToolResultBlock::builder()
                .tool_use_id(tool_use_id)
                .content(bedrock::ToolResultContentBlock::Text(content.clone()))
                .set_status(status)
                .build()
                .map(bedrock::ContentBlock::ToolResult)
                .map_err(invalid_request)
        }
    }
}

/// Build inference configuration from the request params
fn build_inference_config(params: &InferenceParams) -> bedrock::InferenceConfiguration {
    let max_tokens = params.max_tokens.map(|m| i32::try_from(m).unwrap_or(i32::MAX));

    bedrock::InferenceConfiguration::builder()
        .set_max_tokens(max_tokens)
        .set_temperature(params.temperature)
        .set_top_p(params.top_p)
        .set_stop_sequences((!params.stop_sequences.is_empty()).then(|| params.stop_sequences.clone()))
        .build()
}

/// Build tool configuration, or `None` when no tools are offered
fn build_tool_config(tools: &[ToolSpec]) -> Result<Option<bedrock::ToolConfiguration>, TransportError> {
    if tools.is_empty() {
        return Ok(None);
    }

    let specs = tools
        .iter()
        .map(|tool| {
            let schema = if tool.input_schema.is_null() {
                Document::Object(HashMap::new())
            } else {
                value_to_document(&tool.input_schema)
            };

            bedrock::ToolSpecification::builder()
                .name(&tool.name)
                .set_description(tool.description.clone())
                .input_schema(bedrock::ToolInputSchema::Json(schema))
                .build()
                .map(bedrock::Tool::ToolSpec)
                .map_err(invalid_request)
        })
        .collect::<Result<Vec<_>, _>>()?;

    bedrock::ToolConfiguration::builder()
        .set_tools(Some(specs))
        .build()
        .map(Some)
        .map_err(invalid_request)
}

/// Text and tool-use blocks of a response, in backend order
fn extract_content(message: &bedrock::Message) -> Vec<ContentBlock> {
    message
        .content()
        .iter()
        .filter_map(|block| match block {
            bedrock::ContentBlock::Text(text) => Some(ContentBlock::Text(text.clone())),
            bedrock::ContentBlock::ToolUse(tool) => Some(ContentBlock::ToolUse(ToolInvocation {
                name: tool.name().to_owned(),
                id: Some(tool.tool_use_id().to_owned()),
                arguments: document_to_arguments(tool.input()),
            })),
            other => {
                tracing::debug!(block = ?other, "skipping unsupported response content block");
                None
            }
        })
        .collect()
}

fn convert_usage(usage: &bedrock::TokenUsage) -> Usage {
    Usage {
        input_tokens: token_count("input", usage.input_tokens()),
        output_tokens: token_count("output", usage.output_tokens()),
        total_tokens: token_count("total", usage.total_tokens()),
        cache_read_input_tokens: usage.cache_read_input_tokens().map(|t| token_count("cache_read", t)),
        cache_write_input_tokens: usage.cache_write_input_tokens().map(|t| token_count("cache_write", t)),
    }
}

fn token_count(kind: &str, tokens: i32) -> u32 {
    u32::try_from(tokens).unwrap_or_else(|_| {
        tracing::warn!(kind, tokens, "bedrock reported a negative token count");
        0
    })
}

/// Tool input as an argument map; non-object inputs are wrapped under `input`
fn document_to_arguments(document: &Document) -> serde_json::Map<String, serde_json::Value> {
    match document_to_value(document) {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        other => serde_json::Map::from_iter([("input".to_owned(), other)]),
    }
}

/// Convert a `serde_json::Value` to an AWS `Document`
fn value_to_document(value: &serde_json::Value) -> Document {
    match value {
        serde_json::Value::Null => Document::Null,
        serde_json::Value::Bool(b) => Document::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else {
                n.as_f64().map_or(Document::Null, |f| Document::Number(Number::Float(f)))
            }
        }
        serde_json::Value::String(s) => Document::String(s.clone()),
        serde_json::Value::Array(items) => Document::Array(items.iter().map(value_to_document).collect()),
        serde_json::Value::Object(map) => {
            Document::Object(map.iter().map(|(k, v)| (k.clone(), value_to_document(v))).collect())
        }
    }
}

/// Convert an AWS `Document` to a `serde_json::Value`
fn document_to_value(document: &Document) -> serde_json::Value {
    match document {
        Document::Object(map) => {
            serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), document_to_value(v))).collect())
        }
        Document::Array(items) => serde_json::Value::Array(items.iter().map(document_to_value).collect()),
        Document::Number(Number::PosInt(u)) => serde_json::Value::from(*u),
        Document::Number(Number::NegInt(i)) => serde_json::Value::from(*i),
        Document::Number(n) => {
            serde_json::Number::from_f64(n.to_f64_lossy()).map_or(serde_json::Value::Null, serde_json::Value::Number)
        }
        Document::String(s) => serde_json::Value::String(s.clone()),
        Document::Bool(b) => serde_json::Value::Bool(*b),
        Document::Null => serde_json::Value::Null,
    }
}
