use serde::{Deserialize, Serialize};

/// Complete, non-streamed response from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Assistant output
    pub message: ResponseMessage,
    /// Token accounting for the call
    pub usage: Usage,
}

impl CompletionResponse {
    /// Whether the response asks for at least one tool to run
    pub fn has_tool_use(&self) -> bool {
        self.message.has_tool_use()
    }

    /// Split into content segments in emission order, plus usage
    pub fn into_parts(self) -> (Vec<ContentBlock>, Usage) {
        (self.message.into_segments(), self.usage)
    }
}

/// Assistant message within a completion response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Text or ordered content blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Tool invocations that follow the content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,
}

impl ResponseMessage {
    /// Plain text message
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(Content::Text(text.into())),
            tool_calls: Vec::new(),
        }
    }

    /// Same message with a trailing tool invocation
    #[must_use]
    pub fn with_tool_call(mut self, tool: ToolInvocation) -> Self {
        self.tool_calls.push(tool);
        self
    }

    pub fn has_tool_use(&self) -> bool {
        !self.tool_calls.is_empty()
            || matches!(&self.content, Some(Content::Blocks(blocks))
                if blocks.iter().any(|b| matches!(b, ContentBlock::ToolUse(_))))
    }

    /// Content segments in the order the backend returned them
    ///
    /// Content comes first (a plain string is a single text segment), then
    /// `tool_calls`.
    pub fn into_segments(self) -> Vec<ContentBlock> {
        let mut segments = match self.content {
            Some(Content::Text(text)) => vec![ContentBlock::Text(text)],
            Some(Content::Blocks(blocks)) => blocks,
            None => Vec::new(),
        };
        segments.extend(self.tool_calls.into_iter().map(ContentBlock::ToolUse));
        segments
    }
}

/// Message content: a bare string or a list of Converse content blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// Single content segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlock {
    Text(String),
    ToolUse(ToolInvocation),
}

/// Tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool name
    pub name: String,
    /// Identifier used to correlate the tool result; may be absent
    #[serde(default, alias = "toolUseId", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool arguments
    #[serde(default, alias = "input")]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            id: None,
            arguments,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Token usage statistics
///
/// Cache counters are only present when the backend reported them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_input_tokens: Option<u32>,
}

impl Usage {
    pub const fn new(input_tokens: u32, output_tokens: u32, total_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
            cache_read_input_tokens: None,
            cache_write_input_tokens: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_text_response() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "message": {"content": "Test response"},
            "usage": {"inputTokens": 10, "outputTokens": 5, "totalTokens": 15}
        }))
        .unwrap();

        assert_eq!(response.message, ResponseMessage::text("Test response"));
        assert_eq!(response.usage, Usage::new(10, 5, 15));
        assert!(!response.has_tool_use());
    }

    #[test]
    fn parses_converse_blocks() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "message": {"content": [
                {"text": "Checking."},
                {"toolUse": {"toolUseId": "tooluse_1", "name": "get_weather", "input": {"location": "Seattle"}}}
            ]},
            "usage": {"inputTokens": 12, "outputTokens": 8, "totalTokens": 20}
        }))
        .unwrap();

        assert!(response.has_tool_use());
        let (segments, usage) = response.into_parts();
        assert_eq!(usage, Usage::new(12, 8, 20));
        assert_eq!(segments[0], ContentBlock::Text("Checking.".to_owned()));
        let ContentBlock::ToolUse(tool) = &segments[1] else {
            panic!("expected tool segment, got {:?}", segments[1]);
        };
        assert_eq!(tool.id.as_deref(), Some("tooluse_1"));
        assert_eq!(tool.arguments["location"], "Seattle");
    }

    #[test]
    fn tool_calls_follow_text_content() {
        let message = ResponseMessage::text("I'll help you with that.").with_tool_call(
            ToolInvocation::new("get_weather", serde_json::Map::new()).with_id("tool_1"),
        );

        let segments = message.into_segments();
        assert_eq!(segments.len(), 2);
        assert!(matches!(segments[0], ContentBlock::Text(_)));
        assert!(matches!(&segments[1], ContentBlock::ToolUse(t) if t.name == "get_weather"));
    }

    #[test]
    fn usage_is_required() {
        let result = serde_json::from_value::<CompletionResponse>(json!({
            "message": {"content": "no accounting"}
        }));

        assert!(result.is_err());
    }

    #[test]
    fn cache_counters_survive_a_round_trip() {
        let usage: Usage = serde_json::from_value(json!({
            "inputTokens": 10, "outputTokens": 5, "totalTokens": 15, "cacheReadInputTokens": 3
        }))
        .unwrap();

        assert_eq!(usage.cache_read_input_tokens, Some(3));
        assert_eq!(usage.cache_write_input_tokens, None);
        assert_eq!(
            serde_json::to_value(usage).unwrap(),
            json!({"inputTokens": 10, "outputTokens": 5, "totalTokens": 15, "cacheReadInputTokens": 3})
        );
    }

    #[test]
    fn missing_content_yields_no_segments() {
        assert!(ResponseMessage::default().into_segments().is_empty());
    }
}
