use serde::Serialize;

use super::response::{ToolInvocation, Usage};

/// Kind of event in a chunk sequence
///
/// Closed set. Consumers rely on the start/delta/stop nesting, not on a
/// fixed number of chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    MessageStart,
    ContentStart,
    ContentDelta,
    ContentStop,
    MessageStop,
    Metadata,
}

/// Kind of content block opened by a `content_start` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Text,
    Tool,
}

/// Why the model ended its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
}

impl StopReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EndTurn => "end_turn",
            Self::ToolUse => "tool_use",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a chunk; its shape depends on the chunk type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChunkData {
    Empty,
    Text(String),
    Tool(ToolStart),
    StopReason(StopReason),
    Usage(Usage),
}

impl ChunkData {
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Payload of a `content_start` chunk that opens a tool block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolStart {
    pub function: FunctionCall,
    pub id: String,
}

impl ToolStart {
    /// Build from a backend invocation, synthesizing an id when none was sent
    pub fn from_invocation(tool: ToolInvocation) -> Self {
        let id = tool
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            function: FunctionCall {
                name: tool.name,
                arguments: tool.arguments,
            },
            id,
        }
    }
}

/// Function name and structured arguments of a tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// One typed event in a normalized completion stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub chunk_type: ChunkType,
    #[serde(skip_serializing_if = "ChunkData::is_empty")]
    pub data: ChunkData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

impl Chunk {
    const fn bare(chunk_type: ChunkType) -> Self {
        Self {
            chunk_type,
            data: ChunkData::Empty,
            data_type: None,
        }
    }

    pub const fn message_start() -> Self {
        Self::bare(ChunkType::MessageStart)
    }

    pub const fn text_start() -> Self {
        Self {
            chunk_type: ChunkType::ContentStart,
            data: ChunkData::Empty,
            data_type: Some(DataType::Text),
        }
    }

    pub const fn tool_start(tool: ToolStart) -> Self {
        Self {
            chunk_type: ChunkType::ContentStart,
            data: ChunkData::Tool(tool),
            data_type: Some(DataType::Tool),
        }
    }

    pub const fn content_delta(text: String) -> Self {
        Self {
            chunk_type: ChunkType::ContentDelta,
            data: ChunkData::Text(text),
            data_type: None,
        }
    }

    pub const fn content_stop() -> Self {
        Self::bare(ChunkType::ContentStop)
    }

    pub const fn message_stop(reason: StopReason) -> Self {
        Self {
            chunk_type: ChunkType::MessageStop,
            data: ChunkData::StopReason(reason),
            data_type: None,
        }
    }

    pub const fn metadata(usage: Usage) -> Self {
        Self {
            chunk_type: ChunkType::Metadata,
            data: ChunkData::Usage(usage),
            data_type: None,
        }
    }

    /// Text carried by a `content_delta`
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            ChunkData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Tool payload carried by a tool `content_start`
    pub const fn tool(&self) -> Option<&ToolStart> {
        match &self.data {
            ChunkData::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    pub const fn stop_reason(&self) -> Option<StopReason> {
        match self.data {
            ChunkData::StopReason(reason) => Some(reason),
            _ => None,
        }
    }

    pub const fn usage(&self) -> Option<&Usage> {
        match &self.data {
            ChunkData::Usage(usage) => Some(usage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tool_start_serializes_with_function_and_id() {
        let mut arguments = serde_json::Map::new();
        arguments.insert("location".to_owned(), json!("Seattle"));
        let tool = ToolInvocation::new("get_weather", arguments).with_id("tool_1");

        let chunk = Chunk::tool_start(ToolStart::from_invocation(tool));

        assert_eq!(
            serde_json::to_value(&chunk).unwrap(),
            json!({
                "chunk_type": "content_start",
                "data_type": "tool",
                "data": {
                    "function": {"name": "get_weather", "arguments": {"location": "Seattle"}},
                    "id": "tool_1"
                }
            })
        );
    }

    #[test]
    fn empty_payload_is_omitted() {
        assert_eq!(
            serde_json::to_value(Chunk::message_start()).unwrap(),
            json!({"chunk_type": "message_start"})
        );
        assert_eq!(
            serde_json::to_value(Chunk::message_stop(StopReason::ToolUse)).unwrap(),
            json!({"chunk_type": "message_stop", "data": "tool_use"})
        );
    }

    #[test]
    fn missing_id_is_synthesized() {
        let first = ToolStart::from_invocation(ToolInvocation::new("lookup", serde_json::Map::new()));
        let second = ToolStart::from_invocation(ToolInvocation::new("lookup", serde_json::Map::new()).with_id(""));

        assert!(uuid::Uuid::parse_str(&first.id).is_ok());
        assert!(uuid::Uuid::parse_str(&second.id).is_ok());
        assert_ne!(first.id, second.id);
    }
}
