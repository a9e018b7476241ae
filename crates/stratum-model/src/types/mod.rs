//! Wire-level types for Converse requests, responses and emitted chunks

pub mod chunk;
pub mod request;
pub mod response;

pub use chunk::{Chunk, ChunkData, ChunkType, DataType, FunctionCall, StopReason, ToolStart};
pub use request::{ConverseRequest, InferenceParams, Message, MessageBlock, Role, ToolResultStatus, ToolSpec};
pub use response::{CompletionResponse, Content, ContentBlock, ResponseMessage, ToolInvocation, Usage};
