//! Non-streaming Bedrock Converse support for agent runtimes
//!
//! Invokes the model once, maps transport failures onto a small error
//! taxonomy, and replays the complete response through the same chunk
//! protocol a streamed response uses.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod invoker;
pub mod model;
pub mod normalize;
pub mod transport;
pub mod types;

pub use error::{ModelError, TransportError, classify};
pub use invoker::CompletionInvoker;
pub use model::ConverseModel;
pub use normalize::{ChunkStream, normalize};
pub use transport::{BedrockTransport, ConverseTransport};
pub use types::{Chunk, ChunkType, CompletionResponse, ConverseRequest, StopReason, Usage};
