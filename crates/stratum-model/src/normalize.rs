//! Replay of a complete response through the streaming chunk protocol

use std::iter::FusedIterator;

use futures_util::stream;

use crate::types::{Chunk, CompletionResponse, ContentBlock, StopReason, ToolStart, Usage};

/// Turn a complete response into the chunk sequence a streamed response
/// would have produced
///
/// Order: `message_start`, then per content segment either
/// `content_start, content_delta, content_stop` (text) or
/// `content_start, content_stop` (tool), then `message_stop`, then
/// `metadata`.
pub fn normalize(response: CompletionResponse) -> ChunkStream {
    ChunkStream::new(response)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    MessageStart,
    Content,
    MessageStop,
    Metadata,
    Done,
}

/// Content block that has been opened but not yet closed
#[derive(Debug)]
enum OpenBlock {
    /// Text whose delta is still pending (`Some`) or already emitted (`None`)
    Text(Option<String>),
    Tool,
}

/// Lazy, forward-only sequence of chunks for one response
///
/// Finite and not restartable. Dropping it early has no side effects.
#[derive(Debug)]
pub struct ChunkStream {
    phase: Phase,
    segments: std::vec::IntoIter<ContentBlock>,
    open: Option<OpenBlock>,
    stop_reason: StopReason,
    usage: Option<Usage>,
}

impl ChunkStream {
    fn new(response: CompletionResponse) -> Self {
        let stop_reason = if response.has_tool_use() {
            StopReason::ToolUse
        } else {
            StopReason::EndTurn
        };
        let (segments, usage) = response.into_parts();

        Self {
            phase: Phase::MessageStart,
            segments: segments.into_iter(),
            open: None,
            stop_reason,
            usage: Some(usage),
        }
    }

    /// Adapt into an async stream for consumers written against streaming backends
    pub fn into_stream(self) -> stream::Iter<Self> {
        stream::iter(self)
    }

    fn next_content(&mut self) -> Option<Chunk> {
        match self.open.take() {
            Some(OpenBlock::Text(Some(text))) => {
                self.open = Some(OpenBlock::Text(None));
                return Some(Chunk::content_delta(text));
            }
            Some(OpenBlock::Text(None) | OpenBlock::Tool) => return Some(Chunk::content_stop()),
            None => {}
        }

        match self.segments.next()? {
            ContentBlock::Text(text) => {
                self.open = Some(OpenBlock::Text(Some(text)));
                Some(Chunk::text_start())
            }
            ContentBlock::ToolUse(tool) => {
                self.open = Some(OpenBlock::Tool);
                Some(Chunk::tool_start(ToolStart::from_invocation(tool)))
            }
        }
    }
}

impl Iterator for ChunkStream {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        loop {
            match self.phase {
                Phase::MessageStart => {
                    self.phase = Phase::Content;
                    return Some(Chunk::message_start());
                }
                Phase::Content => match self.next_content() {
                    Some(chunk) => return Some(chunk),
                    None => self.phase = Phase::MessageStop,
                },
                Phase::MessageStop => {
                    self.phase = Phase::Metadata;
                    return Some(Chunk::message_stop(self.stop_reason));
                }
                Phase::Metadata => {
                    self.phase = Phase::Done;
                    return self.usage.take().map(Chunk::metadata);
                }
                Phase::Done => return None,
            }
        }
    }
}

impl FusedIterator for ChunkStream {}
