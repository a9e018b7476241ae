#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::io::{Read, Write};
use std::sync::Arc;

use args::Args;
use clap::Parser;
use stratum_config::Config;
use stratum_model::types::{ChunkType, DataType, Message};
use stratum_model::{BedrockTransport, ChunkStream, ConverseModel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if args.batch {
        config.model.streaming = false;
    }

    let telemetry_guard = stratum_telemetry::init(config.telemetry.as_ref(), "info")?;

    tracing::info!(
        config_path = %args.config.display(),
        model_id = %config.model.model_id,
        streaming = config.model.streaming,
        "starting stratum"
    );

    let prompt = match args.prompt {
        Some(prompt) => prompt,
        None => read_prompt()?,
    };

    let transport = Arc::new(BedrockTransport::from_config(&config.model.bedrock).await);
    let model = ConverseModel::new(config.model, transport);
    let request = model.request(Vec::new()).with_message(Message::user(prompt));

    let chunks = model.stream(&request).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        print_json(chunks, &mut out)?;
    } else {
        print_text(chunks, &mut out)?;
    }
    out.flush()?;

    if let Err(e) = telemetry_guard.force_flush() {
        tracing::warn!(error = %e, "failed to flush telemetry");
    }

    Ok(())
}

/// Read the whole prompt from stdin
fn read_prompt() -> anyhow::Result<String> {
    let mut prompt = String::new();
    std::io::stdin().read_to_string(&mut prompt)?;

    let prompt = prompt.trim();
    if prompt.is_empty() {
        anyhow::bail!("no prompt given; pass --prompt or pipe text on stdin");
    }

    Ok(prompt.to_owned())
}

fn print_json(chunks: ChunkStream, out: &mut impl Write) -> anyhow::Result<()> {
    for chunk in chunks {
        serde_json::to_writer(&mut *out, &chunk)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Render text deltas to `out`; tool calls, stop reason and usage go to the log
fn print_text(chunks: ChunkStream, out: &mut impl Write) -> anyhow::Result<()> {
    let mut in_text = false;

    for chunk in chunks {
        match chunk.chunk_type {
            ChunkType::ContentDelta => write!(out, "{}", chunk.text().unwrap_or_default())?,
            ChunkType::ContentStop => {
                if in_text {
                    writeln!(out)?;
                }
                in_text = false;
            }
            ChunkType::ContentStart => {
                in_text = chunk.data_type == Some(DataType::Text);
                if let Some(tool) = chunk.tool() {
                    tracing::info!(
                        tool = %tool.function.name,
                        id = %tool.id,
                        arguments = %serde_json::Value::Object(tool.function.arguments.clone()),
                        "model requested tool"
                    );
                }
            }
            ChunkType::MessageStop => {
                if let Some(reason) = chunk.stop_reason() {
                    tracing::info!(stop_reason = %reason, "message complete");
                }
            }
            ChunkType::Metadata => {
                if let Some(usage) = chunk.usage() {
                    tracing::info!(
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        total_tokens = usage.total_tokens,
                        "token usage"
                    );
                }
            }
            ChunkType::MessageStart => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use stratum_model::normalize;
    use stratum_model::types::{CompletionResponse, ResponseMessage, ToolInvocation, Usage};

    use super::*;

    fn render(message: ResponseMessage) -> String {
        let chunks = normalize(CompletionResponse {
            message,
            usage: Usage::new(1, 1, 2),
        });
        let mut out = Vec::new();
        print_text(chunks, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_blocks_end_with_a_newline() {
        assert_eq!(render(ResponseMessage::text("hello")), "hello\n");
    }

    #[test]
    fn tool_blocks_print_nothing() {
        let message = ResponseMessage::text("Checking.")
            .with_tool_call(ToolInvocation::new("get_weather", serde_json::Map::new()).with_id("tool_1"));

        assert_eq!(render(message), "Checking.\n");
    }
}
