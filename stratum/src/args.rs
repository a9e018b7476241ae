use std::path::PathBuf;

use clap::Parser;

/// Stratum: one Bedrock Converse call replayed as a chunk stream
#[derive(Debug, Parser)]
#[command(name = "stratum", about = "Send a prompt to Bedrock and print the normalized chunk stream")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "stratum.toml", env = "STRATUM_CONFIG")]
    pub config: PathBuf,

    /// Prompt text; read from stdin when omitted
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Use the non-streaming path even if the configuration enables streaming
    #[arg(long)]
    pub batch: bool,

    /// Print every chunk as a JSON line instead of rendering text
    #[arg(long)]
    pub json: bool,
}
