#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod model;
pub mod telemetry;

use serde::Deserialize;

pub use model::*;
pub use telemetry::{ExportProtocol, ExporterConfig, TelemetryConfig, TracingConfig};

/// Top-level Stratum configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model invocation configuration
    pub model: ModelConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
