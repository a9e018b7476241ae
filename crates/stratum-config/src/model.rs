use secrecy::SecretString;
use serde::Deserialize;

/// Configuration for the Bedrock Converse model
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Bedrock model identifier or inference profile
    pub model_id: String,
    /// Whether responses are consumed through the incremental streaming path
    #[serde(default = "default_streaming")]
    pub streaming: bool,
    /// System prompt prepended to every request
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold
    #[serde(default)]
    pub top_p: Option<f32>,
    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    /// AWS Bedrock connection settings
    #[serde(default)]
    pub bedrock: BedrockConfig,
}

impl ModelConfig {
    /// Minimal configuration for a model id with every other field defaulted
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            streaming: default_streaming(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            stop_sequences: Vec::new(),
            bedrock: BedrockConfig::default(),
        }
    }

    /// Same configuration with the streaming toggle set
    #[must_use]
    pub const fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }
}

/// AWS Bedrock-specific configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BedrockConfig {
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID (optional, uses default credential chain if absent)
    #[serde(default)]
    pub access_key_id: Option<SecretString>,
    /// Secret access key
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
    /// Session token for temporary credentials
    #[serde(default)]
    pub session_token: Option<SecretString>,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

const fn default_streaming() -> bool {
    true
}

fn default_region() -> String {
    "us-west-2".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_defaults_to_enabled() {
        let config: ModelConfig = toml::from_str(r#"model_id = "test-model""#).unwrap();
        assert!(config.streaming);
        assert!(ModelConfig::new("test-model").streaming);
    }

    #[test]
    fn streaming_can_be_disabled() {
        let config: ModelConfig = toml::from_str(
            r#"
            model_id = "test-model"
            streaming = false
            "#,
        )
        .unwrap();
        assert!(!config.streaming);
        assert!(!ModelConfig::new("test-model").with_streaming(false).streaming);
    }

    #[test]
    fn bedrock_section_defaults_region() {
        let config: ModelConfig = toml::from_str(r#"model_id = "test-model""#).unwrap();
        assert_eq!(config.bedrock.region, "us-west-2");
        assert!(config.bedrock.access_key_id.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = toml::from_str::<ModelConfig>(
            r#"
            model_id = "test-model"
            stream = false
            "#,
        );
        assert!(result.is_err());
    }
}
