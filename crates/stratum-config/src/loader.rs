use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the model or telemetry settings are out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_model()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_model(&self) -> anyhow::Result<()> {
        let model = &self.model;

        if model.model_id.trim().is_empty() {
            anyhow::bail!("model.model_id must not be empty");
        }

        if model.bedrock.region.trim().is_empty() {
            anyhow::bail!("model.bedrock.region must not be empty");
        }

        if model.bedrock.access_key_id.is_some() != model.bedrock.secret_access_key.is_some() {
            anyhow::bail!("model.bedrock.access_key_id and secret_access_key must be set together");
        }

        if model.max_tokens == Some(0) {
            anyhow::bail!("model.max_tokens must be greater than 0");
        }

        if let Some(temperature) = model.temperature
            && !(0.0..=1.0).contains(&temperature)
        {
            anyhow::bail!("model.temperature must be between 0.0 and 1.0, got {temperature}");
        }

        if let Some(top_p) = model.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            anyhow::bail!("model.top_p must be between 0.0 and 1.0, got {top_p}");
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        let Some(tracing) = self.telemetry.as_ref().and_then(|t| t.tracing.as_ref()) else {
            return Ok(());
        };

        if !(0.0..=1.0).contains(&tracing.sampling_rate) {
            anyhow::bail!(
                "telemetry.tracing.sampling_rate must be between 0.0 and 1.0, got {}",
                tracing.sampling_rate
            );
        }

        Ok(())
    }
}
