use std::path::Path;

use crate::{BackendConfig, Config};

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
    /// Returns an error if environment variable expansion, TOML parsing,
    /// or validation fails
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
    /// Returns an error if the health route is malformed or the synthesis
    /// backend is misconfigured
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_health_config()?;
        self.validate_synthesis_config()?;
        Ok(())
    }

    fn validate_health_config(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if !health.enabled {
            return Ok(());
        }

        if !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': `{}`", health.path);
        }

        // `POST /` is the synthesis route
        if health.path == "/" {
            anyhow::bail!("server.health.path must not be '/'");
        }

        Ok(())
    }

    fn validate_synthesis_config(&self) -> anyhow::Result<()> {
        self.synthesis.timeout_duration()?;

        if self.server.body_limit == 0 {
            anyhow::bail!("server.body_limit must be greater than 0");
        }

        match &self.synthesis.backend {
            BackendConfig::Command(command) => {
                if command.program.trim().is_empty() {
                    anyhow::bail!("synthesis.backend.program must not be empty");
                }

                if command.max_concurrency == Some(0) {
                    anyhow::bail!("synthesis.backend.max_concurrency must be greater than 0");
                }
            }
            BackendConfig::Remote(remote) => {
                if !matches!(remote.url.scheme(), "http" | "https") {
                    anyhow::bail!("synthesis.backend.url must use http or https: `{}`", remote.url);
                }
            }
        }

        Ok(())
    }
}
