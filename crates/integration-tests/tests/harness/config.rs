//! Programmatic configuration builder for integration tests

use std::{path::Path, time::Duration};

use secrecy::SecretString;
use vibelog_config::{
    BackendConfig, CommandBackendConfig, Config, HealthConfig, RemoteBackendConfig, ServerConfig,
};

/// Shell script that copies the reference clip to the output path
pub const ECHO_SCRIPT: &str = r#"cat "$1" > "$2""#;

/// Shell script that fails the way a crashing model would
pub const FAILING_SCRIPT: &str = "echo 'CUDA out of memory' >&2; exit 1";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Use `sh -c <script>` as the synthesis program
    ///
    /// The script sees the reference path as `$1`, the output path as `$2`,
    /// the language as `$3`, and the text as `$4`.
    pub fn with_shell_backend(mut self, script: &str) -> Self {
        let args = ["-c", script, "sh", "{speaker_wav}", "{output}", "{language}", "{text}"]
            .map(str::to_owned)
            .to_vec();

        self.config.synthesis.backend = BackendConfig::Command(CommandBackendConfig {
            program: "sh".to_owned(),
            args,
            ..CommandBackendConfig::default()
        });
        self
    }

    /// Send synthesis jobs to a remote worker
    pub fn with_remote_backend(mut self, url: &str, api_key: Option<&str>) -> Self {
        self.config.synthesis.backend = BackendConfig::Remote(RemoteBackendConfig {
            url: url.parse().expect("valid URL"),
            api_key: api_key.map(|key| SecretString::from(key.to_owned())),
        });
        self
    }

    /// Stage temporary files under `dir`
    pub fn with_temp_dir(mut self, dir: &Path) -> Self {
        self.config.synthesis.temp_dir = Some(dir.to_path_buf());
        self
    }

    /// Set the synthesis timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.synthesis.timeout = format!("{}ms", timeout.as_millis());
        self
    }

    /// Set the request body limit
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.config.server.body_limit = limit;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
