use std::{path::PathBuf, time::Duration};

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Coqui model identifier for XTTS v2
pub const XTTS_V2_MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

/// Synthesis configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Upper bound for a single synthesis call (e.g. "5m", "300s")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Directory in which per-call staging directories are created
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    /// Backend that performs the actual voice cloning
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            temp_dir: None,
            backend: BackendConfig::default(),
        }
    }
}

impl SynthesisConfig {
    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a valid duration string or is zero
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        let timeout = duration_str::parse(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid synthesis timeout '{}': {e}", self.timeout))?;

        if timeout.is_zero() {
            anyhow::bail!("synthesis timeout must be greater than zero");
        }

        Ok(timeout)
    }
}

/// Synthesis backend selection
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Local program driven through input/output files
    Command(CommandBackendConfig),
    /// Remote synthesis worker reached over HTTP
    Remote(RemoteBackendConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Command(CommandBackendConfig::default())
    }
}

/// Configuration for the file-based command backend
///
/// Argument templates may reference `{text}`, `{speaker_wav}`, `{language}`,
/// `{output}` and `{model}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandBackendConfig {
    /// Program to execute
    #[serde(default = "default_program")]
    pub program: String,
    /// Argument templates
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Model identifier substituted for `{model}`
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Extra environment variables for the child process
    #[serde(default = "default_env")]
    pub env: IndexMap<String, String>,
    /// Maximum number of concurrently running child processes
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for CommandBackendConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            model_name: default_model_name(),
            env: default_env(),
            max_concurrency: None,
        }
    }
}

/// Configuration for the remote HTTP backend
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteBackendConfig {
    /// Endpoint accepting synthesis jobs
    pub url: Url,
    /// Bearer token sent with every job
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

fn default_timeout() -> String {
    "5m".to_string()
}

fn default_program() -> String {
    "tts".to_string()
}

/// Coqui `tts` CLI invocation
///
/// Values are attached with `=` so text starting with `-` is never read as
/// an option.
fn default_args() -> Vec<String> {
    [
        "--model_name={model}",
        "--text={text}",
        "--speaker_wav={speaker_wav}",
        "--language_idx={language}",
        "--out_path={output}",
        "--use_cuda=true",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_model_name() -> String {
    XTTS_V2_MODEL.to_string()
}

fn default_env() -> IndexMap<String, String> {
    IndexMap::from([("COQUI_TOS_AGREED".to_string(), "1".to_string())])
}
