use serde::Deserialize;

/// Service identity reported by the health endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_name")]
    pub name: String,
    /// Short model label (e.g. "`xtts_v2`")
    #[serde(default = "default_model")]
    pub model: String,
    /// Accelerator label (e.g. "T4")
    #[serde(default = "default_gpu")]
    pub gpu: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            model: default_model(),
            gpu: default_gpu(),
        }
    }
}

fn default_name() -> String {
    "vibelog-tts".to_string()
}

fn default_model() -> String {
    "xtts_v2".to_string()
}

fn default_gpu() -> String {
    "T4".to_string()
}
