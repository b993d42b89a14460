#![allow(clippy::must_use_candidate)]

mod env;
pub mod health;
mod loader;
pub mod server;
pub mod service;
pub mod synthesis;
pub mod telemetry;

use serde::Deserialize;

pub use health::*;
pub use server::*;
pub use service::*;
pub use synthesis::*;
pub use telemetry::TelemetryConfig;

/// Top-level vibelog-tts configuration
///
/// Loaded once at startup and handed to the server bootstrap; nothing in the
/// process reads configuration from global state.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity reported by the health endpoint
    #[serde(default)]
    pub service: ServiceConfig,
    /// Synthesis backend configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
