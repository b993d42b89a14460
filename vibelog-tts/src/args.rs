use std::path::PathBuf;

use clap::Parser;

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "vibelog-tts.toml";

/// Vibelog voice-cloning TTS service
#[derive(Debug, Parser)]
#[command(name = "vibelog-tts", about = "Voice-cloning text-to-speech service")]
pub struct Args {
    /// Path to configuration file [default: vibelog-tts.toml, optional]
    #[arg(short, long, env = "VIBELOG_TTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "VIBELOG_TTS_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Log filter directives, e.g. `info,voice_clone=debug`
    #[arg(long, default_value = "info", env = "VIBELOG_TTS_LOG")]
    pub log_filter: String,
}
