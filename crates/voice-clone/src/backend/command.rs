use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::{Arc, OnceLock},
    time::Duration,
};

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use tempfile::TempDir;
use tokio::sync::Semaphore;
use vibelog_config::CommandBackendConfig;

use crate::{error::VoiceCloneError, types::SynthesisJob};

use super::{SynthesisBackend, excerpt};

/// Longest stderr excerpt carried into an error message
const STDERR_EXCERPT_BYTES: usize = 2048;

/// Name of the file the program is asked to write
const OUTPUT_FILE: &str = "output.wav";

/// Runs a local program through its file-based interface
///
/// Each call gets a private staging directory holding the reference clip
/// (named with the sniffed extension) and the output path. The directory is
/// owned by a [`TempDir`], so it is removed however the call ends, including
/// when the handler future is dropped mid-flight.
pub struct CommandBackend {
    name: String,
    program: String,
    args: Vec<String>,
    model_name: String,
    env: IndexMap<String, String>,
    timeout: Duration,
    staging_root: Option<PathBuf>,
    permits: Option<Arc<Semaphore>>,
}

impl CommandBackend {
    pub fn new(name: String, config: &CommandBackendConfig, timeout: Duration, staging_root: Option<PathBuf>) -> Self {
        Self {
            name,
            program: config.program.clone(),
            args: config.args.clone(),
            model_name: config.model_name.clone(),
            env: config.env.clone(),
            timeout,
            staging_root,
            permits: config.max_concurrency.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    fn staging_dir(&self) -> crate::error::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("vibelog-tts-");

        let dir = match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };

        dir.map_err(|e| {
            tracing::error!("Failed to create staging directory: {e}");
            VoiceCloneError::InternalError(None)
        })
    }

    async fn run(&self, job: &SynthesisJob, staging: &Path) -> crate::error::Result<Vec<u8>> {
        let speaker_wav = staging.join(format!("reference{}", job.format.extension()));
        let output = staging.join(OUTPUT_FILE);

        tokio::fs::write(&speaker_wav, &job.reference_audio).await.map_err(|e| {
            tracing::error!("Failed to stage reference audio: {e}");
            VoiceCloneError::InternalError(None)
        })?;

        let placeholders = Placeholders {
            text: &job.text,
            speaker_wav: &speaker_wav,
            language: job.language.as_str(),
            output: &output,
            model: &self.model_name,
        };

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(self.args.iter().map(|arg| placeholders.render(arg)))
            .envs(&self.env)
            .current_dir(staging)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %self.program,
            language = job.language.as_str(),
            format = job.format.as_str(),
            "Running synthesis command"
        );

        let finished = command
            .output()
            .await
            .map_err(|e| VoiceCloneError::SynthesisFailure(format!("failed to run '{}': {e}", self.program)))?;

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            return Err(VoiceCloneError::SynthesisFailure(format!(
                "'{}' exited with {}: {}",
                self.program,
                finished.status,
                excerpt(stderr.trim(), STDERR_EXCERPT_BYTES)
            )));
        }

        match tokio::fs::read(&output).await {
            Ok(audio) => Ok(audio),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(VoiceCloneError::EmptyResult),
            Err(e) => Err(VoiceCloneError::SynthesisFailure(format!(
                "failed to read synthesized audio: {e}"
            ))),
        }
    }
}

#[async_trait]
impl SynthesisBackend for CommandBackend {
    async fn synthesize(&self, job: SynthesisJob) -> crate::error::Result<Vec<u8>> {
        // The deadline covers the wait for a permit as well as the run
        let call = async {
            let _permit = match &self.permits {
                Some(permits) => Some(
                    permits
                        .acquire()
                        .await
                        .map_err(|_| VoiceCloneError::InternalError(None))?,
                ),
                None => None,
            };

            let staging = self.staging_dir()?;
            let result = self.run(&job, staging.path()).await;

            // Dropping the TempDir on the error path removes it silently, so a
            // cleanup problem can never replace the synthesis error
            if result.is_ok()
                && let Err(e) = staging.close()
            {
                tracing::warn!("Failed to remove staging directory: {e}");
            }

            result
        };

        tokio::time::timeout(self.timeout, call).await.map_err(|_| {
            VoiceCloneError::SynthesisFailure(format!(
                "'{}' timed out after {:.1}s",
                self.program,
                self.timeout.as_secs_f64()
            ))
        })?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Values substituted into argument templates
struct Placeholders<'a> {
    text: &'a str,
    speaker_wav: &'a Path,
    language: &'a str,
    output: &'a Path,
    model: &'a str,
}

impl Placeholders<'_> {
    /// Substitute every placeholder in one pass
    ///
    /// Substituted values are never rescanned, so text containing e.g.
    /// `{output}` is passed through literally.
    fn render(&self, template: &str) -> String {
        fn re() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| {
                Regex::new(r"\{(text|speaker_wav|language|output|model)\}").expect("must be valid regex")
            })
        }

        re().replace_all(template, |captures: &Captures<'_>| match &captures[1] {
            "text" => self.text.to_string(),
            "speaker_wav" => self.speaker_wav.display().to_string(),
            "language" => self.language.to_string(),
            "output" => self.output.display().to_string(),
            _ => self.model.to_string(),
        })
        .into_owned()
    }
}
