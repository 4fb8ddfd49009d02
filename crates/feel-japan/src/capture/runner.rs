use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::CaptureConfig;

/// One capture execution handed to a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub slug: String,
    pub force: bool,
    pub artifact: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct CaptureReport {
    pub stdout: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureRunError {
    #[error("failed to launch capture command: {0}")]
    Spawn(String),
    #[error("capture command exited with {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("capture command timed out after {0:?}")]
    Timeout(Duration),
}

/// Renders a brochure page into its PDF artifact.
#[async_trait]
pub trait CaptureRunner: Send + Sync {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureReport, CaptureRunError>;
}

/// Launches the external headless-browser capture program as a child process.
#[derive(Debug, Clone)]
pub struct CommandCaptureRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCaptureRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Option<Self> {
        let (program, args) = config.command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), config.timeout))
    }

    fn command_for(&self, request: &CaptureRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(format!("--slug={}", request.slug))
            .env("CAPTURE_OUTPUT_PATH", &request.artifact)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if request.force {
            command.arg("--force");
        }
        command
    }
}

#[async_trait]
impl CaptureRunner for CommandCaptureRunner {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureReport, CaptureRunError> {
        debug!(program = %self.program, slug = %request.slug, "launching capture command");

        let output = tokio::time::timeout(self.timeout, self.command_for(request).output())
            .await
            .map_err(|_| CaptureRunError::Timeout(self.timeout))?
            .map_err(|err| CaptureRunError::Spawn(err.to_string()))?;

        if !output.status.success() {
            return Err(CaptureRunError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CaptureReport {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        })
    }
}
