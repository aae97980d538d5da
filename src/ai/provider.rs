//! Commit message providers: the injectable trait, a command-backed
//! implementation and a host-level timeout wrapper.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::AiError;

/// Default timeout for a provider call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "SCRIVENER_AI_TIMEOUT";

/// Environment variable naming the AI command.
pub const COMMAND_ENV_VAR: &str = "SCRIVENER_AI_COMMAND";

/// Something that turns a prompt into raw response text.
///
/// This abstraction allows mocking the AI command in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitMessageProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Get the configured timeout duration.
///
/// Reads `SCRIVENER_AI_TIMEOUT` (seconds) if set, otherwise uses 60 seconds.
/// Logs a warning if the variable is set to something unparseable.
pub fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// The AI command from `SCRIVENER_AI_COMMAND`, if set and non-blank.
pub fn command_from_env() -> Option<String> {
    env::var(COMMAND_ENV_VAR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Runs a user-configured shell command with the prompt on stdin.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    command: String,
}

impl CommandProvider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The executable the command line starts with.
    fn program(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }

    /// Check that the command's program exists.
    ///
    /// Uses the `which` crate for cross-platform executable detection.
    pub fn check_installed(&self) -> Result<(), AiError> {
        let program = self.program().ok_or(AiError::NotConfigured)?;
        if which::which(program).is_err() {
            return Err(AiError::NotInstalled(program.to_string()));
        }
        Ok(())
    }

    fn shell(&self) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

#[async_trait]
impl CommitMessageProvider for CommandProvider {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        self.check_installed()?;
        debug!(command = %self.command, prompt_len = prompt.len(), "Running AI command");

        let mut child = self
            .shell()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(AiError::SpawnFailed)?;

        // Feed stdin while draining stdout so a chatty command cannot block on a full pipe.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(AiError::SpawnFailed)?;
        // A command that ignores stdin may close it early; that is not an error.
        if let Err(e) = fed
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(AiError::SpawnFailed(e));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(AiError::NonZeroExit { code, stderr });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if stdout.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(stdout)
    }
}

/// Imposes a deadline on another provider.
pub struct TimeoutProvider<P> {
    inner: P,
    limit: Duration,
}

impl<P: CommitMessageProvider> TimeoutProvider<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }

    /// Wrap `inner` with the timeout from the environment.
    pub fn from_env(inner: P) -> Self {
        Self::new(inner, get_timeout())
    }
}

#[async_trait]
impl<P: CommitMessageProvider> CommitMessageProvider for TimeoutProvider<P> {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        timeout(self.limit, self.inner.complete(prompt))
            .await
            .map_err(|_| AiError::Timeout(self.limit.as_secs()))?
    }
}
