//! Script execution boundary.
//!
//! Everything a provider knows about the outside world goes through
//! [`ScriptRunner::run`], so tests can substitute a scripted runner.

use async_trait::async_trait;
use imsg_core::error::ImsgError;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Executes one AppleScript program and returns its result as text.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run `script`. `Ok` carries the script's return value; `Err` is a
    /// transport failure (`ImsgError::Script`) whose message is the
    /// mechanism's own error text.
    async fn run(&self, script: &str) -> Result<String, ImsgError>;
}

/// Runs scripts through `osascript -e`.
#[derive(Debug, Clone, Default)]
pub struct OsaScriptRunner {
    /// Subprocess timeout. `None` waits for as long as osascript takes.
    timeout: Option<Duration>,
}

impl OsaScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a runner from the `script_timeout_secs` setting (0 = no timeout).
    pub fn from_timeout_secs(timeout_secs: u64) -> Self {
        Self {
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

#[async_trait]
impl ScriptRunner for OsaScriptRunner {
    async fn run(&self, script: &str) -> Result<String, ImsgError> {
        let mut cmd = Command::new("osascript");
        cmd.arg("-e").arg(script).kill_on_drop(true);

        debug!("executing: osascript -e <script> ({} bytes)", script.len());

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| {
                    ImsgError::Script(format!("osascript timed out after {}s", limit.as_secs()))
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| ImsgError::Script(format!("failed to run osascript: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(ImsgError::Script(if stderr.is_empty() {
                format!("osascript exited with {}", output.status)
            } else {
                stderr.to_string()
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}
