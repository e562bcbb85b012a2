//! Best-effort "make sure Messages.app is running" before a retry.

use crate::applescript::script::{LAUNCH_SCRIPT, RUNNING_PROBE};
use crate::runner::ScriptRunner;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Side effect run between retries. Must never fail the send.
#[async_trait]
pub trait AppLauncher: Send + Sync {
    async fn ensure_running(&self);
}

/// Probes Messages.app and activates it through the script runner when it
/// is not running.
pub struct ScriptLauncher {
    runner: Arc<dyn ScriptRunner>,
}

impl ScriptLauncher {
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl AppLauncher for ScriptLauncher {
    async fn ensure_running(&self) {
        if is_running(self.runner.as_ref()).await {
            debug!("applescript: Messages.app already running");
            return;
        }
        info!("applescript: launching Messages.app");
        if let Err(e) = self.runner.run(LAUNCH_SCRIPT).await {
            warn!("applescript: failed to launch Messages.app: {e}");
        }
    }
}

/// Launcher that does nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopLauncher;

#[async_trait]
impl AppLauncher for NoopLauncher {
    async fn ensure_running(&self) {}
}

/// Run the read-only probe. Any probe failure counts as "not running".
pub(crate) async fn is_running(runner: &dyn ScriptRunner) -> bool {
    match runner.run(RUNNING_PROBE).await {
        Ok(reply) => reply.trim() == "true",
        Err(e) => {
            debug!("applescript: availability probe failed: {e}");
            false
        }
    }
}
