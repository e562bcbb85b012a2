//! AppleScript provider.
//!
//! Drives Messages.app through `osascript`. Retries with exponential backoff,
//! relaunching Messages.app between attempts, and gives up immediately on an
//! Automation permission denial.

mod provider;
pub mod response;
pub mod script;

#[cfg(test)]
mod tests;

use crate::launcher::{AppLauncher, ScriptLauncher};
use crate::retry::RetryPolicy;
use crate::runner::{OsaScriptRunner, ScriptRunner};
use imsg_core::config::SendConfig;
use std::sync::Arc;

/// How to treat a reply that is neither `success` nor `error:...`.
///
/// Messages.app does not return the `success` token on every successful
/// path, so the default accepts unknown replies as delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyPolicy {
    #[default]
    Lenient,
    Strict,
}

impl ReplyPolicy {
    pub fn from_lenient(lenient: bool) -> Self {
        if lenient {
            Self::Lenient
        } else {
            Self::Strict
        }
    }
}

/// AppleScript provider configuration.
pub struct AppleScriptProvider {
    runner: Arc<dyn ScriptRunner>,
    launcher: Arc<dyn AppLauncher>,
    retry: RetryPolicy,
    reply_policy: ReplyPolicy,
}

impl AppleScriptProvider {
    /// Create a provider backed by `osascript` with default settings.
    pub fn new() -> Self {
        let runner: Arc<dyn ScriptRunner> = Arc::new(OsaScriptRunner::new());
        Self::with_runner(runner.clone(), Arc::new(ScriptLauncher::new(runner)))
    }

    /// Create a provider from config values.
    pub fn from_config(cfg: &SendConfig) -> Self {
        let runner: Arc<dyn ScriptRunner> =
            Arc::new(OsaScriptRunner::from_timeout_secs(cfg.script_timeout_secs));
        Self::with_runner(runner.clone(), Arc::new(ScriptLauncher::new(runner)))
            .with_retry(RetryPolicy::from_config(cfg))
            .with_reply_policy(ReplyPolicy::from_lenient(cfg.lenient_replies))
    }

    /// Create a provider around an arbitrary runner and launcher.
    pub fn with_runner(runner: Arc<dyn ScriptRunner>, launcher: Arc<dyn AppLauncher>) -> Self {
        Self {
            runner,
            launcher,
            retry: RetryPolicy::default(),
            reply_policy: ReplyPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_reply_policy(mut self, reply_policy: ReplyPolicy) -> Self {
        self.reply_policy = reply_policy;
        self
    }
}

impl Default for AppleScriptProvider {
    fn default() -> Self {
        Self::new()
    }
}
