//! Provider trait implementation with retry logic.

use super::response::{self, ScriptReply};
use super::{script, AppleScriptProvider, ReplyPolicy};
use crate::{launcher, retry};
use async_trait::async_trait;
use imsg_core::{
    error::ImsgError,
    message::{SendRequest, SendResult},
    recipient,
    traits::SendProvider,
};
use tracing::{info, warn};

#[async_trait]
impl SendProvider for AppleScriptProvider {
    fn name(&self) -> &str {
        "applescript"
    }

    async fn is_available(&self) -> bool {
        launcher::is_running(self.runner.as_ref()).await
    }

    async fn send_message(&self, request: &SendRequest) -> Result<SendResult, ImsgError> {
        let recipient = recipient::normalize(&request.recipient);
        let script = script::send_script(&recipient, &request.message);

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt);
                info!(
                    "applescript: retrying in {}ms (attempt {}/{})",
                    delay.as_millis(),
                    attempt + 1,
                    self.retry.total_attempts()
                );
                tokio::time::sleep(delay).await;
                self.launcher.ensure_running().await;
            }

            let result = self.execute_send(&script).await;
            if result.success {
                info!("applescript: message delivered to {recipient}");
                return Ok(result);
            }

            if retry::is_permission_denial(&result) {
                warn!(
                    "applescript: automation permission denied, not retrying: {}",
                    result.error.as_deref().unwrap_or_default()
                );
                return Ok(result);
            }

            if attempt >= self.retry.max_retries {
                warn!(
                    "applescript: giving up after {} attempts: {}",
                    attempt + 1,
                    result.error.as_deref().unwrap_or_default()
                );
                return Ok(result);
            }

            warn!(
                "applescript: attempt {} failed: {}",
                attempt + 1,
                result.error.as_deref().unwrap_or_default()
            );
            attempt += 1;
        }
    }
}

impl AppleScriptProvider {
    /// One invocation of the delivery script, interpreted into a result.
    async fn execute_send(&self, script: &str) -> SendResult {
        let raw = match self.runner.run(script).await {
            Ok(raw) => raw,
            Err(e) => return response::transport_failure_result(&e.to_string()),
        };

        match ScriptReply::parse(&raw) {
            ScriptReply::Success => SendResult::delivered(None),
            ScriptReply::Error { code, message } => response::error_result(&code, &message),
            ScriptReply::Unrecognized(other) => match self.reply_policy {
                ReplyPolicy::Lenient => {
                    warn!("applescript: unrecognized reply {other:?}, treating as delivered");
                    SendResult::delivered(None)
                }
                ReplyPolicy::Strict => SendResult::failed(
                    format!("Unrecognized reply from Messages.app: {other}"),
                    None,
                    Some("Check Messages.app to confirm whether the message was sent.".into()),
                ),
            },
        }
    }
}
