//! Fallback chain over several send providers.
//!
//! Providers are tried in construction order. Unavailable ones are skipped
//! without counting as failures, the first success wins, and when nothing
//! succeeds the per-provider failures are aggregated into one result. A member
//! that errors or panics is recorded as a failure and the chain moves on.

use async_trait::async_trait;
use futures::FutureExt;
use imsg_core::{
    error::ImsgError,
    message::{SendRequest, SendResult},
    traits::SendProvider,
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

const DEFAULT_RECOMMENDATION: &str =
    "Ensure Messages.app is running and permissions are granted.";

/// Ordered chain of providers, fixed at construction.
pub struct FallbackProvider {
    providers: Vec<Box<dyn SendProvider>>,
}

impl FallbackProvider {
    pub fn new(providers: Vec<Box<dyn SendProvider>>) -> Self {
        Self { providers }
    }

    /// Names of the member providers, in order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait]
impl SendProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback-manager"
    }

    /// True when any member is available. `send_message` does not consult
    /// this; it always walks the whole chain.
    async fn is_available(&self) -> bool {
        for provider in &self.providers {
            if probe(provider.as_ref()).await.unwrap_or(false) {
                return true;
            }
        }
        false
    }

    async fn send_message(&self, request: &SendRequest) -> Result<SendResult, ImsgError> {
        let mut failures: Vec<String> = Vec::new();
        let mut last_recommendation: Option<String> = None;

        for provider in &self.providers {
            let name = provider.name();

            match probe(provider.as_ref()).await {
                Ok(true) => {}
                Ok(false) => {
                    info!("[{name}] provider not available, skipping");
                    continue;
                }
                Err(reason) => {
                    error!("[{name}] {reason}");
                    failures.push(format!("{name}: {reason}"));
                    continue;
                }
            }

            info!("[{name}] attempting to send message");
            let attempt = AssertUnwindSafe(provider.send_message(request))
                .catch_unwind()
                .await;
            match attempt {
                Ok(Ok(result)) if result.success => {
                    info!("[{name}] message sent successfully");
                    return Ok(result);
                }
                Ok(Ok(result)) => {
                    let reason = result.error.as_deref().unwrap_or("unknown error");
                    warn!("[{name}] failed: {reason}");
                    failures.push(format!("{name}: {reason}"));
                    if let Some(rec) = result.recommendation.filter(|r| !r.is_empty()) {
                        last_recommendation = Some(rec);
                    }
                }
                Ok(Err(e)) => {
                    error!("[{name}] unexpected error: {e}");
                    failures.push(format!("{name}: {e}"));
                }
                Err(payload) => {
                    let reason = panicked(payload);
                    error!("[{name}] {reason}");
                    failures.push(format!("{name}: {reason}"));
                }
            }
        }

        Ok(SendResult::failed(
            format!("All providers failed: {}", failures.join("; ")),
            None,
            Some(last_recommendation.unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string())),
        ))
    }
}

/// Availability check that survives a panicking member.
async fn probe(provider: &dyn SendProvider) -> Result<bool, String> {
    AssertUnwindSafe(provider.is_available())
        .catch_unwind()
        .await
        .map_err(panicked)
}

fn panicked(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("provider panicked: {detail}")
}
