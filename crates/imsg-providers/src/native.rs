//! Native bridge provider (placeholder).
//!
//! Reserved for a private-framework bridge into the Messages daemon. That
//! needs a compiled native helper and System Integrity Protection disabled,
//! so for now it always reports unavailable.

use async_trait::async_trait;
use imsg_core::{
    error::ImsgError,
    message::{SendRequest, SendResult},
    traits::SendProvider,
};

#[derive(Debug, Clone, Default)]
pub struct NativeProvider;

impl NativeProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SendProvider for NativeProvider {
    fn name(&self) -> &str {
        "native-imcore"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn send_message(&self, _request: &SendRequest) -> Result<SendResult, ImsgError> {
        Ok(SendResult::failed(
            "Native IMCore provider is not yet implemented.",
            None,
            Some("Use the AppleScript provider for now.".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_native_is_never_available() {
        let provider = NativeProvider::new();
        assert_eq!(provider.name(), "native-imcore");
        assert!(!provider.is_available().await);

        let result = provider
            .send_message(&SendRequest::new("+15551234567", "hi"))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.recommendation.is_some());
    }
}
