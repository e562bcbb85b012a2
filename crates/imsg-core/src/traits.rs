use crate::{
    error::ImsgError,
    message::{SendRequest, SendResult},
};
use async_trait::async_trait;

/// One way of delivering a message.
///
/// Every mechanism (AppleScript, native bridge, the fallback chain itself)
/// implements this trait. A delivery failure is reported as
/// `Ok(SendResult { success: false, .. })`; `Err` is reserved for defects in
/// the provider itself.
#[async_trait]
pub trait SendProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Check if the mechanism currently looks usable. Never fails.
    async fn is_available(&self) -> bool;

    /// Attempt delivery.
    async fn send_message(&self, request: &SendRequest) -> Result<SendResult, ImsgError>;
}
