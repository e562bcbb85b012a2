use super::*;
use async_trait::async_trait;

struct StaticProvider(SendResult);

#[async_trait]
impl SendProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn send_message(&self, _request: &SendRequest) -> Result<SendResult, ImsgError> {
        Ok(self.0.clone())
    }
}

struct BrokenProvider;

#[async_trait]
impl SendProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn send_message(&self, _request: &SendRequest) -> Result<SendResult, ImsgError> {
        Err(ImsgError::Provider("boom".to_string()))
    }
}

#[tokio::test]
async fn test_send_success_message() {
    let provider = StaticProvider(SendResult::delivered(None));
    let outcome = send(&provider, "+15551234567", "hi").await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.output, "Successfully sent message to +15551234567");
}

#[tokio::test]
async fn test_send_failure_renders_toon() {
    let provider = StaticProvider(SendResult::failed(
        "AppleScript error -1728: Can't get buddy",
        Some("-1728".to_string()),
        Some("Check the recipient".to_string()),
    ));
    let outcome = send(&provider, "+15551234567", "hi").await.unwrap();
    assert!(!outcome.success);
    assert_eq!(
        outcome.output,
        "success:false\n\
         error:\"AppleScript error -1728: Can't get buddy\"\n\
         errorCode:-1728\n\
         recommendation:Check the recipient"
    );
}

#[tokio::test]
async fn test_send_failure_omits_missing_fields() {
    let provider = StaticProvider(SendResult::failed("All providers failed: ", None, None));
    let outcome = send(&provider, "x", "hi").await.unwrap();
    assert!(!outcome.output.contains("errorCode"));
    assert!(!outcome.output.contains("recommendation"));
}

#[tokio::test]
async fn test_send_provider_error_propagates() {
    let result = send(&BrokenProvider, "x", "hi").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_read_without_store_reports_unavailable() {
    let store: Result<ChatStore, ImsgError> =
        Err(ImsgError::Store("chat.db not found at /nope".to_string()));
    let outcome = read(&store, &ReadCommand::Recent { limit: 5 }).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.output.starts_with("error:Database unavailable\n"));
    assert!(outcome
        .output
        .contains("reason:\"store error: chat.db not found at /nope\""));
    assert!(outcome.output.contains("recommendation:"));
}

#[test]
fn test_build_chain_default_order() {
    let chain = build_chain(&SendConfig::default()).unwrap();
    assert_eq!(chain.provider_names(), vec!["native-imcore", "applescript"]);
}

#[test]
fn test_build_chain_rejects_unknown_provider() {
    let cfg = SendConfig {
        providers: vec!["applescript".to_string(), "carrier-pigeon".to_string()],
        ..SendConfig::default()
    };
    let err = build_chain(&cfg).err().unwrap();
    assert!(err.to_string().contains("carrier-pigeon"));
}

#[test]
fn test_build_chain_rejects_empty() {
    let cfg = SendConfig {
        providers: Vec::new(),
        ..SendConfig::default()
    };
    assert!(build_chain(&cfg).is_err());
}
