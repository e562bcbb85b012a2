use serde::{Deserialize, Serialize};

/// A request to deliver one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Phone number or email address, as supplied by the caller.
    pub recipient: String,
    /// Message text. May contain quotes, backslashes and newlines.
    pub message: String,
}

impl SendRequest {
    pub fn new(recipient: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a send attempt.
///
/// Build it with [`SendResult::delivered`] or [`SendResult::failed`] so a
/// successful result never carries an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Mechanism error code. A string because codes are not guaranteed numeric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl SendResult {
    /// A successful delivery. Most mechanisms do not return a message id.
    pub fn delivered(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            ..Default::default()
        }
    }

    /// A failed delivery with an optional mechanism code and remediation hint.
    pub fn failed(
        error: impl Into<String>,
        error_code: Option<String>,
        recommendation: Option<String>,
    ) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            error_code,
            recommendation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivered_has_no_error() {
        let result = SendResult::delivered(None);
        assert!(result.success);
        assert!(result.error.is_none());
        assert!(result.error_code.is_none());
        assert!(result.recommendation.is_none());
    }

    #[test]
    fn test_failed_populates_error() {
        let result = SendResult::failed("boom", Some("-600".into()), Some("restart".into()));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert_eq!(result.error_code.as_deref(), Some("-600"));
        assert_eq!(result.recommendation.as_deref(), Some("restart"));
    }

    #[test]
    fn test_serialization_uses_camel_case_and_skips_empty() {
        let json =
            serde_json::to_value(SendResult::failed("x", Some("-1728".into()), None)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorCode"], "-1728");
        assert!(json.get("recommendation").is_none());
        assert!(json.get("messageId").is_none());

        let json = serde_json::to_value(SendResult::delivered(Some("m1".into()))).unwrap();
        assert_eq!(json["messageId"], "m1");
        assert!(json.get("error").is_none());
    }
}
