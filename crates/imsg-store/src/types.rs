use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const APPLE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// A message row with its sender resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub guid: String,
    pub text: String,
    pub sender: String,
    pub date: String,
    pub is_from_me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_guid: Option<String>,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_read: Option<String>,
    pub service: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub guid: String,
    pub filename: String,
    pub mime_type: String,
    pub total_bytes: i64,
    pub transfer_name: String,
}

/// A conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chat {
    pub chat_id: i64,
    pub chat_identifier: String,
    pub display_name: String,
}

/// A handle (phone number or email) known to Messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub handle_id: i64,
    pub id: String,
    pub service: String,
}

/// Convert Apple absolute time (nanoseconds since 2001-01-01 UTC) to RFC 3339.
pub fn apple_time_to_rfc3339(nanos: i64) -> String {
    let secs = nanos / 1_000_000_000;
    DateTime::<Utc>::from_timestamp(APPLE_EPOCH_OFFSET_SECS.saturating_add(secs), 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apple_epoch() {
        assert_eq!(apple_time_to_rfc3339(0), "2001-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_apple_time_nanoseconds() {
        // 700_000_000 seconds after the Apple epoch.
        assert_eq!(
            apple_time_to_rfc3339(700_000_000 * 1_000_000_000),
            "2023-03-08T20:26:40.000Z"
        );
    }
}
