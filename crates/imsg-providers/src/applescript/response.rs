//! Interpretation of the delivery script's return value.

use imsg_core::classify;
use imsg_core::message::SendResult;

/// Literal reply for a confirmed delivery.
pub const SUCCESS_REPLY: &str = "success";
/// Prefix of a structured failure reply.
pub const ERROR_PREFIX: &str = "error:";

/// What the script said, before any policy is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptReply {
    /// The literal `success` token.
    Success,
    /// `error:<code>:<message>`.
    Error { code: String, message: String },
    /// Anything else.
    Unrecognized(String),
}

impl ScriptReply {
    pub fn parse(raw: &str) -> Self {
        if raw == SUCCESS_REPLY {
            return Self::Success;
        }
        match split_error_reply(raw) {
            Some((code, message)) => Self::Error { code, message },
            None => Self::Unrecognized(raw.to_string()),
        }
    }
}

/// Split `error:<code>:<message>`.
///
/// Only the first two colons are structural; the message keeps any further
/// colons. An empty code becomes `unknown` and an empty message becomes
/// `Unknown error`. Returns `None` when the reply is not an error reply.
pub fn split_error_reply(raw: &str) -> Option<(String, String)> {
    let rest = raw.strip_prefix(ERROR_PREFIX)?;
    let (code, message) = rest.split_once(':').unwrap_or((rest, ""));

    let code = if code.is_empty() { "unknown" } else { code };
    let message = if message.is_empty() {
        "Unknown error"
    } else {
        message
    };
    Some((code.to_string(), message.to_string()))
}

/// Build the failure result for a structured error reply.
pub fn error_result(code: &str, message: &str) -> SendResult {
    SendResult::failed(
        format!("AppleScript error {code}: {message}"),
        Some(code.to_string()),
        Some(classify::recommendation(code, message)),
    )
}

/// Build the failure result for a transport-level failure.
pub fn transport_failure_result(error_message: &str) -> SendResult {
    let code = classify::extract_error_code(error_message).unwrap_or_else(|| "unknown".into());
    SendResult::failed(
        error_message,
        Some(code),
        Some(classify::recommendation_from_error(error_message)),
    )
}
