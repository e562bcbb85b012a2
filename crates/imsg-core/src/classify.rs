//! Classification of raw Messages.app automation failures.
//!
//! AppleScript reports failures as a negative error number plus free text.
//! Both entry points here are pure and never fail: anything unrecognized maps
//! to a generic recommendation.

/// Error number for "can't get object" (unknown buddy/participant).
pub const CODE_RECIPIENT_NOT_FOUND: i64 = -1728;
/// Error number for "not authorized to send Apple events".
pub const CODE_PERMISSION_DENIED: i64 = -1743;
/// Error number for "doesn't understand the message".
pub const CODE_NOT_UNDERSTOOD: i64 = -1708;
/// Error number for "application isn't running".
pub const CODE_APP_NOT_RUNNING: i64 = -600;

/// Known failure classes, keyed by AppleScript error number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RecipientNotFound,
    PermissionDenied,
    CommandNotUnderstood,
    AppNotRunning,
}

impl FailureKind {
    /// Map a numeric error code to a known class.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            CODE_RECIPIENT_NOT_FOUND => Some(Self::RecipientNotFound),
            CODE_PERMISSION_DENIED => Some(Self::PermissionDenied),
            CODE_NOT_UNDERSTOOD => Some(Self::CommandNotUnderstood),
            CODE_APP_NOT_RUNNING => Some(Self::AppNotRunning),
            _ => None,
        }
    }

    /// Human-actionable recommendation for this class.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::RecipientNotFound => {
                "The recipient was not found. Ensure the phone number includes country code \
                 (e.g., +1) or use an email address."
            }
            Self::PermissionDenied => {
                "Automation permission denied. Go to System Settings → Privacy & Security → \
                 Automation and enable Messages for your terminal."
            }
            Self::CommandNotUnderstood => {
                "Messages.app does not understand this command. Try restarting Messages.app."
            }
            Self::AppNotRunning => {
                "Application is not running. Messages.app will be launched automatically on \
                 next attempt."
            }
        }
    }
}

const NOT_AUTHORIZED_RECOMMENDATION: &str = "Permission denied. Grant Automation access in \
     System Settings → Privacy & Security → Automation.";
const GENERIC_RECOMMENDATION: &str =
    "Check that Messages.app is signed in and the recipient is valid.";

const TEXT_PERMISSION_RECOMMENDATION: &str = "Automation permission denied. Go to System \
     Settings → Privacy & Security → Automation and enable Messages.";
const TEXT_RECIPIENT_RECOMMENDATION: &str =
    "Recipient not found. Use full phone number with country code or email address.";
const TEXT_GENERIC_RECOMMENDATION: &str = "Ensure Messages.app is running and signed in.";

/// Classify a structured `error:<code>:<message>` reply.
pub fn recommendation(error_code: &str, error_message: &str) -> String {
    if let Some(kind) = error_code
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(FailureKind::from_code)
    {
        return kind.recommendation().to_string();
    }

    if mentions_not_authorized(error_message) {
        NOT_AUTHORIZED_RECOMMENDATION.to_string()
    } else {
        GENERIC_RECOMMENDATION.to_string()
    }
}

/// Classify a raw transport error string when no separate code is available.
pub fn recommendation_from_error(error_message: &str) -> String {
    let code = extract_error_code(error_message).and_then(|c| c.parse::<i64>().ok());

    if code == Some(CODE_PERMISSION_DENIED)
        || error_message.contains("-1743")
        || mentions_not_authorized(error_message)
    {
        return TEXT_PERMISSION_RECOMMENDATION.to_string();
    }
    if code == Some(CODE_RECIPIENT_NOT_FOUND) || error_message.contains("-1728") {
        return TEXT_RECIPIENT_RECOMMENDATION.to_string();
    }
    TEXT_GENERIC_RECOMMENDATION.to_string()
}

/// Find the first parenthesized integer, e.g. `(-1743)` in
/// `execution error: Not authorized to send Apple events to Messages. (-1743)`.
pub fn extract_error_code(error_message: &str) -> Option<String> {
    let mut rest = error_message;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        if let Some(close) = after.find(')') {
            let inner = &after[..close];
            let digits = inner.strip_prefix('-').unwrap_or(inner);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return Some(inner.to_string());
            }
        }
        rest = after;
    }
    None
}

fn mentions_not_authorized(text: &str) -> bool {
    text.to_lowercase().contains("not authorized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert!(recommendation("-1728", "anything").contains("recipient"));
        assert!(recommendation("-1743", "").contains("Automation permission"));
        assert!(recommendation("-1708", "").contains("does not understand"));
        assert!(recommendation("-600", "").contains("not running"));
    }

    #[test]
    fn test_codes_are_deterministic_regardless_of_message() {
        for msg in ["", "not authorized", "Can't get buddy", "a:b:c"] {
            assert!(recommendation("-1728", msg).contains("recipient"));
            assert!(recommendation("-1743", msg).contains("Automation permission"));
        }
    }

    #[test]
    fn test_unmapped_code_falls_back_to_text() {
        assert!(recommendation("-10000", "Not Authorized to send").contains("Automation"));
        assert_eq!(recommendation("-10000", "busy"), GENERIC_RECOMMENDATION);
    }

    #[test]
    fn test_unparsable_code_falls_back_to_text() {
        assert!(recommendation("unknown", "NOT AUTHORIZED").contains("Automation"));
        assert_eq!(recommendation("", "weird"), GENERIC_RECOMMENDATION);
    }

    #[test]
    fn test_recommendation_from_error() {
        assert!(recommendation_from_error(
            "execution error: Not authorized to send Apple events to Messages. (-1743)"
        )
        .contains("Automation permission denied"));
        assert!(recommendation_from_error("Can't get participant. (-1728)")
            .starts_with("Recipient not found"));
        assert_eq!(
            recommendation_from_error("spawn osascript ENOENT"),
            TEXT_GENERIC_RECOMMENDATION
        );
    }

    #[test]
    fn test_extract_error_code() {
        assert_eq!(
            extract_error_code("Messages got an error: Can't get buddy \"x\". (-1728)"),
            Some("-1728".to_string())
        );
        assert_eq!(extract_error_code("(see docs) failed (42)"), Some("42".into()));
        assert_eq!(extract_error_code("no code here"), None);
        assert_eq!(extract_error_code("empty () and (-)"), None);
    }

    #[test]
    fn test_failure_kind_from_code() {
        assert_eq!(FailureKind::from_code(-1743), Some(FailureKind::PermissionDenied));
        assert_eq!(FailureKind::from_code(-1), None);
    }
}
