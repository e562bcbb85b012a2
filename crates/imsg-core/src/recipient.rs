//! Recipient canonicalization.

/// Canonicalize a recipient before it reaches a send mechanism.
///
/// Anything containing `@` is an email address and is only trimmed. Everything
/// else is a phone number: non-digits are dropped and a leading `+` is kept.
/// Deliverability is left to the mechanism.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains('@') {
        return trimmed.to_string();
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if trimmed.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}
