//! AppleScript source generation and string-literal escaping.

/// Read-only probe; replies `true` or `false`.
pub const RUNNING_PROBE: &str = "application \"Messages\" is running";

/// Bring Messages.app up and give it a moment to register its services.
pub const LAUNCH_SCRIPT: &str = r#"
tell application "Messages"
  activate
  delay 2
end tell
"#;

/// Asks System Events whether Messages is running. Exercises Automation
/// permission without touching Messages itself.
pub const AUTOMATION_PROBE: &str =
    "tell application \"System Events\" to (name of processes) contains \"Messages\"";

/// Escape message text for an AppleScript string literal.
///
/// Backslash is escaped first so the escapes added for `"` and newline are
/// not doubled.
pub fn escape_message(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape a normalized recipient. Only double quotes can break the literal.
pub fn escape_recipient(recipient: &str) -> String {
    recipient.replace('"', "\\\"")
}

/// Build the delivery script.
///
/// Tries the iMessage participant lookup first and, inside the same
/// invocation, a direct buddy lookup. Only when both fail does it return
/// `error:<number>:<message>` from the second attempt.
pub fn send_script(recipient: &str, message: &str) -> String {
    let recipient = escape_recipient(recipient);
    let message = escape_message(message);
    format!(
        r#"
tell application "Messages"
  try
    set targetService to 1st account whose service type = iMessage
    set targetBuddy to participant "{recipient}" of targetService
    send "{message}" to targetBuddy
    return "success"
  on error errMsg number errNum
    try
      set targetBuddy to buddy "{recipient}"
      send "{message}" to targetBuddy
      return "success"
    on error errMsg2 number errNum2
      return "error:" & errNum2 & ":" & errMsg2
    end try
  end try
end tell
"#
    )
}
