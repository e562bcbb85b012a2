//! Tests for the AppleScript provider.

use super::response::{split_error_reply, ScriptReply};
use super::script::{escape_message, send_script, LAUNCH_SCRIPT, RUNNING_PROBE};
use super::*;
use crate::launcher::{AppLauncher, NoopLauncher, ScriptLauncher};
use async_trait::async_trait;
use imsg_core::{
    error::ImsgError,
    message::SendRequest,
    traits::SendProvider,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Runner that replays queued replies and repeats the last one forever.
struct ScriptedRunner {
    replies: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Result<String, String>>,
    scripts: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        let replies: VecDeque<Result<String, String>> = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        let last = replies
            .back()
            .cloned()
            .unwrap_or_else(|| Ok("success".to_string()));
        Arc::new(Self {
            replies: Mutex::new(replies),
            last: Mutex::new(last),
            scripts: Mutex::new(Vec::new()),
        })
    }

    fn always(reply: Result<&str, &str>) -> Arc<Self> {
        Self::new(vec![reply])
    }

    fn calls(&self) -> usize {
        self.scripts.lock().unwrap().len()
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRunner for ScriptedRunner {
    async fn run(&self, script: &str) -> Result<String, ImsgError> {
        self.scripts.lock().unwrap().push(script.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = reply.clone();
                reply
            }
            None => self.last.lock().unwrap().clone(),
        };
        reply.map_err(ImsgError::Script)
    }
}

#[derive(Default)]
struct CountingLauncher {
    calls: AtomicUsize,
}

#[async_trait]
impl AppLauncher for CountingLauncher {
    async fn ensure_running(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn provider(runner: Arc<ScriptedRunner>) -> AppleScriptProvider {
    AppleScriptProvider::with_runner(runner, Arc::new(NoopLauncher))
        .with_retry(RetryPolicy::immediate(2))
}

fn request() -> SendRequest {
    SendRequest::new("+1 (555) 123-4567", "hello")
}

/// Extract every `send "..."` literal from a script and undo AppleScript escaping.
fn sent_literals(script: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = script;
    while let Some(start) = rest.find("send \"") {
        let mut chars = rest[start + 6..].char_indices();
        let mut text = String::new();
        let mut end = None;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, other)) => text.push(other),
                    None => break,
                },
                '"' => {
                    end = Some(start + 6 + i + 1);
                    break;
                }
                other => text.push(other),
            }
        }
        out.push(text);
        match end {
            Some(e) => rest = &rest[e..],
            None => break,
        }
    }
    out
}

// --- Reply parsing ---

#[test]
fn test_split_error_reply_keeps_extra_colons() {
    assert_eq!(
        split_error_reply("error:-1728:Can't get buddy: \"x\": gone"),
        Some(("-1728".into(), "Can't get buddy: \"x\": gone".into()))
    );
}

#[test]
fn test_split_error_reply_defaults() {
    assert_eq!(
        split_error_reply("error:"),
        Some(("unknown".into(), "Unknown error".into()))
    );
    assert_eq!(
        split_error_reply("error:-600"),
        Some(("-600".into(), "Unknown error".into()))
    );
    assert_eq!(split_error_reply("success"), None);
}

#[test]
fn test_script_reply_parse() {
    assert_eq!(ScriptReply::parse("success"), ScriptReply::Success);
    assert!(matches!(
        ScriptReply::parse("error:-1708:nope"),
        ScriptReply::Error { ref code, .. } if code == "-1708"
    ));
    assert_eq!(
        ScriptReply::parse("sent"),
        ScriptReply::Unrecognized("sent".into())
    );
}

// --- Script generation ---

#[test]
fn test_escaping_round_trip() {
    let original = "path C:\\tmp says \"hi\"\nsecond line \\\" done";
    let script = send_script("+15551234567", original);
    let literals = sent_literals(&script);
    assert_eq!(literals.len(), 2, "both lookup paths send the message");
    for literal in literals {
        assert_eq!(literal, original);
    }
    assert!(!script.contains("hi\"\n"), "raw quote must not end the literal");
}

#[test]
fn test_escape_message_order() {
    assert_eq!(escape_message("\\\"\n"), "\\\\\\\"\\n");
}

#[test]
fn test_recipient_quotes_escaped() {
    let script = send_script("a\"b@example.com", "x");
    assert!(script.contains("participant \"a\\\"b@example.com\""));
    assert!(script.contains("buddy \"a\\\"b@example.com\""));
}

#[test]
fn test_script_has_participant_then_buddy_fallback() {
    let script = send_script("+15551234567", "x");
    let participant = script.find("participant \"+15551234567\"").unwrap();
    let buddy = script.find("buddy \"+15551234567\"").unwrap();
    assert!(participant < buddy);
    assert!(script.contains("return \"error:\" & errNum2 & \":\" & errMsg2"));
}

// --- Send behavior ---

#[tokio::test]
async fn test_success_reply() {
    let runner = ScriptedRunner::always(Ok("success"));
    let result = provider(runner.clone()).send_message(&request()).await.unwrap();
    assert!(result.success);
    assert!(result.error.is_none());
    assert!(result.message_id.is_none());
    assert_eq!(runner.calls(), 1);
}

#[tokio::test]
async fn test_recipient_is_normalized_in_script() {
    let runner = ScriptedRunner::always(Ok("success"));
    provider(runner.clone()).send_message(&request()).await.unwrap();
    assert!(runner.scripts()[0].contains("participant \"+15551234567\""));
}

#[tokio::test]
async fn test_permission_denied_short_circuits() {
    let runner = ScriptedRunner::always(Ok("error:-1743:Not authorized to send Apple events"));
    let launcher = Arc::new(CountingLauncher::default());
    let provider = AppleScriptProvider::with_runner(runner.clone(), launcher.clone())
        .with_retry(RetryPolicy::immediate(2));

    let result = provider.send_message(&request()).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("-1743"));
    assert!(result.recommendation.unwrap().contains("Automation permission"));
    assert_eq!(runner.calls(), 1);
    assert_eq!(launcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transport_permission_error_short_circuits() {
    let runner = ScriptedRunner::always(Err(
        "execution error: Not authorized to send Apple events to Messages. (-1743)",
    ));
    let result = provider(runner.clone()).send_message(&request()).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("-1743"));
    assert_eq!(runner.calls(), 1);
}

#[tokio::test]
async fn test_exhaustion_returns_last_failure() {
    let runner = ScriptedRunner::new(vec![
        Ok("error:-600:first"),
        Ok("error:-1708:second"),
        Ok("error:-1728:third: with colon"),
    ]);
    let launcher = Arc::new(CountingLauncher::default());
    let provider = AppleScriptProvider::with_runner(runner.clone(), launcher.clone())
        .with_retry(RetryPolicy::immediate(2));

    let result = provider.send_message(&request()).await.unwrap();
    assert_eq!(runner.calls(), 3);
    assert_eq!(launcher.calls.load(Ordering::SeqCst), 2);
    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("AppleScript error -1728: third: with colon")
    );
    assert_eq!(result.error_code.as_deref(), Some("-1728"));
    assert!(result.recommendation.unwrap().contains("recipient"));
}

#[tokio::test]
async fn test_every_attempt_non_permission_failure_runs_three_times() {
    let runner = ScriptedRunner::always(Ok("error:-600:Application isn't running."));
    let result = provider(runner.clone()).send_message(&request()).await.unwrap();
    assert_eq!(runner.calls(), 3);
    assert_eq!(result.error_code.as_deref(), Some("-600"));
}

#[tokio::test]
async fn test_success_after_retry() {
    let runner = ScriptedRunner::new(vec![Err("connection invalid"), Ok("success")]);
    let result = provider(runner.clone()).send_message(&request()).await.unwrap();
    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(runner.calls(), 2);
}

#[tokio::test]
async fn test_zero_retries_runs_once() {
    let runner = ScriptedRunner::always(Ok("error:-600:down"));
    let provider = AppleScriptProvider::with_runner(runner.clone(), Arc::new(NoopLauncher))
        .with_retry(RetryPolicy::immediate(0));
    let result = provider.send_message(&request()).await.unwrap();
    assert!(!result.success);
    assert_eq!(runner.calls(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_classified() {
    let runner = ScriptedRunner::always(Err("osascript: can't open default scripting component"));
    let result = provider(runner).send_message(&request()).await.unwrap();
    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("osascript: can't open default scripting component")
    );
    assert_eq!(result.error_code.as_deref(), Some("unknown"));
    assert_eq!(
        result.recommendation.as_deref(),
        Some("Ensure Messages.app is running and signed in.")
    );
}

#[tokio::test]
async fn test_unrecognized_reply_lenient_is_success() {
    let runner = ScriptedRunner::always(Ok("missing value"));
    let result = provider(runner).send_message(&request()).await.unwrap();
    assert!(result.success);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_unrecognized_reply_strict_is_failure() {
    let runner = ScriptedRunner::always(Ok("missing value"));
    let provider = provider(runner.clone()).with_reply_policy(ReplyPolicy::Strict);
    let result = provider.send_message(&request()).await.unwrap();
    assert!(!result.success);
    assert!(result.error.unwrap().contains("missing value"));
    assert_eq!(runner.calls(), 3);
}

// --- Availability ---

#[tokio::test]
async fn test_is_available_probe() {
    let runner = ScriptedRunner::always(Ok("true"));
    assert!(provider(runner.clone()).is_available().await);
    assert_eq!(runner.scripts()[0], RUNNING_PROBE);

    let runner = ScriptedRunner::always(Ok("false"));
    assert!(!provider(runner).is_available().await);

    let runner = ScriptedRunner::always(Err("boom"));
    assert!(!provider(runner).is_available().await);
}

#[tokio::test]
async fn test_script_launcher_launches_only_when_not_running() {
    let runner = ScriptedRunner::always(Ok("true"));
    ScriptLauncher::new(runner.clone()).ensure_running().await;
    assert_eq!(runner.scripts(), vec![RUNNING_PROBE.to_string()]);

    let runner = ScriptedRunner::new(vec![Ok("false"), Err("launch failed")]);
    ScriptLauncher::new(runner.clone()).ensure_running().await;
    assert_eq!(
        runner.scripts(),
        vec![RUNNING_PROBE.to_string(), LAUNCH_SCRIPT.to_string()]
    );
}

#[test]
fn test_reply_policy_from_config() {
    assert_eq!(ReplyPolicy::from_lenient(true), ReplyPolicy::Lenient);
    assert_eq!(ReplyPolicy::from_lenient(false), ReplyPolicy::Strict);
    assert_eq!(ReplyPolicy::default(), ReplyPolicy::Lenient);
}

#[test]
fn test_provider_name() {
    assert_eq!(AppleScriptProvider::new().name(), "applescript");
}
