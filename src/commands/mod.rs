//! CLI command handlers. Each handler returns the text to print and whether
//! the command succeeded; `main` owns stdout and the exit status.

use imsg_core::{
    config::SendConfig,
    error::ImsgError,
    message::{SendRequest, SendResult},
    toon::to_toon,
    traits::SendProvider,
};
use imsg_providers::{AppleScriptProvider, FallbackProvider, NativeProvider};
use imsg_store::ChatStore;
use serde::Serialize;
use tracing::info;

#[cfg(test)]
mod tests;

/// Rendered command output.
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn ok(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }

    fn failed(output: String) -> Self {
        Self {
            output,
            success: false,
        }
    }
}

/// Read-only queries against the message store.
#[derive(Debug, Clone)]
pub enum ReadCommand {
    Recent { limit: i64 },
    Search { query: String, limit: i64 },
    Contact { handle: String, limit: i64 },
    Chats,
    Contacts { query: String },
    Attachment { guid: String },
}

/// Build the fallback chain from the configured provider names.
pub fn build_chain(cfg: &SendConfig) -> anyhow::Result<FallbackProvider> {
    let mut providers: Vec<Box<dyn SendProvider>> = Vec::new();
    for name in &cfg.providers {
        match name.as_str() {
            "native-imcore" => providers.push(Box::new(NativeProvider::new())),
            "applescript" => providers.push(Box::new(AppleScriptProvider::from_config(cfg))),
            other => anyhow::bail!("unsupported provider: {other}"),
        }
    }
    if providers.is_empty() {
        anyhow::bail!("no send providers configured. Set [send] providers in config.toml.");
    }
    Ok(FallbackProvider::new(providers))
}

/// Send one message through the chain.
pub async fn send(
    provider: &dyn SendProvider,
    recipient: &str,
    message: &str,
) -> anyhow::Result<Outcome> {
    let request = SendRequest::new(recipient, message);
    let result = provider.send_message(&request).await?;
    render_send_result(recipient, &result)
}

/// Failure fields shown to the user. `messageId` is never part of a failure.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendFailure<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation: Option<&'a str>,
}

fn render_send_result(recipient: &str, result: &SendResult) -> anyhow::Result<Outcome> {
    if result.success {
        info!("sent message to {recipient}");
        return Ok(Outcome::ok(format!(
            "Successfully sent message to {recipient}"
        )));
    }

    let failure = SendFailure {
        success: false,
        error: result.error.as_deref(),
        error_code: result.error_code.as_deref(),
        recommendation: result.recommendation.as_deref(),
    };
    Ok(Outcome::failed(to_toon(&failure, "items")?))
}

#[derive(Serialize)]
struct Unavailable<'a> {
    error: &'a str,
    reason: String,
    recommendation: &'a str,
}

/// Run a read command. A store that failed to open yields a structured
/// "Database unavailable" result instead of an error.
pub async fn read(
    store: &Result<ChatStore, ImsgError>,
    command: &ReadCommand,
) -> anyhow::Result<Outcome> {
    let store = match store {
        Ok(store) => store,
        Err(e) => return database_unavailable(e),
    };

    let outcome = match command {
        ReadCommand::Recent { limit } => {
            Outcome::ok(to_toon(&store.recent_messages(*limit).await?, "messages")?)
        }
        ReadCommand::Search { query, limit } => Outcome::ok(to_toon(
            &store.search_messages(query, *limit).await?,
            "messages",
        )?),
        ReadCommand::Contact { handle, limit } => Outcome::ok(to_toon(
            &store.messages_from_contact(handle, *limit).await?,
            "messages",
        )?),
        ReadCommand::Chats => Outcome::ok(to_toon(&store.list_chats().await?, "chats")?),
        ReadCommand::Contacts { query } => {
            Outcome::ok(to_toon(&store.search_contacts(query).await?, "contacts")?)
        }
        ReadCommand::Attachment { guid } => match store.attachment_path(guid).await? {
            Some(path) => Outcome::ok(path),
            None => Outcome::failed(format!("Attachment with GUID {guid} not found.")),
        },
    };
    Ok(outcome)
}

fn database_unavailable(cause: &ImsgError) -> anyhow::Result<Outcome> {
    let body = Unavailable {
        error: "Database unavailable",
        reason: cause.to_string(),
        recommendation: "Run `imsg health` to diagnose and fix permission issues.",
    };
    Ok(Outcome::failed(to_toon(&body, "items")?))
}
