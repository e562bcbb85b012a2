mod commands;
mod health;

use clap::{Parser, Subcommand};
use commands::{Outcome, ReadCommand};
use imsg_core::config;
use imsg_providers::OsaScriptRunner;
use imsg_store::ChatStore;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "imsg",
    version,
    about = "Read and send messages through macOS Messages.app"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "~/.imsg/config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to a phone number or email.
    Send {
        /// Phone number or email address.
        recipient: String,
        /// Message text.
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Show the most recent messages.
    Recent {
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Search message text.
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Show the conversation with one phone number or email.
    Contact {
        handle: String,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// List chats.
    Chats,
    /// Search known handles.
    Contacts { query: String },
    /// Print the local path of an attachment.
    Attachment { guid: String },
    /// Check permissions, Messages.app and provider availability.
    Health {
        /// Human-readable output instead of TOON.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let guard = init_tracing(&cfg.imsg);
    if !config::exists(&cli.config) {
        tracing::info!(
            "Config file not found at {}, using defaults",
            config::shellexpand(&cli.config)
        );
    }

    let outcome = match cli.command {
        Commands::Send { recipient, message } => {
            let text = message.join(" ");
            if text.trim().is_empty() {
                anyhow::bail!("no message provided. Usage: imsg send <recipient> <message>");
            }
            let chain = commands::build_chain(&cfg.send)?;
            commands::send(&chain, &recipient, &text).await?
        }
        Commands::Health { pretty } => {
            let chain = commands::build_chain(&cfg.send)?;
            let runner = OsaScriptRunner::from_timeout_secs(cfg.send.script_timeout_secs);
            let report = health::check(&cfg.store.resolved_db_path(), &runner, &chain).await;
            let output = if pretty {
                health::format_report(&report)
            } else {
                imsg_core::toon::to_toon(&report, "items")?
            };
            Outcome {
                output,
                success: report.healthy,
            }
        }
        Commands::Recent { limit } => {
            let limit = limit.unwrap_or(cfg.store.default_limit);
            run_read(&cfg, ReadCommand::Recent { limit }).await?
        }
        Commands::Search { query, limit } => {
            let limit = limit.unwrap_or(cfg.store.default_limit);
            run_read(&cfg, ReadCommand::Search { query, limit }).await?
        }
        Commands::Contact { handle, limit } => {
            let limit = limit.unwrap_or(cfg.store.default_limit);
            run_read(&cfg, ReadCommand::Contact { handle, limit }).await?
        }
        Commands::Chats => run_read(&cfg, ReadCommand::Chats).await?,
        Commands::Contacts { query } => run_read(&cfg, ReadCommand::Contacts { query }).await?,
        Commands::Attachment { guid } => run_read(&cfg, ReadCommand::Attachment { guid }).await?,
    };

    println!("{}", outcome.output);
    if !outcome.success {
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}

/// Open the store (failure is reported, not fatal) and run one read command.
async fn run_read(cfg: &config::Config, command: ReadCommand) -> anyhow::Result<Outcome> {
    let store = ChatStore::open(&cfg.store).await;
    if let Err(ref e) = store {
        tracing::warn!("message store unavailable: {e}");
    }
    let outcome = commands::read(&store, &command).await?;
    if let Ok(store) = store {
        store.close().await;
    }
    Ok(outcome)
}

/// Install the global subscriber. Logs go to stderr, or to a daily rolling
/// file when `log_dir` is set; stdout is reserved for command output.
fn init_tracing(cfg: &config::ImsgConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    if cfg.log_dir.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(config::shellexpand(&cfg.log_dir), "imsg.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
