//! Slack Purge - Delete Your Own Slack Messages
//!
//! Finds every message written by a user through `search.messages`, then
//! deletes them one at a time through `chat.delete`, waiting out rate limits.
//!
//! The run is all-or-nothing: the first search or delete failure ends it with
//! exit code 1, and messages already deleted stay deleted.
//!
//! # Usage
//!
//! ```bash
//! # Delete everything you ever wrote
//! slack-purge --user-id U012AB3CDE --token xoxp-...
//!
//! # Only in one channel, keeping two messages
//! slack-purge --user-id U012AB3CDE --token xoxp-... --channel C0123456789 \
//!     --exclude 1598120400000100 1598120400000200
//!
//! # See what would go without deleting anything
//! slack-purge --user-id U012AB3CDE --token xoxp-... --dry-run
//! ```
//!
//! Exclusions are the 16-digit suffix of a message permalink, i.e. the
//! message timestamp without its decimal point.

mod args;
mod collect;
mod delete;
mod error;
mod slack;
#[cfg(test)]
mod testing;

use anyhow::Context;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::Args;
use collect::{MessageFilter, collect_messages};
use delete::Deleter;
use slack::SlackClient;

/// Logs go to stderr so stdout carries only progress lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Searches, then deletes. Returns the first fatal error with the phase it
/// happened in.
async fn run(args: Args) -> anyhow::Result<()> {
    let client = SlackClient::new(
        &args.api_url,
        args.token,
        Duration::from_secs(args.timeout),
    )
    .context("Unable to initialise the HTTP client")?;

    let filter = MessageFilter::new(args.channel, args.exclude);
    info!(
        user = %args.user_id,
        channel = ?filter.channel().map(|c| c.as_str()),
        exclusions = filter.exclusion_count(),
        "searching for messages"
    );

    let messages = collect_messages(&client, &args.user_id, &filter)
        .await
        .context("The request was unsuccessful")?;

    if args.dry_run {
        for message in &messages {
            println!("  WOULD DELETE: {} {}", message.channel, message.ts);
        }
        println!("Dry run: {} messages would be deleted.", messages.len());
        return Ok(());
    }

    let deleted = Deleter::default()
        .delete_all(&client, &messages)
        .await
        .context("The delete request was unsuccessful")?;

    println!("Successfully deleted {deleted} messages.");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::from_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            // --help and --version also arrive here and are not failures.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error. {e:#}.");
            ExitCode::FAILURE
        }
    }
}
