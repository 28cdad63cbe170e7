//! Command-line arguments and the validated identifiers they carry.

use clap::Parser;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::warn;

use crate::error::ArgumentError;

/// Base URL of the Slack Web API.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

const USER_ID_PATTERN: &str = "[UW][0-9A-Z]{8,10}";
const TOKEN_PATTERN: &str = "xoxp-[0-9]{12}-[0-9]{12}-[0-9]{12}-[0-9a-f]{32}";
const CHANNEL_ID_PATTERN: &str = "[CD][0-9A-Z]{8,10}";
const EXCLUSION_PATTERN: &str = "[0-9]{16}";

// A pattern that fails to compile matches nothing, so every value is rejected.
fn anchored(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("^{pattern}$")) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Failed to compile pattern {pattern}: {e}");
            None
        }
    }
}

static USER_ID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| anchored(USER_ID_PATTERN));
static TOKEN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| anchored(TOKEN_PATTERN));
static CHANNEL_ID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| anchored(CHANNEL_ID_PATTERN));
static EXCLUSION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| anchored(EXCLUSION_PATTERN));

fn validate(
    value: &str,
    re: &Option<Regex>,
    what: &'static str,
    pattern: &'static str,
) -> Result<String, ArgumentError> {
    if re.as_ref().is_some_and(|re| re.is_match(value)) {
        Ok(value.to_string())
    } else {
        Err(ArgumentError { what, pattern })
    }
}

/// Slack user ID, e.g. `U012AB3CDE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl FromStr for UserId {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s, &USER_ID_RE, "a user ID", USER_ID_PATTERN).map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User access token (`xoxp-...`). Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Token {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s, &TOKEN_RE, "a user token", TOKEN_PATTERN).map(Self)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(xoxp-***)")
    }
}

/// Channel or direct-message conversation ID, e.g. `C012AB3CDE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelId {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s, &CHANNEL_ID_RE, "a channel ID", CHANNEL_ID_PATTERN).map(Self)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message to keep: its timestamp with the decimal point removed, as it
/// appears at the end of the message permalink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exclusion(String);

impl Exclusion {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for Exclusion {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s, &EXCLUSION_RE, "a 16-digit timestamp", EXCLUSION_PATTERN).map(Self)
    }
}

/// Deletes all of your own Slack messages, optionally within one channel.
#[derive(Parser, Debug)]
#[command(name = "slack-purge", version)]
#[command(about = "Deletes a Slack user's own messages via the Web API")]
pub struct Args {
    /// User whose messages are deleted (U or W followed by 8-10 uppercase alphanumerics).
    #[arg(long = "user-id", value_name = "ID")]
    pub user_id: UserId,

    /// User access token (xoxp-...).
    #[arg(long, value_name = "TOKEN")]
    pub token: Token,

    /// Only delete messages in this channel (C or D followed by 8-10 uppercase alphanumerics).
    #[arg(long, value_name = "CHANNEL")]
    pub channel: Option<ChannelId>,

    /// Messages to keep, given as the 16-digit suffix of their permalinks.
    #[arg(long, value_name = "TS", num_args = 1..)]
    pub exclude: Vec<Exclusion>,

    /// Per-request timeout in seconds.
    #[arg(
        long,
        value_name = "SECS",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Find the messages but do not delete them.
    #[arg(long)]
    pub dry_run: bool,

    /// Slack Web API base URL.
    #[arg(long, hide = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

impl Args {
    /// Parses an argument list whose first element is the program name.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}
