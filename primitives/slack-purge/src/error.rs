//! Error types for argument validation and Slack API calls.

use reqwest::StatusCode;
use thiserror::Error;

/// A command-line value that does not match its expected pattern.
///
/// clap prefixes the rendered message with the offending flag and value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("expected {what} matching `{pattern}`")]
pub struct ArgumentError {
    pub what: &'static str,
    pub pattern: &'static str,
}

/// Failures talking to the Slack Web API. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum SlackError {
    /// No response at all: connection refused, DNS failure, timeout.
    ///
    /// The request URL is stripped before the error is stored, since
    /// `search.messages` carries the token in its query string.
    #[error(
        "Unable to connect to the Slack servers. Ensure that your network connection has internet connectivity and try again"
    )]
    Transport(#[source] reqwest::Error),

    /// Any status other than the ones the caller knows how to handle.
    #[error("Status code: {}", .0.as_u16())]
    Status(StatusCode),

    /// HTTP 200 with `"ok": false`.
    #[error("Message: {0}")]
    Api(String),

    /// HTTP 200 whose body is not the expected JSON shape.
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl SlackError {
    /// Wraps a failed request without the URL it was sent to.
    pub fn transport(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}
