//! Slack Web API client for `search.messages` and `chat.delete`.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::args::{Token, UserId};
use crate::error::SlackError;

/// Number of matches requested per search page.
pub const PAGE_SIZE: u32 = 100;

/// A message found by the search that is due for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub channel: String,
    pub ts: String,
}

/// The `messages` object of a successful `search.messages` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    pub total: u64,
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMatch {
    pub channel: MatchChannel,
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchChannel {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page_count: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    ok: bool,
    error: Option<String>,
    messages: Option<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    ok: bool,
    error: Option<String>,
}

/// Result of a single `chat.delete` attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    RateLimited,
}

/// The two calls the collector and deleter need.
pub trait SlackApi {
    /// Fetches one page of messages authored by `user`, sorted by timestamp.
    async fn search_messages(&self, user: &UserId, page: u32) -> Result<SearchPage, SlackError>;

    /// Deletes one message on behalf of the token's owner.
    async fn delete_message(&self, message: &MessageRecord) -> Result<DeleteOutcome, SlackError>;
}

/// Search query matching every message written by `user`.
pub fn search_query(user: &UserId) -> String {
    format!("from:<@{user}>")
}

/// Web API client authenticated with a user token.
pub struct SlackClient {
    http: Client,
    base_url: String,
    token: Token,
}

impl SlackClient {
    /// Creates a client against `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(base_url: &str, token: Token, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("slack-purge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }
}

// Body read failures after the status line are transport problems unless the
// bytes arrived and simply were not the JSON we expected.
fn body_error(e: reqwest::Error) -> SlackError {
    if e.is_decode() {
        SlackError::Decode(e.without_url().to_string())
    } else {
        SlackError::transport(e)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, SlackError> {
    response.json::<T>().await.map_err(body_error)
}

fn api_error(error: Option<String>) -> SlackError {
    SlackError::Api(error.unwrap_or_else(|| "unknown_error".to_string()))
}

impl SlackApi for SlackClient {
    async fn search_messages(&self, user: &UserId, page: u32) -> Result<SearchPage, SlackError> {
        let query = search_query(user);
        let count = PAGE_SIZE.to_string();
        let page_param = page.to_string();

        let response = self
            .http
            .get(self.endpoint("search.messages"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .query(&[
                ("token", self.token.as_str()),
                ("query", query.as_str()),
                ("sort", "timestamp"),
                ("count", count.as_str()),
                ("page", page_param.as_str()),
            ])
            .send()
            .await
            .map_err(SlackError::transport)?;

        let status = response.status();
        debug!(page, %status, "search.messages responded");
        if status != StatusCode::OK {
            return Err(SlackError::Status(status));
        }

        let body: SearchResponse = read_json(response).await?;
        if !body.ok {
            return Err(api_error(body.error));
        }

        body.messages
            .ok_or_else(|| SlackError::Decode("response has no `messages` object".to_string()))
    }

    async fn delete_message(&self, message: &MessageRecord) -> Result<DeleteOutcome, SlackError> {
        let response = self
            .http
            .post(self.endpoint("chat.delete"))
            .bearer_auth(self.token.as_str())
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .json(&json!({
                "channel": message.channel,
                "ts": message.ts,
                "as_user": true,
            }))
            .send()
            .await
            .map_err(SlackError::transport)?;

        let status = response.status();
        debug!(channel = %message.channel, ts = %message.ts, %status, "chat.delete responded");
        match status {
            StatusCode::OK => {
                let body: DeleteResponse = read_json(response).await?;
                if body.ok {
                    Ok(DeleteOutcome::Deleted)
                } else {
                    Err(api_error(body.error))
                }
            }
            StatusCode::TOO_MANY_REQUESTS => Ok(DeleteOutcome::RateLimited),
            other => Err(SlackError::Status(other)),
        }
    }
}
