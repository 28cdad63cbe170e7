//! Message deletion with a fixed pause on rate limiting.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::SlackError;
use crate::slack::{DeleteOutcome, MessageRecord, SlackApi};

/// Pause after `chat.delete` answers 429 before retrying the same message.
pub const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(15);

/// A progress line is printed after every this many deletions.
pub const PROGRESS_INTERVAL: usize = 10;

/// Printed to stderr each time `chat.delete` answers 429.
pub const RATE_LIMIT_WARNING: &str = "Error. Rate limit exceeded. Sleeping and trying again.";

/// Where a single message is in its delete cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Attempting,
    RateLimited,
}

/// Deletes collected messages one at a time.
#[derive(Debug, Clone)]
pub struct Deleter {
    rate_limit_pause: Duration,
}

impl Default for Deleter {
    fn default() -> Self {
        Self {
            rate_limit_pause: RATE_LIMIT_PAUSE,
        }
    }
}

impl Deleter {
    pub fn with_rate_limit_pause(mut self, pause: Duration) -> Self {
        self.rate_limit_pause = pause;
        self
    }

    /// Deletes every message in order and returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Stops at the first failure other than rate limiting. Messages deleted
    /// before it stay deleted.
    pub async fn delete_all<A: SlackApi>(
        &self,
        api: &A,
        messages: &[MessageRecord],
    ) -> Result<usize, SlackError> {
        let mut deleted = 0;

        for message in messages {
            self.delete_one(api, message).await?;
            deleted += 1;

            if deleted % PROGRESS_INTERVAL == 0 {
                println!("Deleted {deleted} messages.");
            }
        }

        Ok(deleted)
    }

    /// Retries `message` for as long as the API keeps rate limiting.
    async fn delete_one<A: SlackApi>(
        &self,
        api: &A,
        message: &MessageRecord,
    ) -> Result<(), SlackError> {
        let mut state = Attempt::Attempting;
        let mut attempts: u32 = 0;

        loop {
            state = match state {
                Attempt::Attempting => {
                    attempts += 1;
                    match api.delete_message(message).await? {
                        DeleteOutcome::Deleted => {
                            debug!(
                                channel = %message.channel,
                                ts = %message.ts,
                                attempts,
                                "message deleted"
                            );
                            return Ok(());
                        }
                        DeleteOutcome::RateLimited => {
                            eprintln!("{RATE_LIMIT_WARNING}");
                            warn!(
                                ts = %message.ts,
                                pause_secs = self.rate_limit_pause.as_secs(),
                                "chat.delete rate limited"
                            );
                            Attempt::RateLimited
                        }
                    }
                }
                Attempt::RateLimited => {
                    sleep(self.rate_limit_pause).await;
                    Attempt::Attempting
                }
            };
        }
    }
}
