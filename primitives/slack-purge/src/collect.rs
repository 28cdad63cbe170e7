//! Message collection: pages through `search.messages` and keeps the
//! matches that pass the channel filter and exclusion list.

use std::collections::HashSet;
use tracing::debug;

use crate::args::{ChannelId, Exclusion, UserId};
use crate::error::SlackError;
use crate::slack::{MessageRecord, SlackApi};

/// Decides which search matches are deleted.
#[derive(Debug, Default)]
pub struct MessageFilter {
    channel: Option<ChannelId>,
    exclusions: HashSet<String>,
}

impl MessageFilter {
    pub fn new(
        channel: Option<ChannelId>,
        exclusions: impl IntoIterator<Item = Exclusion>,
    ) -> Self {
        Self {
            channel,
            exclusions: exclusions.into_iter().map(Exclusion::into_inner).collect(),
        }
    }

    pub fn channel(&self) -> Option<&ChannelId> {
        self.channel.as_ref()
    }

    pub fn exclusion_count(&self) -> usize {
        self.exclusions.len()
    }

    /// True when the message is in the selected channel (or no channel was
    /// selected) and its decimal-stripped timestamp is not excluded.
    pub fn admits(&self, channel: &str, ts: &str) -> bool {
        let in_channel = self
            .channel
            .as_ref()
            .is_none_or(|selected| selected.as_str() == channel);

        in_channel && !self.exclusions.contains(&ts.replace('.', ""))
    }
}

/// Collects every message by `user` that `filter` admits, in search order.
///
/// Pages are requested one at a time starting from 1 until the page number
/// reaches the server-reported page count.
///
/// # Errors
///
/// Returns the first search failure; nothing collected so far is returned.
pub async fn collect_messages<A: SlackApi>(
    api: &A,
    user: &UserId,
    filter: &MessageFilter,
) -> Result<Vec<MessageRecord>, SlackError> {
    let mut messages = Vec::new();
    let mut page = 1;

    loop {
        let result = api.search_messages(user, page).await?;

        if result.total == 0 {
            println!("There are no messages to process.");
            return Ok(messages);
        }

        let page_count = result.pagination.page_count;
        messages.extend(
            result
                .matches
                .into_iter()
                .filter(|m| filter.admits(&m.channel.id, &m.ts))
                .map(|m| MessageRecord {
                    channel: m.channel.id,
                    ts: m.ts,
                }),
        );
        debug!(page, page_count, collected = messages.len(), "search page processed");

        // `>=` rather than `==` so a page count of 0 cannot loop forever.
        if page >= page_count {
            println!("Processed {} messages.", messages.len());
            return Ok(messages);
        }

        page += 1;
    }
}
