//! Scripted [`SlackApi`] used by the collector and deleter tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::args::UserId;
use crate::error::SlackError;
use crate::slack::{
    DeleteOutcome, MatchChannel, MessageRecord, Pagination, SearchMatch, SearchPage, SlackApi,
};

/// Replays canned responses in order and records every call it receives.
#[derive(Default)]
pub struct ScriptedApi {
    pages: RefCell<VecDeque<Result<SearchPage, SlackError>>>,
    deletes: RefCell<VecDeque<Result<DeleteOutcome, SlackError>>>,
    pub requested_pages: RefCell<Vec<u32>>,
    pub delete_calls: RefCell<Vec<MessageRecord>>,
}

impl ScriptedApi {
    pub fn with_pages(pages: impl IntoIterator<Item = Result<SearchPage, SlackError>>) -> Self {
        Self {
            pages: RefCell::new(pages.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_deletes(
        outcomes: impl IntoIterator<Item = Result<DeleteOutcome, SlackError>>,
    ) -> Self {
        Self {
            deletes: RefCell::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }
}

impl SlackApi for ScriptedApi {
    async fn search_messages(&self, _user: &UserId, page: u32) -> Result<SearchPage, SlackError> {
        self.requested_pages.borrow_mut().push(page);
        self.pages
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SlackError::Api("script exhausted".to_string())))
    }

    async fn delete_message(&self, message: &MessageRecord) -> Result<DeleteOutcome, SlackError> {
        self.delete_calls.borrow_mut().push(message.clone());
        self.deletes
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(DeleteOutcome::Deleted))
    }
}

/// A search page holding `matches` given as `(channel, ts)` pairs.
pub fn page(total: u64, page_count: u32, matches: &[(&str, &str)]) -> SearchPage {
    SearchPage {
        total,
        matches: matches
            .iter()
            .map(|(channel, ts)| SearchMatch {
                channel: MatchChannel {
                    id: (*channel).to_string(),
                },
                ts: (*ts).to_string(),
            })
            .collect(),
        pagination: Pagination { page_count },
    }
}

pub fn record(channel: &str, ts: &str) -> MessageRecord {
    MessageRecord {
        channel: channel.to_string(),
        ts: ts.to_string(),
    }
}
