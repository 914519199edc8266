//! Duplicate detection against the account's recent timeline
//!
//! A candidate is a duplicate when its formatted text exactly matches one of
//! the last `window` posts. The timeline is fetched fresh on every check.

use std::sync::Arc;
use tracing::debug;

use crate::error::{JokecastError, Result};
use crate::platforms::Platform;
use crate::types::format_tweet;

/// Duplicate checker
///
/// Shares the posting session with the publisher.
pub struct DuplicateChecker {
    platform: Arc<dyn Platform>,
    account: String,
    window: u32,
}

impl DuplicateChecker {
    /// Create a checker for `account` looking at its last `window` posts
    pub fn new(platform: Arc<dyn Platform>, account: impl Into<String>, window: u32) -> Self {
        Self {
            platform,
            account: account.into(),
            window,
        }
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// Whether `raw_text` was posted within the recent window
    ///
    /// # Errors
    ///
    /// Returns `JokecastError::HistoryUnavailable` if the timeline cannot be
    /// listed. The acquisition loop treats this as fatal.
    pub async fn is_duplicate(&self, raw_text: &str) -> Result<bool> {
        let candidate = format_tweet(raw_text);

        let recent = self
            .platform
            .list_recent(&self.account, self.window)
            .await
            .map_err(JokecastError::HistoryUnavailable)?;

        debug!(
            "Checking candidate against {} recent posts on {}",
            recent.len(),
            self.platform.name()
        );

        Ok(recent
            .iter()
            .any(|post| decode_entities(&post.text) == candidate))
    }
}

/// Undo the HTML escaping the timeline API applies to post text
///
/// `&amp;` goes last so `&amp;lt;` decodes to `&lt;` rather than `<`.
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
