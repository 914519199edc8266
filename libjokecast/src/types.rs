//! Core types for Jokecast

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Hashtags appended to every joke before it is posted
pub const HASHTAGS: &str = "#pun #dadjoke";

/// Format a raw joke into the exact text that gets posted
pub fn format_tweet(text: &str) -> String {
    format!("{} {}", text, HASHTAGS)
}

/// A joke as returned by the joke API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "joke", default)]
    pub text: String,
    #[serde(default)]
    pub status: u16,
}

impl Joke {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status: 200,
        }
    }

    /// The text as it will appear on the timeline
    pub fn tweet_text(&self) -> String {
        format_tweet(&self.text)
    }
}

/// A previously published post, as listed by the posting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentPost {
    pub text: String,
    pub posted_at: Option<DateTime<Utc>>,
}

impl RecentPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            posted_at: None,
        }
    }
}

/// OAuth 1.0a credentials for the posting service
///
/// Values are wrapped in [`SecretString`] so they are zeroed on drop and
/// redacted from `Debug` output.
#[derive(Debug)]
pub struct Credentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_key: SecretString,
    pub access_secret: SecretString,
}

impl Credentials {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_key: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: SecretString::from(consumer_key.into()),
            consumer_secret: SecretString::from(consumer_secret.into()),
            access_key: SecretString::from(access_key.into()),
            access_secret: SecretString::from(access_secret.into()),
        }
    }

    /// Labels of any credentials that are empty, in resolution order
    pub fn empty_fields(&self) -> Vec<&'static str> {
        [
            ("consumer key", &self.consumer_key),
            ("consumer secret", &self.consumer_secret),
            ("access key", &self.access_key),
            ("access secret", &self.access_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.expose_secret().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Platform-specific id of the new post
    pub post_id: String,
    /// Text that was posted
    pub text: String,
    /// Id of the joke at the source
    pub joke_id: String,
    /// Fetch attempts used to find an acceptable joke
    pub attempts: u32,
}

impl Delivery {
    pub const STATUS: &'static str = "Sent!";

    pub fn status(&self) -> &'static str {
        Self::STATUS
    }
}
