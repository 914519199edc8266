//! Twitter platform implementation
//!
//! Talks to the v1.1 REST endpoints with OAuth 1.0a user-context signing:
//! `statuses/update` to publish and `statuses/user_timeline` to read back
//! the account's recent posts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::TwitterConfig;
use crate::error::PlatformError;
use crate::platforms::oauth::{encode_pairs, OAuthSigner};
use crate::platforms::{error_for_status, Platform, PlatformResult};
use crate::types::{Credentials, RecentPost};

/// `created_at` format used by the v1.1 API, e.g. "Wed Oct 10 20:19:24 +0000 2018"
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

pub struct TwitterClient {
    http: reqwest::Client,
    signer: OAuthSigner,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    id_str: String,
}

/// One timeline status; extended mode sends `full_text`, compat mode `text`
#[derive(Debug, Deserialize)]
struct TimelineEntry {
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TwitterClient {
    /// Establish an authenticated session
    ///
    /// No request is made here; the credentials are checked by the service on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Network` if the request timeout is invalid or
    /// the HTTP client cannot be built.
    pub fn authenticate(credentials: &Credentials, config: &TwitterConfig) -> PlatformResult<Self> {
        let timeout = config
            .request_timeout()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_timeout(credentials, config.api_base.clone(), timeout)
    }

    pub fn with_timeout(
        credentials: &Credentials,
        api_base: String,
        timeout: Duration,
    ) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            signer: OAuthSigner::new(credentials),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn read_body(response: reqwest::Response, context: &str) -> PlatformResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("{}: failed to read response: {}", context, e)))?;

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), context, &body));
        }
        Ok(body)
    }
}

#[async_trait]
impl Platform for TwitterClient {
    async fn publish(&self, text: &str) -> PlatformResult<String> {
        let url = self.endpoint("statuses/update.json");
        let params = [("status", text)];
        let authorization = self.signer.authorization_header("POST", &url, &params)?;

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_pairs(&params))
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("publish: {}", e)))?;

        let body = Self::read_body(response, "publish").await?;
        let status: StatusResponse = serde_json::from_str(&body)
            .map_err(|e| PlatformError::Api(format!("publish: unexpected response: {}", e)))?;

        debug!("Published status {}", status.id_str);
        Ok(status.id_str)
    }

    async fn list_recent(&self, account: &str, count: u32) -> PlatformResult<Vec<RecentPost>> {
        let url = self.endpoint("statuses/user_timeline.json");
        let count = count.to_string();
        let params = [
            ("screen_name", account),
            ("count", count.as_str()),
            ("tweet_mode", "extended"),
            ("trim_user", "true"),
        ];
        let authorization = self.signer.authorization_header("GET", &url, &params)?;

        let response = self
            .http
            .get(format!("{}?{}", url, encode_pairs(&params)))
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("list recent: {}", e)))?;

        let body = Self::read_body(response, "list recent").await?;
        let entries: Vec<TimelineEntry> = serde_json::from_str(&body)
            .map_err(|e| PlatformError::Api(format!("list recent: unexpected response: {}", e)))?;

        debug!("Listed {} recent posts for {}", entries.len(), account);
        Ok(entries.into_iter().map(RecentPost::from).collect())
    }

    fn name(&self) -> &str {
        "twitter"
    }
}

impl From<TimelineEntry> for RecentPost {
    fn from(entry: TimelineEntry) -> Self {
        RecentPost {
            text: entry.full_text.or(entry.text).unwrap_or_default(),
            posted_at: entry.created_at.as_deref().and_then(parse_created_at),
        }
    }
}

fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
