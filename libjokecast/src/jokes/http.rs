//! HTTP joke source for icanhazdadjoke-compatible APIs

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::Duration;
use tracing::debug;

use crate::config::JokesConfig;
use crate::error::{JokeError, Result};
use crate::jokes::JokeSource;
use crate::types::Joke;

const AGENT: &str = concat!(
    "jokecast/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/jokecast/jokecast)"
);

/// Fetches a random joke with a single GET per call
pub struct HttpJokeSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpJokeSource {
    /// Create a source for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JokeError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &JokesConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.fetch_timeout()?)
    }
}

#[async_trait]
impl JokeSource for HttpJokeSource {
    async fn fetch(&self) -> Result<Joke> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, AGENT)
            .send()
            .await
            .map_err(|e| JokeError::Fetch(format!("request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JokeError::Fetch(format!(
                "{} returned HTTP {}",
                self.endpoint,
                status.as_u16()
            ))
            .into());
        }

        let joke: Joke = response
            .json()
            .await
            .map_err(|e| JokeError::Fetch(format!("undecodable joke body: {}", e)))?;

        debug!("Fetched joke {} from {}", joke.id, self.endpoint);
        Ok(joke)
    }
}
