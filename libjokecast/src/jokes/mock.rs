//! Scripted joke source for testing
//!
//! Replays a fixed list of responses in order. Once the script runs out the
//! last response repeats, so "always returns X" is a one-element script.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{JokeError, Result};
use crate::jokes::JokeSource;
use crate::types::Joke;

/// One scripted response
#[derive(Debug, Clone)]
pub enum MockResponse {
    Joke(Joke),
    Fail(String),
}

#[derive(Debug, Clone)]
pub struct MockJokeSource {
    script: Arc<Vec<MockResponse>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl MockJokeSource {
    pub fn new(script: Vec<MockResponse>) -> Self {
        Self {
            script: Arc::new(script),
            fetch_count: Arc::new(Mutex::new(0)),
        }
    }

    /// A source that returns jokes with the given texts in order
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| MockResponse::Joke(Joke::new(format!("joke-{}", i + 1), *text)))
                .collect(),
        )
    }

    /// A source that returns the same joke forever
    pub fn always(text: &str) -> Self {
        Self::texts(&[text])
    }

    /// A source whose every fetch fails
    pub fn failing(error: &str) -> Self {
        Self::new(vec![MockResponse::Fail(error.to_string())])
    }

    /// Get the number of times fetch was called
    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }
}

#[async_trait]
impl JokeSource for MockJokeSource {
    async fn fetch(&self) -> Result<Joke> {
        let index = {
            let mut count = self.fetch_count.lock().unwrap();
            *count += 1;
            *count - 1
        };

        let response = self
            .script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| MockResponse::Fail("Mock joke source has no script".to_string()));

        match response {
            MockResponse::Joke(joke) => Ok(joke),
            MockResponse::Fail(error) => Err(JokeError::Fetch(error).into()),
        }
    }
}
