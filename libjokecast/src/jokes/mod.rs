//! Joke sources
//!
//! A [`JokeSource`] produces one candidate joke per call. Failures are
//! reported as `JokeError::Fetch` so the acquisition loop can count them
//! against its retry budget instead of aborting.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Joke;

pub mod http;

// Mock source is available for all builds to support integration tests
pub mod mock;

pub use http::HttpJokeSource;
pub use mock::MockJokeSource;

#[async_trait]
pub trait JokeSource: Send + Sync {
    /// Fetch one candidate joke
    ///
    /// # Errors
    ///
    /// Returns `JokeError::Fetch` for network failures, error responses, or
    /// bodies that cannot be decoded.
    async fn fetch(&self) -> Result<Joke>;
}

/// Plain functions can stand in for a source
#[async_trait]
impl<F> JokeSource for F
where
    F: Fn() -> Result<Joke> + Send + Sync,
{
    async fn fetch(&self) -> Result<Joke> {
        self()
    }
}
