//! Bounded joke acquisition
//!
//! Each attempt fetches one candidate and validates it. A failed fetch, an
//! empty text, or a recently posted text rejects the attempt and the loop
//! fetches again, up to `max_tries` attempts in total. Only an unreadable
//! timeline stops the loop early.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{JokeError, JokecastError, Result};
use crate::jokes::JokeSource;
use crate::service::history::DuplicateChecker;
use crate::types::Joke;

/// A joke that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    pub joke: Joke,
    /// 1-based attempt on which the joke was accepted
    pub attempts: u32,
}

/// Outcome of a single attempt
#[derive(Debug)]
enum Attempt {
    Accepted(Joke),
    Rejected(JokeError),
}

/// Joke acquirer
pub struct JokeAcquirer {
    source: Arc<dyn JokeSource>,
    checker: Option<DuplicateChecker>,
    max_tries: u32,
}

impl JokeAcquirer {
    /// Create an acquirer
    ///
    /// Without a checker, candidates are only validated for non-empty text.
    /// `max_tries` below 1 is raised to 1.
    pub fn new(
        source: Arc<dyn JokeSource>,
        checker: Option<DuplicateChecker>,
        max_tries: u32,
    ) -> Self {
        Self {
            source,
            checker,
            max_tries: max_tries.max(1),
        }
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Find a joke that is non-empty and not a recent duplicate
    ///
    /// # Errors
    ///
    /// - `JokecastError::HistoryUnavailable` as soon as the timeline cannot be read
    /// - `JokecastError::ExhaustedRetries` when every attempt was rejected
    pub async fn acquire(&self) -> Result<Acquired> {
        let mut last = None;

        for attempt in 1..=self.max_tries {
            debug!("Fetching joke (attempt {}/{})", attempt, self.max_tries);

            match self.attempt().await? {
                Attempt::Accepted(joke) => {
                    info!("Accepted joke {} on attempt {}", joke.id, attempt);
                    return Ok(Acquired {
                        joke,
                        attempts: attempt,
                    });
                }
                Attempt::Rejected(reason) => {
                    warn!(
                        "Attempt {}/{} rejected: {}",
                        attempt, self.max_tries, reason
                    );
                    last = Some(reason);
                }
            }
        }

        Err(JokecastError::ExhaustedRetries {
            attempts: self.max_tries,
            last: last.unwrap_or_else(|| JokeError::Fetch("no attempt was made".to_string())),
        })
    }

    async fn attempt(&self) -> Result<Attempt> {
        let joke = match self.source.fetch().await {
            Ok(joke) => joke,
            Err(JokecastError::Joke(reason)) => return Ok(Attempt::Rejected(reason)),
            Err(e) => return Err(e),
        };

        if joke.text.trim().is_empty() {
            return Ok(Attempt::Rejected(JokeError::EmptyText { id: joke.id }));
        }

        if let Some(checker) = &self.checker {
            if checker.is_duplicate(&joke.text).await? {
                return Ok(Attempt::Rejected(JokeError::Duplicate { text: joke.text }));
            }
        }

        Ok(Attempt::Accepted(joke))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::jokes::mock::{MockJokeSource, MockResponse};
    use crate::platforms::mock::MockPlatform;

    fn acquirer(source: &MockJokeSource, max_tries: u32) -> JokeAcquirer {
        JokeAcquirer::new(Arc::new(source.clone()), None, max_tries)
    }

    fn checked(source: &MockJokeSource, platform: &MockPlatform, max_tries: u32) -> JokeAcquirer {
        let checker = DuplicateChecker::new(Arc::new(platform.clone()), "dadjokebot", 30);
        JokeAcquirer::new(Arc::new(source.clone()), Some(checker), max_tries)
    }

    #[tokio::test]
    async fn test_first_valid_joke_is_accepted() {
        let source = MockJokeSource::always("A valid joke");

        let acquired = acquirer(&source, 5).acquire().await.unwrap();

        assert_eq!(acquired.joke.text, "A valid joke");
        assert_eq!(acquired.attempts, 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_and_blank_texts_are_retried() {
        let source = MockJokeSource::texts(&["", "   ", "Third time lucky"]);

        let acquired = acquirer(&source, 5).acquire().await.unwrap();

        assert_eq!(acquired.joke.text, "Third time lucky");
        assert_eq!(acquired.attempts, 3);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_retried() {
        let source = MockJokeSource::new(vec![
            MockResponse::Fail("timeout".to_string()),
            MockResponse::Joke(Joke::new("ok", "Recovered")),
        ]);

        let acquired = acquirer(&source, 5).acquire().await.unwrap();

        assert_eq!(acquired.joke.text, "Recovered");
        assert_eq!(acquired.attempts, 2);
    }

    #[tokio::test]
    async fn test_budget_is_bounded() {
        let source = MockJokeSource::failing("service down");

        let err = acquirer(&source, 4).acquire().await.unwrap_err();

        match err {
            JokecastError::ExhaustedRetries { attempts, last } => {
                assert_eq!(attempts, 4);
                assert_eq!(last, JokeError::Fetch("service down".to_string()));
            }
            other => panic!("Expected ExhaustedRetries, got {:?}", other),
        }
        assert_eq!(source.fetch_count(), 4);
    }

    #[tokio::test]
    async fn test_zero_tries_still_attempts_once() {
        let source = MockJokeSource::always("joke");
        let acquirer = acquirer(&source, 0);

        assert_eq!(acquirer.max_tries(), 1);
        assert!(acquirer.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_triggers_new_fetch() {
        let source = MockJokeSource::texts(&["Old one", "New one"]);
        let platform = MockPlatform::with_history("mock", &["Old one #pun #dadjoke"]);

        let acquired = checked(&source, &platform, 5).acquire().await.unwrap();

        assert_eq!(acquired.joke.text, "New one");
        assert_eq!(acquired.attempts, 2);
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(platform.list_call_count(), 2);
    }

    #[tokio::test]
    async fn test_last_rejection_is_reported() {
        let source = MockJokeSource::texts(&["", "Old one"]);
        let platform = MockPlatform::with_history("mock", &["Old one #pun #dadjoke"]);

        let err = checked(&source, &platform, 2).acquire().await.unwrap_err();

        assert!(matches!(
            err,
            JokecastError::ExhaustedRetries {
                attempts: 2,
                last: JokeError::Duplicate { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_text_skips_history_lookup() {
        let source = MockJokeSource::texts(&["", "fine"]);
        let platform = MockPlatform::success("mock");

        checked(&source, &platform, 5).acquire().await.unwrap();

        assert_eq!(platform.list_call_count(), 1);
    }

    #[tokio::test]
    async fn test_history_failure_stops_immediately() {
        let source = MockJokeSource::always("joke");
        let platform =
            MockPlatform::history_failure("mock", PlatformError::Network("down".to_string()));

        let err = checked(&source, &platform, 5).acquire().await.unwrap_err();

        assert!(matches!(err, JokecastError::HistoryUnavailable(_)));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_non_joke_source_errors_are_fatal() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let source = move || -> Result<Joke> {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(crate::error::ConfigError::MissingField("jokes.endpoint".to_string()).into())
        };
        let acquirer = JokeAcquirer::new(Arc::new(source), None, 5);

        let err = acquirer.acquire().await.unwrap_err();
        assert!(matches!(err, JokecastError::Config(_)));
    }
}
