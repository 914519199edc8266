//! Publishing an accepted joke

use std::sync::Arc;
use tracing::info;

use crate::error::{JokecastError, Result};
use crate::platforms::Platform;
use crate::types::Joke;

/// Publisher
///
/// Posts each joke exactly once. A failed publish is reported, not retried.
pub struct Publisher {
    platform: Arc<dyn Platform>,
}

impl Publisher {
    /// Create a new publisher on an established session
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Post the joke with its hashtags and return the new post id
    ///
    /// # Errors
    ///
    /// Returns `JokecastError::PublishFailed` carrying the platform error.
    pub async fn publish(&self, joke: &Joke) -> Result<String> {
        let text = joke.tweet_text();

        let post_id = self
            .platform
            .publish(&text)
            .await
            .map_err(JokecastError::PublishFailed)?;

        info!(
            "Posted joke {} to {} as {}",
            joke.id,
            self.platform.name(),
            post_id
        );
        Ok(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::platforms::mock::MockPlatform;

    #[tokio::test]
    async fn test_publish_appends_hashtags() {
        let platform = MockPlatform::success("mock");
        let publisher = Publisher::new(Arc::new(platform.clone()));

        let id = publisher
            .publish(&Joke::new("R7UfaahVfFd", "My dog used to chase people on a bike a lot."))
            .await
            .unwrap();

        assert!(id.starts_with("mock-"));
        assert_eq!(
            platform.posted_content(),
            vec!["My dog used to chase people on a bike a lot. #pun #dadjoke".to_string()]
        );
    }

    #[tokio::test]
    async fn test_publish_failure_is_not_retried() {
        let platform =
            MockPlatform::publish_failure("mock", PlatformError::Network("reset".to_string()));
        let publisher = Publisher::new(Arc::new(platform.clone()));

        let err = publisher
            .publish(&Joke::new("id", "text"))
            .await
            .unwrap_err();

        assert!(matches!(err, JokecastError::PublishFailed(PlatformError::Network(_))));
        assert_eq!(err.status_message(), Some("Failed to send"));
        assert_eq!(platform.publish_call_count(), 1);
    }
}
