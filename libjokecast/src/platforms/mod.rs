//! Posting service abstraction and implementations
//!
//! A [`Platform`] is an authenticated session with the posting service. It
//! is built once per invocation from resolved credentials and then shared by
//! the duplicate checker (reads) and the publisher (writes).
//!
//! # Examples
//!
//! ```no_run
//! use libjokecast::config::TwitterConfig;
//! use libjokecast::platforms::{twitter::TwitterClient, Platform};
//! use libjokecast::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("ck", "cs", "ak", "as");
//! let client = TwitterClient::authenticate(&credentials, &TwitterConfig::default())?;
//!
//! let recent = client.list_recent("dadjokebot", 30).await?;
//! println!("{} recent posts", recent.len());
//!
//! let id = client.publish("Hello, timeline!").await?;
//! println!("Posted: {}", id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::types::RecentPost;

pub mod oauth;
pub mod twitter;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Post a new message and return its platform id
    ///
    /// # Errors
    ///
    /// - `PlatformError::Authentication` if the session credentials are rejected
    /// - `PlatformError::RateLimit` if the service is throttling
    /// - `PlatformError::Network` for transport or server-side failures
    /// - `PlatformError::Api` for any other rejection
    async fn publish(&self, text: &str) -> PlatformResult<String>;

    /// List the most recent `count` posts of `account`, newest first
    ///
    /// # Errors
    ///
    /// Same variants as [`Platform::publish`].
    async fn list_recent(&self, account: &str, count: u32) -> PlatformResult<Vec<RecentPost>>;

    /// Lowercase platform identifier (e.g., "twitter")
    fn name(&self) -> &str;
}

/// Map an HTTP status from the posting service to a PlatformError
pub(crate) fn error_for_status(status: u16, context: &str, body: &str) -> PlatformError {
    let detail = if body.is_empty() {
        format!("{} (HTTP {})", context, status)
    } else {
        format!("{} (HTTP {}): {}", context, status, body)
    };

    match status {
        401 | 403 => PlatformError::Authentication(detail),
        429 => PlatformError::RateLimit(detail),
        500..=599 => PlatformError::Network(detail),
        _ => PlatformError::Api(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status(401, "publish", ""),
            PlatformError::Authentication(_)
        ));
        assert!(matches!(
            error_for_status(403, "publish", ""),
            PlatformError::Authentication(_)
        ));
        assert!(matches!(
            error_for_status(429, "publish", ""),
            PlatformError::RateLimit(_)
        ));
        assert!(matches!(
            error_for_status(502, "list recent", ""),
            PlatformError::Network(_)
        ));
        assert!(matches!(
            error_for_status(400, "publish", ""),
            PlatformError::Api(_)
        ));
    }

    #[test]
    fn test_error_for_status_includes_body() {
        let err = error_for_status(403, "publish", r#"{"errors":[{"code":187}]}"#);
        let message = err.to_string();
        assert!(message.contains("HTTP 403"));
        assert!(message.contains("187"));
    }
}
