//! Service layer for Jokecast
//!
//! One invocation runs a fixed pipeline:
//!
//! 1. Resolve credentials ([`crate::credentials`])
//! 2. Acquire a joke that is non-empty and not recently posted
//!    ([`acquire::JokeAcquirer`], backed by [`history::DuplicateChecker`])
//! 3. Publish it once ([`posting::Publisher`])
//!
//! `JokecastService` covers steps 2 and 3 on an established session.
//! [`handle_invocation`] adds step 1 and builds the session only once the
//! credentials are known to be complete.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libjokecast::credentials::EnvSecretSource;
//! use libjokecast::jokes::HttpJokeSource;
//! use libjokecast::platforms::twitter::TwitterClient;
//! use libjokecast::{handle_invocation, Config};
//!
//! # async fn example() -> libjokecast::Result<()> {
//! let config = Config::load()?;
//! let secrets = EnvSecretSource::new();
//! let jokes = Arc::new(HttpJokeSource::from_config(&config.jokes)?);
//!
//! let delivery = handle_invocation(&config, &secrets, jokes, |credentials| {
//!     TwitterClient::authenticate(credentials, &config.twitter)
//! })
//! .await?;
//! println!("{}", delivery.status());
//! # Ok(())
//! # }
//! ```

pub mod acquire;
pub mod history;
pub mod posting;

use std::sync::Arc;
use tracing::info;

use self::acquire::JokeAcquirer;
use self::history::DuplicateChecker;
use self::posting::Publisher;
use crate::config::Config;
use crate::credentials::{CredentialResolver, SecretSource};
use crate::error::{JokecastError, Result};
use crate::jokes::JokeSource;
use crate::platforms::{Platform, PlatformResult};
use crate::types::{Credentials, Delivery};

/// Main service facade that coordinates acquisition and publishing
///
/// The acquirer's duplicate checker and the publisher share one session.
pub struct JokecastService {
    acquirer: JokeAcquirer,
    publisher: Publisher,
}

impl JokecastService {
    /// Wire the pipeline for one session
    ///
    /// Duplicate checking is skipped when `jokes.check_duplicates` is off.
    pub fn new(config: &Config, jokes: Arc<dyn JokeSource>, platform: Arc<dyn Platform>) -> Self {
        let checker = config.jokes.check_duplicates.then(|| {
            DuplicateChecker::new(
                Arc::clone(&platform),
                config.twitter.screen_name.clone(),
                config.twitter.history_window,
            )
        });

        Self {
            acquirer: JokeAcquirer::new(jokes, checker, config.jokes.max_tries),
            publisher: Publisher::new(platform),
        }
    }

    /// Access the acquirer
    pub fn acquirer(&self) -> &JokeAcquirer {
        &self.acquirer
    }

    /// Access the publisher
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Acquire a joke and publish it
    ///
    /// # Errors
    ///
    /// - `JokecastError::ExhaustedRetries` if no acceptable joke was found
    /// - `JokecastError::HistoryUnavailable` if the timeline could not be read
    /// - `JokecastError::PublishFailed` if the post was rejected
    pub async fn send(&self) -> Result<Delivery> {
        let acquired = self.acquirer.acquire().await?;
        let post_id = self.publisher.publish(&acquired.joke).await?;

        Ok(Delivery {
            post_id,
            text: acquired.joke.tweet_text(),
            joke_id: acquired.joke.id,
            attempts: acquired.attempts,
        })
    }
}

/// Run one complete invocation
///
/// `connect` builds the posting session from the resolved credentials. It is
/// not called unless all four credentials resolved to non-empty values, so no
/// joke or posting request is made with incomplete credentials.
///
/// # Errors
///
/// Any error of [`CredentialResolver::resolve`] or [`JokecastService::send`].
/// A session that cannot be built is reported as `PublishFailed`.
pub async fn handle_invocation<C, P>(
    config: &Config,
    secrets: &dyn SecretSource,
    jokes: Arc<dyn JokeSource>,
    connect: C,
) -> Result<Delivery>
where
    C: FnOnce(&Credentials) -> PlatformResult<P>,
    P: Platform + 'static,
{
    let credentials = CredentialResolver::new(secrets)
        .resolve(&config.credentials.names)
        .await?;

    let platform = connect(&credentials).map_err(JokecastError::PublishFailed)?;
    drop(credentials);

    let service = JokecastService::new(config, jokes, Arc::new(platform));
    let delivery = service.send().await?;

    info!(
        "Delivered joke {} after {} attempt(s)",
        delivery.joke_id, delivery.attempts
    );
    Ok(delivery)
}
