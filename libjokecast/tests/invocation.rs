//! End-to-end tests for a single invocation
//!
//! Drives `handle_invocation` with in-memory secrets, a scripted joke source
//! and the mock posting service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use libjokecast::config::CredentialNames;
use libjokecast::credentials::MemorySecretSource;
use libjokecast::error::{CredentialError, JokeError, PlatformError, SecretError};
use libjokecast::jokes::MockJokeSource;
use libjokecast::platforms::mock::MockPlatform;
use libjokecast::{handle_invocation, Config, Delivery, JokecastError, Result};

const VALID: [&str; 4] = ["consumer-key", "consumer-secret", "access-key", "access-secret"];

fn test_config() -> Config {
    let mut config = Config::default();
    config.twitter.screen_name = "dadjokebot".to_string();
    config
}

fn secrets(values: [&str; 4]) -> MemorySecretSource {
    MemorySecretSource::with_credentials(&CredentialNames::default(), values)
}

/// Run one invocation and report how often the session was built
async fn invoke(
    config: &Config,
    secrets: &MemorySecretSource,
    jokes: &MockJokeSource,
    platform: &MockPlatform,
) -> (Result<Delivery>, usize) {
    let connects = AtomicUsize::new(0);
    let result = handle_invocation(config, secrets, Arc::new(jokes.clone()), |_| {
        connects.fetch_add(1, Ordering::SeqCst);
        Ok(platform.clone())
    })
    .await;
    (result, connects.load(Ordering::SeqCst))
}

#[tokio::test]
async fn test_successful_run_reports_sent() {
    let config = test_config();
    let jokes = MockJokeSource::always("I only know 25 letters of the alphabet. I don't know y.");
    let platform = MockPlatform::with_history("mock", &["Something else #pun #dadjoke"]);

    let (result, connects) = invoke(&config, &secrets(VALID), &jokes, &platform).await;

    let delivery = result.unwrap();
    assert_eq!(delivery.status(), "Sent!");
    assert_eq!(connects, 1);
    assert_eq!(
        platform.posted_content(),
        vec!["I only know 25 letters of the alphabet. I don't know y. #pun #dadjoke".to_string()]
    );
}

#[tokio::test]
async fn test_any_empty_credential_stops_before_network() {
    for empty in 0..4 {
        let mut values = VALID;
        values[empty] = "";

        let config = test_config();
        let jokes = MockJokeSource::always("joke");
        let platform = MockPlatform::success("mock");

        let (result, connects) = invoke(&config, &secrets(values), &jokes, &platform).await;

        assert!(
            matches!(
                result,
                Err(JokecastError::Credential(CredentialError::MissingCredential(_)))
            ),
            "credential {} empty: {:?}",
            empty,
            result
        );
        assert_eq!(result.unwrap_err().exit_code(), 2);
        assert_eq!(connects, 0);
        assert_eq!(jokes.fetch_count(), 0);
        assert_eq!(platform.list_call_count(), 0);
        assert_eq!(platform.publish_call_count(), 0);
    }
}

#[tokio::test]
async fn test_unreadable_secret_store_stops_before_network() {
    let names = CredentialNames::default();
    let secrets = secrets(VALID).deny(&names.access_key);
    let jokes = MockJokeSource::always("joke");
    let platform = MockPlatform::success("mock");

    let (result, connects) = invoke(&test_config(), &secrets, &jokes, &platform).await;

    match result {
        Err(JokecastError::Credential(CredentialError::SecretStoreUnavailable { name, source })) => {
            assert_eq!(name, names.access_key);
            assert!(matches!(source, SecretError::AccessDenied(_)));
        }
        other => panic!("Expected SecretStoreUnavailable, got {:?}", other),
    }
    assert_eq!(connects, 0);
    assert_eq!(jokes.fetch_count(), 0);
}

#[tokio::test]
async fn test_empty_jokes_are_retried_until_valid() {
    let mut config = test_config();
    config.jokes.max_tries = 5;
    let jokes = MockJokeSource::texts(&["", "", "What do you call a fake noodle? An impasta."]);
    let platform = MockPlatform::success("mock");

    let (result, _) = invoke(&config, &secrets(VALID), &jokes, &platform).await;

    let delivery = result.unwrap();
    assert_eq!(jokes.fetch_count(), 3);
    assert_eq!(delivery.attempts, 3);
    assert_eq!(
        delivery.text,
        "What do you call a fake noodle? An impasta. #pun #dadjoke"
    );
    assert_eq!(platform.publish_call_count(), 1);
}

#[tokio::test]
async fn test_only_duplicates_exhausts_retries_without_publishing() {
    let config = test_config();
    let jokes = MockJokeSource::always("Why did the chicken cross the road?");
    let platform = MockPlatform::with_history(
        "mock",
        &[
            "Why did the chicken cross the road? #pun #dadjoke",
            "I'm reading a book about anti-gravity. It's impossible to put down! #pun #dadjoke",
        ],
    );

    let (result, _) = invoke(&config, &secrets(VALID), &jokes, &platform).await;

    match result {
        Err(JokecastError::ExhaustedRetries { attempts, last }) => {
            assert_eq!(attempts, config.jokes.max_tries);
            assert_eq!(
                last,
                JokeError::Duplicate {
                    text: "Why did the chicken cross the road?".to_string()
                }
            );
        }
        other => panic!("Expected ExhaustedRetries, got {:?}", other),
    }
    assert_eq!(jokes.fetch_count(), config.jokes.max_tries as usize);
    assert_eq!(platform.publish_call_count(), 0);
}

#[tokio::test]
async fn test_candidate_is_compared_in_formatted_form() {
    let config = test_config();
    let jokes = MockJokeSource::texts(&[
        "Why did the chicken cross the road?",
        "To get to the other side.",
    ]);
    let platform = MockPlatform::with_history(
        "mock",
        &["Why did the chicken cross the road? #pun #dadjoke"],
    );

    let (result, _) = invoke(&config, &secrets(VALID), &jokes, &platform).await;

    assert_eq!(result.unwrap().text, "To get to the other side. #pun #dadjoke");
    assert_eq!(jokes.fetch_count(), 2);
}

#[tokio::test]
async fn test_publish_failure_reports_failed_to_send() {
    let config = test_config();
    let jokes = MockJokeSource::always("A joke that will not make it");
    let platform = MockPlatform::publish_failure(
        "mock",
        PlatformError::Authentication("Invalid or expired token".to_string()),
    );

    let (result, _) = invoke(&config, &secrets(VALID), &jokes, &platform).await;

    let err = result.unwrap_err();
    assert_eq!(err.status_message(), Some("Failed to send"));
    assert!(err.to_string().contains("Invalid or expired token"));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(platform.publish_call_count(), 1);
}

#[tokio::test]
async fn test_history_outage_is_fatal() {
    let config = test_config();
    let jokes = MockJokeSource::always("joke");
    let platform =
        MockPlatform::history_failure("mock", PlatformError::RateLimit("try later".to_string()));

    let (result, _) = invoke(&config, &secrets(VALID), &jokes, &platform).await;

    let err = result.unwrap_err();
    assert!(matches!(err, JokecastError::HistoryUnavailable(_)));
    assert_eq!(err.status_message(), None);
    assert_eq!(jokes.fetch_count(), 1);
    assert_eq!(platform.publish_call_count(), 0);
}

#[tokio::test]
async fn test_session_failure_is_reported_as_failed_send() {
    let config = test_config();
    let jokes = MockJokeSource::always("joke");

    let result = handle_invocation(&config, &secrets(VALID), Arc::new(jokes.clone()), |_| {
        Err::<MockPlatform, _>(PlatformError::Network("no route".to_string()))
    })
    .await;

    assert!(matches!(result, Err(JokecastError::PublishFailed(_))));
    assert_eq!(jokes.fetch_count(), 0);
}

#[tokio::test]
async fn test_consecutive_runs_do_not_repeat() {
    let config = test_config();
    let jokes = MockJokeSource::texts(&["First", "First", "Second"]);
    let platform = MockPlatform::success("mock");

    let (first, _) = invoke(&config, &secrets(VALID), &jokes, &platform).await;
    let (second, _) = invoke(&config, &secrets(VALID), &jokes, &platform).await;

    assert_eq!(first.unwrap().text, "First #pun #dadjoke");
    assert_eq!(second.unwrap().text, "Second #pun #dadjoke");
    assert_eq!(jokes.fetch_count(), 3);
}
