//! Mock platform implementation for testing
//!
//! This module provides a configurable mock posting service that can simulate
//! a pre-existing timeline, publish failures, and history outages. It is
//! designed for integration tests that drive the whole pipeline without
//! credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::PlatformError;
use crate::platforms::{Platform, PlatformResult};
use crate::types::RecentPost;

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock-twitter")
    pub name: String,

    /// Timeline, most recent first
    pub history: Arc<Mutex<Vec<RecentPost>>>,

    /// Whether publishing should succeed
    pub publish_succeeds: bool,

    /// Error to return on publish failure
    pub publish_error: Option<PlatformError>,

    /// Error to return when listing recent posts
    pub history_error: Option<PlatformError>,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Number of times list_recent has been called
    pub list_call_count: Arc<Mutex<usize>>,

    /// Posts that have been made (for verification)
    pub posted_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            history: Arc::new(Mutex::new(Vec::new())),
            publish_succeeds: true,
            publish_error: None,
            history_error: None,
            publish_call_count: Arc::new(Mutex::new(0)),
            list_call_count: Arc::new(Mutex::new(0)),
            posted_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
///
/// Clones share counters and history, so a test can keep a handle while the
/// service owns another.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform with an empty timeline that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform whose timeline already holds `texts`, newest first
    pub fn with_history(name: &str, texts: &[&str]) -> Self {
        let history = texts.iter().map(|t| RecentPost::new(*t)).collect();
        Self::new(MockConfig {
            name: name.to_string(),
            history: Arc::new(Mutex::new(history)),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails publishing
    pub fn publish_failure(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            publish_succeeds: false,
            publish_error: Some(error),
            ..Default::default()
        })
    }

    /// Create a mock platform whose timeline cannot be read
    pub fn history_failure(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            history_error: Some(error),
            ..Default::default()
        })
    }

    /// Get the number of times publish was called
    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Get the number of times list_recent was called
    pub fn list_call_count(&self) -> usize {
        *self.config.list_call_count.lock().unwrap()
    }

    /// Get all content that was posted
    pub fn posted_content(&self) -> Vec<String> {
        self.config.posted_content.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn publish(&self, text: &str) -> PlatformResult<String> {
        *self.config.publish_call_count.lock().unwrap() += 1;

        if !self.config.publish_succeeds {
            return Err(self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| PlatformError::Api("Mock publish failed".to_string())));
        }

        self.config
            .posted_content
            .lock()
            .unwrap()
            .push(text.to_string());

        // Newest first, like a real timeline
        self.config.history.lock().unwrap().insert(
            0,
            RecentPost {
                text: text.to_string(),
                posted_at: Some(chrono::Utc::now()),
            },
        );

        Ok(format!("mock-{}", uuid::Uuid::new_v4()))
    }

    async fn list_recent(&self, _account: &str, count: u32) -> PlatformResult<Vec<RecentPost>> {
        *self.config.list_call_count.lock().unwrap() += 1;

        if let Some(error) = &self.config.history_error {
            return Err(error.clone());
        }

        let history = self.config.history.lock().unwrap();
        Ok(history.iter().take(count as usize).cloned().collect())
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
