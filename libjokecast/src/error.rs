//! Error types for Jokecast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, JokecastError>;

/// Status reported to the invoking harness when publishing fails
pub const FAILED_TO_SEND: &str = "Failed to send";

#[derive(Error, Debug)]
pub enum JokecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Joke error: {0}")]
    Joke(#[from] JokeError),

    #[error("No usable joke after {attempts} attempts (last: {last})")]
    ExhaustedRetries { attempts: u32, last: JokeError },

    #[error("Post history unavailable: {0}")]
    HistoryUnavailable(#[source] PlatformError),

    #[error("Publish failed: {0}")]
    PublishFailed(#[source] PlatformError),
}

impl JokecastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            JokecastError::Config(_) => 3,
            JokecastError::Credential(_) => 2,
            JokecastError::Joke(_)
            | JokecastError::ExhaustedRetries { .. }
            | JokecastError::HistoryUnavailable(_)
            | JokecastError::PublishFailed(_) => 1,
        }
    }

    /// Whether the acquisition loop may absorb this error and fetch again
    pub fn is_transient(&self) -> bool {
        matches!(self, JokecastError::Joke(_))
    }

    /// Short status string for the invoking harness, if the failure has one
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            JokecastError::PublishFailed(_) => Some(FAILED_TO_SEND),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Missing credential: {0} resolved to an empty value")]
    MissingCredential(String),

    #[error("Secret store unavailable while resolving {name}: {source}")]
    SecretStoreUnavailable {
        name: String,
        #[source]
        source: SecretError,
    },
}

/// Failure of a single secret lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Secret backend error: {0}")]
    Backend(String),
}

/// Reasons a single acquisition attempt is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JokeError {
    #[error("Failed to fetch joke: {0}")]
    Fetch(String),

    #[error("Joke {id} has empty text")]
    EmptyText { id: String },

    #[error("Joke was posted recently: {text}")]
    Duplicate { text: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),
}
