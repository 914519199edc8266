//! Jokecast - post a fresh dad joke on every scheduled trigger
//!
//! This library provides the pipeline behind `jokecast-send`: resolve posting
//! credentials from a secrets store, acquire a joke that has not been posted
//! recently, and publish it.

pub mod config;
pub mod credentials;
pub mod error;
pub mod jokes;
pub mod logging;
pub mod platforms;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::{Config, RunMode};
pub use credentials::{CredentialResolver, SecretSource};
pub use error::{JokecastError, Result};
pub use jokes::JokeSource;
pub use platforms::Platform;
pub use service::{handle_invocation, JokecastService};
pub use types::{format_tweet, Credentials, Delivery, Joke, RecentPost};
