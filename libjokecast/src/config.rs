//! Configuration management for Jokecast
//!
//! Configuration comes from an optional TOML file overlaid with environment
//! variables. The environment is the primary surface: a scheduled run usually
//! has no config file at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Largest history window the timeline endpoint will return in one page
pub const MAX_HISTORY_WINDOW: u32 = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub jokes: JokesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    /// Account whose timeline is checked for duplicates
    #[serde(default)]
    pub screen_name: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Number of recent posts compared against each candidate
    #[serde(default = "default_history_window")]
    pub history_window: u32,
    #[serde(default = "default_request_timeout")]
    pub timeout: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            screen_name: String::new(),
            api_base: default_api_base(),
            history_window: default_history_window(),
            timeout: default_request_timeout(),
        }
    }
}

/// Where credential values come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Secrets are SSM parameter names resolved against the store
    Production,
    /// Secrets are read straight from environment variables
    #[default]
    Development,
}

impl RunMode {
    /// Anything other than "production" is a local mode
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim().to_lowercase().as_str() {
            "production" | "prod" => RunMode::Production,
            _ => RunMode::Development,
        }
    }
}

/// Identifiers of the four posting credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialNames {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_key: String,
    pub access_secret: String,
}

impl Default for CredentialNames {
    fn default() -> Self {
        Self {
            consumer_key: "TWITTER_CONSUMER_KEY".to_string(),
            consumer_secret: "TWITTER_CONSUMER_SECRET".to_string(),
            access_key: "TWITTER_ACCESS_KEY".to_string(),
            access_secret: "TWITTER_ACCESS_SECRET".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default)]
    pub names: CredentialNames,
    /// Region override for the secrets store
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub timeout: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            names: CredentialNames::default(),
            region: None,
            timeout: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JokesConfig {
    #[serde(default = "default_joke_endpoint")]
    pub endpoint: String,
    /// Fetch attempts before giving up on this run
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,
    #[serde(default = "default_fetch_timeout")]
    pub timeout: String,
    #[serde(default = "default_true")]
    pub check_duplicates: bool,
}

impl Default for JokesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_joke_endpoint(),
            max_tries: default_max_tries(),
            timeout: default_fetch_timeout(),
            check_duplicates: true,
        }
    }
}

fn default_api_base() -> String {
    "https://api.twitter.com/1.1".to_string()
}

fn default_history_window() -> u32 {
    30
}

fn default_request_timeout() -> String {
    "5s".to_string()
}

fn default_joke_endpoint() -> String {
    "https://icanhazdadjoke.com/".to_string()
}

fn default_max_tries() -> u32 {
    5
}

fn default_fetch_timeout() -> String {
    "2s".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the default locations and the environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("JOKECAST_CONFIG") {
            Ok(path) => Self::load_from_path(&PathBuf::from(shellexpand::tilde(&path).to_string()))?,
            Err(_) => match default_config_path() {
                Some(path) if path.exists() => Self::load_from_path(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Overlay values from an environment lookup
    ///
    /// In production the `TWITTER_*` credential variables hold secret-store
    /// parameter names. In other modes they hold the secrets themselves, so the
    /// identifiers are left pointing at the variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(flag) = lookup("ENVIRONMENT") {
            self.credentials.mode = RunMode::from_flag(&flag);
        }

        if self.credentials.mode == RunMode::Production {
            let names = &mut self.credentials.names;
            for (key, slot) in [
                ("TWITTER_CONSUMER_KEY", &mut names.consumer_key),
                ("TWITTER_CONSUMER_SECRET", &mut names.consumer_secret),
                ("TWITTER_ACCESS_KEY", &mut names.access_key),
                ("TWITTER_ACCESS_SECRET", &mut names.access_secret),
            ] {
                if let Some(value) = lookup(key) {
                    *slot = value;
                }
            }
        }

        if let Some(region) = lookup("JOKECAST_AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION")) {
            if !region.is_empty() {
                self.credentials.region = Some(region);
            }
        }

        if let Some(name) = lookup("TWITTER_SCREEN_NAME") {
            self.twitter.screen_name = name;
        }
        if let Some(base) = lookup("TWITTER_API_BASE") {
            self.twitter.api_base = base;
        }
        if let Some(window) = lookup("JOKECAST_HISTORY_WINDOW") {
            self.twitter.history_window = parse_number("JOKECAST_HISTORY_WINDOW", &window)?;
        }
        if let Some(timeout) = lookup("JOKECAST_REQUEST_TIMEOUT") {
            self.twitter.timeout = timeout.clone();
            self.credentials.timeout = timeout;
        }

        if let Some(endpoint) = lookup("JOKECAST_JOKE_ENDPOINT") {
            self.jokes.endpoint = endpoint;
        }
        if let Some(tries) = lookup("JOKECAST_MAX_TRIES") {
            self.jokes.max_tries = parse_number("JOKECAST_MAX_TRIES", &tries)?;
        }
        if let Some(timeout) = lookup("JOKECAST_FETCH_TIMEOUT") {
            self.jokes.timeout = timeout;
        }
        if let Some(flag) = lookup("JOKECAST_CHECK_DUPLICATES") {
            self.jokes.check_duplicates = parse_bool("JOKECAST_CHECK_DUPLICATES", &flag)?;
        }

        Ok(())
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.jokes.max_tries == 0 {
            return Err(invalid("jokes.max_tries", "must be at least 1"));
        }

        if self.twitter.history_window == 0 || self.twitter.history_window > MAX_HISTORY_WINDOW {
            return Err(invalid(
                "twitter.history_window",
                &format!("must be between 1 and {}", MAX_HISTORY_WINDOW),
            ));
        }

        if self.jokes.check_duplicates && self.twitter.screen_name.trim().is_empty() {
            return Err(ConfigError::MissingField("twitter.screen_name".to_string()).into());
        }

        if self.jokes.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("jokes.endpoint".to_string()).into());
        }

        self.jokes.fetch_timeout()?;
        self.twitter.request_timeout()?;
        self.credentials.request_timeout()?;
        Ok(())
    }
}

impl JokesConfig {
    pub fn fetch_timeout(&self) -> Result<Duration> {
        parse_duration("jokes.timeout", &self.timeout)
    }
}

impl TwitterConfig {
    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration("twitter.timeout", &self.timeout)
    }
}

impl CredentialsConfig {
    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration("credentials.timeout", &self.timeout)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jokecast").join("config.toml"))
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).map_err(|e| invalid(field, &e.to_string()))
}

fn parse_number(field: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(field, &format!("'{}' is not a positive integer", value)))
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(field, &format!("'{}' is not a boolean", value))),
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::JokecastError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
