//! Credential resolution for the posting service
//!
//! The four OAuth credentials are looked up by name through a [`SecretSource`]:
//!
//! - `SsmSecretSource`: AWS SSM Parameter Store with decryption (production)
//! - `EnvSecretSource`: process environment variables (local runs)
//! - `MemorySecretSource`: fixed in-memory values (tests, embedding)
//!
//! The source is chosen once from [`RunMode`] by [`secret_source_for`], and
//! [`CredentialResolver`] turns the configured names into [`Credentials`],
//! refusing empty values before anything talks to the network.
//!
//! # Example
//!
//! ```no_run
//! use libjokecast::config::CredentialNames;
//! use libjokecast::credentials::{CredentialResolver, EnvSecretSource};
//!
//! # async fn example() -> libjokecast::Result<()> {
//! let source = EnvSecretSource::new();
//! let credentials = CredentialResolver::new(&source)
//!     .resolve(&CredentialNames::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::config::{CredentialNames, CredentialsConfig, RunMode};
use crate::error::{CredentialError, Result, SecretError};
use crate::types::Credentials;

/// A named-secret lookup
///
/// Implementations return the plaintext value for `name`. They do not judge
/// the value: an empty string is a successful lookup, and rejecting it is the
/// resolver's job.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Look up a secret by name
    ///
    /// # Errors
    ///
    /// - `SecretError::NotFound` if nothing is stored under `name`
    /// - `SecretError::AccessDenied` if the caller may not read it
    /// - `SecretError::Backend` for any other store failure
    async fn resolve(&self, name: &str) -> std::result::Result<String, SecretError>;

    /// Short backend identifier for logs
    fn backend_name(&self) -> &str;
}

/// Environment-variable backed secrets
///
/// The secret name is the variable name. An unset variable reads as an empty
/// value, so the resolver reports it as a missing credential.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretSource;

impl EnvSecretSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecretSource for EnvSecretSource {
    async fn resolve(&self, name: &str) -> std::result::Result<String, SecretError> {
        match std::env::var(name) {
            Ok(value) => Ok(value),
            Err(std::env::VarError::NotPresent) => Ok(String::new()),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::Backend(format!(
                "{} is not valid unicode",
                name
            ))),
        }
    }

    fn backend_name(&self) -> &str {
        "env"
    }
}

/// In-memory secrets with a lookup counter
#[derive(Debug, Default)]
pub struct MemorySecretSource {
    values: HashMap<String, String>,
    denied: Vec<String>,
    lookups: AtomicUsize,
}

impl MemorySecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    /// Make lookups of `name` fail with `AccessDenied`
    pub fn deny(mut self, name: &str) -> Self {
        self.denied.push(name.to_string());
        self
    }

    /// A source holding all four default credential names
    pub fn with_credentials(names: &CredentialNames, values: [&str; 4]) -> Self {
        Self::new()
            .with(&names.consumer_key, values[0])
            .with(&names.consumer_secret, values[1])
            .with(&names.access_key, values[2])
            .with(&names.access_secret, values[3])
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretSource for MemorySecretSource {
    async fn resolve(&self, name: &str) -> std::result::Result<String, SecretError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.denied.iter().any(|d| d == name) {
            return Err(SecretError::AccessDenied(name.to_string()));
        }

        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// AWS SSM Parameter Store backed secrets
///
/// Parameters are read with decryption, so `SecureString` values come back
/// in plaintext.
pub struct SsmSecretSource {
    client: aws_sdk_ssm::Client,
    timeout: Duration,
}

impl SsmSecretSource {
    pub fn new(client: aws_sdk_ssm::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Build a client from the default AWS provider chain
    ///
    /// `region` overrides whatever the provider chain would pick.
    pub async fn from_env(region: Option<String>, timeout: Duration) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_sdk_ssm::config::Region::new(region));
        }
        let shared = loader.load().await;
        Self::new(aws_sdk_ssm::Client::new(&shared), timeout)
    }
}

#[async_trait]
impl SecretSource for SsmSecretSource {
    async fn resolve(&self, name: &str) -> std::result::Result<String, SecretError> {
        let request = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send();

        let output = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                SecretError::Backend(format!(
                    "timed out after {:?} reading parameter {}",
                    self.timeout, name
                ))
            })?
            .map_err(|e| map_ssm_error(name, e))?;

        debug!("Resolved parameter {} from SSM", name);

        Ok(output
            .parameter()
            .and_then(|p| p.value())
            .unwrap_or_default()
            .to_string())
    }

    fn backend_name(&self) -> &str {
        "ssm"
    }
}

/// Map SSM SDK errors to SecretError
fn map_ssm_error(
    name: &str,
    error: aws_sdk_ssm::error::SdkError<
        aws_sdk_ssm::operation::get_parameter::GetParameterError,
    >,
) -> SecretError {
    use aws_sdk_ssm::error::ProvideErrorMetadata;

    if let Some(service_error) = error.as_service_error() {
        if service_error.is_parameter_not_found() {
            return SecretError::NotFound(name.to_string());
        }
        if service_error.code() == Some("AccessDeniedException") {
            return SecretError::AccessDenied(format!(
                "{}: {}",
                name,
                service_error.message().unwrap_or("access denied")
            ));
        }
    }

    SecretError::Backend(format!(
        "{}: {}",
        name,
        aws_sdk_ssm::error::DisplayErrorContext(&error)
    ))
}

/// Build the secret source for a run mode
pub async fn secret_source_for(config: &CredentialsConfig) -> Result<Box<dyn SecretSource>> {
    let timeout = config.request_timeout()?;
    let source: Box<dyn SecretSource> = match config.mode {
        RunMode::Production => {
            Box::new(SsmSecretSource::from_env(config.region.clone(), timeout).await)
        }
        RunMode::Development => Box::new(EnvSecretSource::new()),
    };
    debug!("Using {} secret source", source.backend_name());
    Ok(source)
}

/// Resolves the four posting credentials from a secret source
pub struct CredentialResolver<'a> {
    source: &'a dyn SecretSource,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(source: &'a dyn SecretSource) -> Self {
        Self { source }
    }

    /// Resolve consumer key, consumer secret, access key and access secret
    ///
    /// Lookups happen in that order and stop at the first failure.
    ///
    /// # Errors
    ///
    /// - `CredentialError::SecretStoreUnavailable` if a lookup fails
    /// - `CredentialError::MissingCredential` if a value is empty
    pub async fn resolve(&self, names: &CredentialNames) -> Result<Credentials> {
        let consumer_key = self.resolve_one("consumer key", &names.consumer_key).await?;
        let consumer_secret = self
            .resolve_one("consumer secret", &names.consumer_secret)
            .await?;
        let access_key = self.resolve_one("access key", &names.access_key).await?;
        let access_secret = self.resolve_one("access secret", &names.access_secret).await?;

        Ok(Credentials::new(
            consumer_key,
            consumer_secret,
            access_key,
            access_secret,
        ))
    }

    async fn resolve_one(&self, label: &str, name: &str) -> Result<String> {
        let value = self.source.resolve(name).await.map_err(|source| {
            CredentialError::SecretStoreUnavailable {
                name: name.to_string(),
                source,
            }
        })?;

        if value.is_empty() {
            return Err(CredentialError::MissingCredential(label.to_string()).into());
        }

        debug!(
            "Resolved {} from {} source",
            label,
            self.source.backend_name()
        );
        Ok(value)
    }
}
