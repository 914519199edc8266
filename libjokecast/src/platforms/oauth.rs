//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Builds the `Authorization: OAuth ...` header for user-context requests.
//! Every request parameter (query string and form body) takes part in the
//! signature, so callers must pass exactly the parameters they send.

use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::error::PlatformError;
use crate::platforms::PlatformResult;
use crate::types::Credentials;

/// RFC 3986 unreserved characters pass through, everything else is escaped
const OAUTH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE).to_string()
}

/// Join `key=value` pairs with `&`, percent-encoding both sides
pub fn encode_pairs(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the signature base string
///
/// `url` must not carry a query string; query parameters belong in `params`.
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

pub struct OAuthSigner {
    consumer_key: SecretString,
    access_key: SecretString,
    signing_key: Zeroizing<String>,
}

impl OAuthSigner {
    pub fn new(credentials: &Credentials) -> Self {
        let signing_key = Zeroizing::new(format!(
            "{}&{}",
            percent_encode(credentials.consumer_secret.expose_secret()),
            percent_encode(credentials.access_secret.expose_secret())
        ));

        Self {
            consumer_key: SecretString::from(credentials.consumer_key.expose_secret().to_string()),
            access_key: SecretString::from(credentials.access_key.expose_secret().to_string()),
            signing_key,
        }
    }

    /// Authorization header for a request with a fresh nonce and timestamp
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> PlatformResult<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        self.authorization_header_with(method, url, params, &nonce, &timestamp)
    }

    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> PlatformResult<String> {
        let oauth_params = [
            ("oauth_consumer_key", self.consumer_key.expose_secret()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.access_key.expose_secret()),
            ("oauth_version", "1.0"),
        ];

        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.extend_from_slice(&oauth_params);
        let signature = self.sign(&signature_base_string(method, url, &all_params))?;

        let header = oauth_params
            .iter()
            .copied()
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }

    fn sign(&self, base_string: &str) -> PlatformResult<String> {
        let mut mac = Hmac::<Sha1>::new_from_slice(self.signing_key.as_bytes())
            .map_err(|e| PlatformError::Authentication(format!("Invalid signing key: {}", e)))?;
        mac.update(base_string.as_bytes());
        Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}
