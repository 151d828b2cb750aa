// src/services/oauth.rs

//! OAuth 1.0a request signing (HMAC-SHA1) for the social endpoint.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

/// Consumer and access-token credentials for a user-context request.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl OAuthCredentials {
    /// Read credentials from `X_API_KEY`, `X_API_SECRET`, `X_ACCESS_TOKEN` and
    /// `X_ACCESS_TOKEN_SECRET`. Returns `None` unless all four are set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            consumer_key: var("X_API_KEY")?,
            consumer_secret: var("X_API_SECRET")?,
            access_token: var("X_ACCESS_TOKEN")?,
            access_token_secret: var("X_ACCESS_TOKEN_SECRET")?,
        })
    }

    /// `Authorization` header value for a request whose body is not
    /// form-encoded (only the oauth parameters are signed).
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        nonce: &str,
        timestamp: i64,
    ) -> Option<String> {
        let mut params = BTreeMap::new();
        params.insert("oauth_consumer_key".to_string(), self.consumer_key.clone());
        params.insert("oauth_nonce".to_string(), nonce.to_string());
        params.insert("oauth_signature_method".to_string(), "HMAC-SHA1".to_string());
        params.insert("oauth_timestamp".to_string(), timestamp.to_string());
        params.insert("oauth_token".to_string(), self.access_token.clone());
        params.insert("oauth_version".to_string(), "1.0".to_string());

        let signature = sign(
            method,
            url,
            &params,
            &self.consumer_secret,
            &self.access_token_secret,
        )?;
        params.insert("oauth_signature".to_string(), signature);

        let fields: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect();
        Some(format!("OAuth {}", fields.join(", ")))
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("access_token", &self.access_token)
            .finish_non_exhaustive()
    }
}

/// Base64 HMAC-SHA1 signature over the OAuth signature base string.
pub fn sign(
    method: &str,
    url: &str,
    params: &BTreeMap<String, String>,
    consumer_secret: &str,
    token_secret: &str,
) -> Option<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    );
    let signing_key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes()).ok()?;
    mac.update(base_string.as_bytes());
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// RFC 3986 unreserved characters stay as-is: `A-Z a-z 0-9 - . _ ~`.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// RFC 3986 percent-encoding of UTF-8 text with uppercase hex digits.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}
