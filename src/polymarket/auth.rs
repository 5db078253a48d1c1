//! HMAC request signing for the CLOB API

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{MirrorError, Result};
use crate::config::types::ApiCredentials;

type HmacSha256 = Hmac<Sha256>;

/// Signs CLOB requests with the L2 API credential set.
#[derive(Debug, Clone)]
pub struct ClobSigner {
    credentials: ApiCredentials,
}

impl ClobSigner {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self { credentials }
    }

    /// Produce the header set for one request. The signed message is
    /// `timestamp + METHOD + path + body` keyed by the base64 secret.
    pub fn headers(&self, method: &str, request_path: &str, body: &str) -> Result<AuthHeaders> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(timestamp, method, request_path, body)?;

        Ok(AuthHeaders {
            api_key: self.credentials.api_key.clone(),
            signature,
            timestamp,
            passphrase: self.credentials.passphrase.clone(),
        })
    }

    fn sign(&self, timestamp: i64, method: &str, request_path: &str, body: &str) -> Result<String> {
        let secret_bytes = BASE64.decode(&self.credentials.api_secret).map_err(|e| {
            MirrorError::Configuration(format!("API secret is not valid base64: {}", e))
        })?;

        let message = format!(
            "{}{}{}{}",
            timestamp,
            method.to_uppercase(),
            request_path,
            body
        );

        let mut mac = HmacSha256::new_from_slice(&secret_bytes)
            .map_err(|e| MirrorError::Configuration(format!("failed to create HMAC: {}", e)))?;
        mac.update(message.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

/// Authentication headers for CLOB API requests
#[derive(Debug, Clone)]
pub struct AuthHeaders {
    pub api_key: String,
    pub signature: String,
    pub timestamp: i64,
    pub passphrase: String,
}

impl AuthHeaders {
    /// Add the headers to a reqwest RequestBuilder
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("POLY_API_KEY", &self.api_key)
            .header("POLY_SIGNATURE", &self.signature)
            .header("POLY_TIMESTAMP", self.timestamp.to_string())
            .header("POLY_PASSPHRASE", &self.passphrase)
    }
}
