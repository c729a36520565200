//! Verification of the `SignatureCEK` request header.
//!
//! Clova signs every request body with RSA-SHA256 and sends the base64
//! encoded signature in `SignatureCEK`. Extensions check it against the
//! public key Clova publishes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Public};
use openssl::sign::Verifier;
use tracing::{info, warn};

use crate::{Config, Error, Result};

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "SignatureCEK";

/// Checks request bodies against Clova's signing key.
pub enum SignatureVerifier {
    /// Debug mode: every request is accepted.
    Disabled,
    PublicKey(PKey<Public>),
}

impl SignatureVerifier {
    /// Build a verifier from a PEM encoded public key.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let key = PKey::public_key_from_pem(pem)
            .map_err(|e| Error::Config(format!("Invalid signature public key: {}", e)))?;
        Ok(SignatureVerifier::PublicKey(key))
    }

    /// Build the verifier described by the configuration, downloading the
    /// key when none is configured.
    pub async fn from_config(config: &Config, http: &reqwest::Client) -> Result<Self> {
        if config.debug_mode {
            warn!("Debug mode enabled, request signatures will not be verified");
            return Ok(SignatureVerifier::Disabled);
        }

        if let Some(pem) = &config.signature_public_key {
            return Self::from_pem(pem.as_bytes());
        }

        info!("Fetching signature public key from {}", config.signature_key_url);
        let response = http
            .get(&config.signature_key_url)
            .send()
            .await
            .map_err(|e| Error::Config(format!("Failed to fetch signature key: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Config(format!(
                "Failed to fetch signature key: {}",
                response.status()
            )));
        }

        let pem = response
            .bytes()
            .await
            .map_err(|e| Error::Config(format!("Failed to read signature key: {}", e)))?;

        Self::from_pem(&pem)
    }

    /// Verify `body` against the base64 `signature` header value.
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<()> {
        let key = match self {
            SignatureVerifier::Disabled => return Ok(()),
            SignatureVerifier::PublicKey(key) => key,
        };

        let signature = signature
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Signature(format!("Missing {} header", SIGNATURE_HEADER)))?;

        let signature = STANDARD
            .decode(signature.trim())
            .map_err(|e| Error::Signature(format!("Signature is not base64: {}", e)))?;

        let mut verifier = Verifier::new(MessageDigest::sha256(), key)
            .map_err(|e| Error::Internal(format!("Failed to create verifier: {}", e)))?;
        verifier
            .update(body)
            .map_err(|e| Error::Internal(format!("Failed to hash body: {}", e)))?;

        match verifier.verify(&signature) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::Signature("Signature does not match body".to_string())),
            Err(e) => Err(Error::Signature(format!("Malformed signature: {}", e))),
        }
    }
}
