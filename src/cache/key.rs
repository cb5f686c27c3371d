//! Cache key generation.

use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Deterministic digest of a request's semantic content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Fingerprints a request as SHA-256 over a canonical serialization of
/// `{model, temperature, messages}`.
///
/// Object keys are sorted via `BTreeMap`, the message list keeps caller
/// order, and temperature is carried at full precision, so two logically
/// identical requests hash identically across process runs while any field
/// difference produces a different digest.
pub struct CacheKeyGenerator {
    salt: Option<String>,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self { salt: None }
    }

    /// Namespace the generated keys, e.g. per deployment or per backend.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn generate(&self, messages: &[Message], model: &str, temperature: f64) -> Result<CacheKey> {
        let temperature = serde_json::Number::from_f64(temperature).ok_or_else(|| {
            Error::validation_with_context(
                "temperature must be a finite number",
                ErrorContext::new()
                    .with_field_path("request.temperature")
                    .with_source("cache_key"),
            )
        })?;
        let mut parts: BTreeMap<&str, Value> = BTreeMap::new();
        parts.insert("model", Value::String(model.to_string()));
        parts.insert("temperature", Value::Number(temperature));
        parts.insert("messages", serde_json::to_value(messages)?);
        if let Some(ref s) = self.salt {
            parts.insert("salt", Value::String(s.clone()));
        }
        let canonical = serde_json::to_string(&parts)?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();
        Ok(CacheKey::new(hash))
    }
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
