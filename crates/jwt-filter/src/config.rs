//! Configuration schema (§6) and its validated, in-memory form (C8).

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::jwk::PublicKey;

/// Raw configuration as it appears on the wire (§6).
#[derive(Debug, Deserialize)]
struct RawConfig {
    iss: String,
    #[serde(default)]
    aud: Vec<String>,
    #[serde(default)]
    keys: Vec<Value>,
    jwks_api_cluster: Option<String>,
    jwks_api_path: Option<String>,
    #[serde(default = "default_refresh_delay_ms")]
    jwks_refresh_delay_ms: u64,
}

fn default_refresh_delay_ms() -> u64 {
    60_000
}

/// Where the filter sources key material from.
pub enum KeySource {
    /// Static mode: keys are fixed at startup; the refresher never runs.
    Static(HashMap<String, PublicKey>),
    /// Polling mode: fetch `jwks_path` on `cluster` on the schedule in §4.5.
    Jwks { cluster: String, path: String },
}

/// Resolved, read-only configuration (§3 "Configuration").
pub struct FilterConfig {
    pub allowed_issuer: String,
    pub allowed_audiences: Vec<String>,
    pub key_source: KeySource,
    pub refresh_interval: Duration,
}

impl FilterConfig {
    /// Parse and validate the JSON schema in §6, rejecting every configuration
    /// listed there as rejected.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(raw)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.iss.is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }

        let key_source = if !raw.keys.is_empty() {
            let mut keys = HashMap::with_capacity(raw.keys.len());
            for (index, jwk) in raw.keys.iter().enumerate() {
                let (kid, key) =
                    crate::jwk::import(jwk).map_err(|source| ConfigError::StaticKeyImport { index, source })?;
                keys.insert(kid, key);
            }
            KeySource::Static(keys)
        } else {
            let cluster = raw.jwks_api_cluster.ok_or(ConfigError::NoKeySource)?;
            let path = raw.jwks_api_path.ok_or(ConfigError::NoKeySource)?;
            if path.is_empty() {
                return Err(ConfigError::EmptyJwksPath);
            }
            KeySource::Jwks { cluster, path }
        };

        Ok(Self {
            allowed_issuer: raw.iss,
            allowed_audiences: raw.aud,
            key_source,
            refresh_interval: Duration::from_millis(raw.jwks_refresh_delay_ms),
        })
    }
}
