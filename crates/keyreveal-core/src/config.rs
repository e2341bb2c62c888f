//! Reveal configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ConfigError;
use keyreveal_crypto::CURRENT_VERSION;

/// Default cache time-to-live: 5 minutes.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// Default interval between cache sweeps: 60 seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

const ENV_PEPPER: &str = "KEYREVEAL_PEPPER";
const ENV_SUPPORTED_VERSION: &str = "KEYREVEAL_SUPPORTED_VERSION";
const ENV_CACHE_TTL_SECS: &str = "KEYREVEAL_CACHE_TTL_SECS";
const ENV_SWEEP_INTERVAL_SECS: &str = "KEYREVEAL_SWEEP_INTERVAL_SECS";
const ENV_CACHE_ENABLED: &str = "KEYREVEAL_CACHE_ENABLED";

/// Application-wide secret mixed into every key derivation.
/// Zeroized on drop, never printed.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Pepper(String);

impl Pepper {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pepper([redacted])")
    }
}

/// Configuration for [`crate::EncryptionFacade`].
#[derive(Clone, Debug, Deserialize)]
pub struct RevealConfig {
    /// Application pepper shared with the key service.
    pub pepper: Pepper,

    /// Envelope version tag this build can open.
    #[serde(default = "default_supported_version")]
    pub supported_version: String,

    /// Lifetime of a cached plaintext, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Interval of the background cache sweep, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Disable to force the full derive-and-decrypt path on every call.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
}

fn default_supported_version() -> String {
    CURRENT_VERSION.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

fn default_cache_enabled() -> bool {
    true
}

impl RevealConfig {
    /// Defaults for everything except the pepper.
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: Pepper::new(pepper),
            supported_version: default_supported_version(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            cache_enabled: true,
        }
    }

    /// Read `KEYREVEAL_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, secrets store, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pepper = lookup(ENV_PEPPER)
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::Missing(ENV_PEPPER))?;
        let mut config = Self::new(pepper);

        if let Some(version) = lookup(ENV_SUPPORTED_VERSION) {
            config.supported_version = version;
        }
        if let Some(ttl) = lookup(ENV_CACHE_TTL_SECS) {
            config.cache_ttl_secs = parse_secs(ENV_CACHE_TTL_SECS, &ttl)?;
        }
        if let Some(interval) = lookup(ENV_SWEEP_INTERVAL_SECS) {
            config.sweep_interval_secs = parse_secs(ENV_SWEEP_INTERVAL_SECS, &interval)?;
        }
        if let Some(enabled) = lookup(ENV_CACHE_ENABLED) {
            config.cache_enabled = parse_bool(ENV_CACHE_ENABLED, &enabled)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pepper.expose().is_empty() {
            return Err(ConfigError::Missing(ENV_PEPPER));
        }
        if self.supported_version.is_empty() {
            return Err(ConfigError::Invalid {
                key: ENV_SUPPORTED_VERSION,
                reason: "must not be empty".to_string(),
            });
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_CACHE_TTL_SECS,
                reason: "must be positive".to_string(),
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_SWEEP_INTERVAL_SECS,
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn parse_secs(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{e}"),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = RevealConfig::new("pepper");
        assert_eq!(config.supported_version, "v2");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert!(config.cache_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let config = RevealConfig::from_lookup(lookup_from(&[
            ("KEYREVEAL_PEPPER", "s3cret"),
            ("KEYREVEAL_SUPPORTED_VERSION", "v3"),
            ("KEYREVEAL_CACHE_TTL_SECS", "30"),
            ("KEYREVEAL_SWEEP_INTERVAL_SECS", " 5 "),
            ("KEYREVEAL_CACHE_ENABLED", "off"),
        ]))
        .unwrap();
        assert_eq!(config.pepper.expose(), "s3cret");
        assert_eq!(config.supported_version, "v3");
        assert_eq!(config.cache_ttl_secs, 30);
        assert_eq!(config.sweep_interval_secs, 5);
        assert!(!config.cache_enabled);
    }

    #[test]
    fn missing_pepper_rejected() {
        let err = RevealConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("KEYREVEAL_PEPPER")));

        let err = RevealConfig::from_lookup(lookup_from(&[("KEYREVEAL_PEPPER", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn zero_ttl_rejected() {
        let err = RevealConfig::from_lookup(lookup_from(&[
            ("KEYREVEAL_PEPPER", "p"),
            ("KEYREVEAL_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("KEYREVEAL_CACHE_TTL_SECS"));
    }

    #[test]
    fn garbage_number_rejected() {
        let err = RevealConfig::from_lookup(lookup_from(&[
            ("KEYREVEAL_PEPPER", "p"),
            ("KEYREVEAL_SWEEP_INTERVAL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "KEYREVEAL_SWEEP_INTERVAL_SECS",
                ..
            }
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: RevealConfig = serde_json::from_str(r#"{"pepper":"abc"}"#).unwrap();
        assert_eq!(config.pepper.expose(), "abc");
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(config.supported_version, CURRENT_VERSION);
    }

    #[test]
    fn debug_redacts_pepper() {
        let rendered = format!("{:?}", RevealConfig::new("very-secret-pepper"));
        assert!(!rendered.contains("very-secret-pepper"));
        assert!(rendered.contains("redacted"));
    }
}
