//! Single entry point for revealing an issued API key.
//!
//! decrypt: validate -> cache lookup -> parse -> version check ->
//! environment check -> derive candidates -> open -> cache store.
//! Every step before the cipher call is synchronous; the cipher call is the
//! only await.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::backend::{CipherBackend, InlineCipher};
use crate::cache::{CacheKey, CacheStats, DecryptionCache};
use crate::config::RevealConfig;
use crate::environment::{Environment, EnvironmentInfo, HostEnvironment};
use crate::error::{ConfigError, DecryptError};
use crate::types::{DecryptionResult, RevealedSecret};
use keyreveal_crypto::{derive_candidates, is_valid_format, parse_envelope};

pub struct EncryptionFacade {
    config: RevealConfig,
    cache: Arc<DecryptionCache>,
    cipher: Arc<dyn CipherBackend>,
    environment: Arc<dyn Environment>,
}

impl EncryptionFacade {
    /// Facade with the in-process cipher, host environment and a fresh cache
    /// sized from `config`. The sweep is not started; call [`Self::start`].
    pub fn new(config: RevealConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache = Arc::new(DecryptionCache::new(
            config.cache_ttl(),
            config.sweep_interval(),
        ));
        Ok(Self {
            config,
            cache,
            cipher: Arc::new(InlineCipher),
            environment: Arc::new(HostEnvironment::default()),
        })
    }

    pub fn with_cipher(mut self, cipher: Arc<dyn CipherBackend>) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// Share an externally owned cache (e.g. one per session manager).
    pub fn with_cache(mut self, cache: Arc<DecryptionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<DecryptionCache> {
        &self.cache
    }

    /// Reveal `raw` for `user_id`.
    ///
    /// Empty input is rejected before any cryptographic work. All other
    /// failures are returned as [`DecryptError`] values.
    pub async fn decrypt(&self, raw: &str, user_id: &str) -> DecryptionResult {
        if raw.is_empty() {
            return Err(DecryptError::InvalidInput("encrypted key is empty"));
        }
        if user_id.is_empty() {
            return Err(DecryptError::InvalidInput("user id is empty"));
        }

        let user = user_fingerprint(user_id);
        let cache_key = CacheKey::new(raw, user_id);
        if self.config.cache_enabled {
            if let Some(plaintext) = self.cache.get(&cache_key, user_id) {
                debug!(%user, "reveal served from cache");
                return Ok(RevealedSecret::cached(plaintext));
            }
        }

        let envelope = parse_envelope(raw).map_err(|e| {
            let err = DecryptError::from(e);
            warn!(%user, kind = ?err.kind(), "rejected malformed envelope");
            err
        })?;

        if envelope.version != self.config.supported_version {
            warn!(%user, version = %envelope.version, "unsupported envelope version");
            return Err(DecryptError::Version {
                found: envelope.version,
                supported: self.config.supported_version.clone(),
            });
        }

        let env = self.environment.probe();
        if !env.compatible {
            warn!(reason = %env.reason, "environment cannot reveal keys");
            return Err(DecryptError::Environment(env.reason));
        }

        let candidates = derive_candidates(user_id, self.config.pepper.expose(), &envelope.salt);
        let opened = self
            .cipher
            .open(&envelope, &candidates)
            .await
            .map_err(|e| {
                warn!(%user, candidates = candidates.len(), "no candidate key authenticated");
                DecryptError::from(e)
            })?;

        let plaintext = Zeroizing::new(String::from_utf8_lossy(&opened.plaintext).into_owned());
        debug!(%user, strategy = %opened.strategy, "revealed key");

        if self.config.cache_enabled {
            self.cache.put(cache_key, user_id, &plaintext);
        }
        Ok(RevealedSecret::decrypted(plaintext, opened.strategy))
    }

    /// Cheap structural check; does not decrypt.
    pub fn is_valid_format(&self, raw: &str) -> bool {
        is_valid_format(raw)
    }

    pub fn environment_info(&self) -> EnvironmentInfo {
        self.environment.probe()
    }

    /// Invalidate every cached plaintext, e.g. on logout or session change.
    pub fn clear_all_cache(&self) {
        self.cache.clear_all();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Start the background cache sweep on the current tokio runtime.
    pub fn start(&self) -> bool {
        self.cache.start()
    }

    pub fn stop(&self) {
        self.cache.stop();
    }
}

/// Short, stable identifier for logs; never the raw user id.
fn user_fingerprint(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    hex::encode(&digest[..4])
}
