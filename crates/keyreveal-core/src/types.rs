use std::fmt;

use zeroize::Zeroizing;

use crate::error::DecryptError;
use keyreveal_crypto::DerivationStrategy;

/// Outcome of a reveal. Expected failures are values, never panics.
pub type DecryptionResult = Result<RevealedSecret, DecryptError>;

/// A recovered API key. Zeroized on drop and redacted in `Debug`.
#[derive(Clone)]
pub struct RevealedSecret {
    plaintext: Zeroizing<String>,
    /// Strategy that authenticated; `None` when served from the cache.
    strategy: Option<DerivationStrategy>,
}

impl RevealedSecret {
    pub(crate) fn decrypted(plaintext: Zeroizing<String>, strategy: DerivationStrategy) -> Self {
        Self {
            plaintext,
            strategy: Some(strategy),
        }
    }

    pub(crate) fn cached(plaintext: Zeroizing<String>) -> Self {
        Self {
            plaintext,
            strategy: None,
        }
    }

    pub fn expose(&self) -> &str {
        &self.plaintext
    }

    pub fn strategy(&self) -> Option<DerivationStrategy> {
        self.strategy
    }

    pub fn from_cache(&self) -> bool {
        self.strategy.is_none()
    }
}

impl fmt::Debug for RevealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealedSecret")
            .field("plaintext", &"[redacted]")
            .field("strategy", &self.strategy)
            .finish()
    }
}
