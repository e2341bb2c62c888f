//! SHA-256 key derivation from (user id, pepper, salt).
//!
//! The key service's exact combination rule is not pinned down, so three
//! provisional encodings of the salt are derived in a fixed order. Only one is
//! expected to be correct; the decryptor tries them in order and reports which
//! one authenticated. Dropping the losers is a one-line change to
//! [`DerivationStrategy::ALL`] once the server rule is confirmed.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::base64::base64_encode;
use crate::types::AES_KEY_LENGTH;

/// How the salt is folded into the hash input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationStrategy {
    /// `SHA-256(utf8(user_id) || utf8(pepper) || salt)`
    RawSalt,
    /// `SHA-256(utf8(user_id + pepper + base64(salt)))`
    Base64Salt,
    /// `SHA-256(utf8(user_id + pepper + hex(salt)))`
    HexSalt,
}

impl DerivationStrategy {
    /// Trial order.
    pub const ALL: [DerivationStrategy; 3] = [Self::RawSalt, Self::Base64Salt, Self::HexSalt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawSalt => "raw_salt",
            Self::Base64Salt => "base64_salt",
            Self::HexSalt => "hex_salt",
        }
    }

    /// Derive the 256-bit key for this strategy.
    pub fn derive(&self, user_id: &str, pepper: &str, salt: &[u8]) -> CandidateKey {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update(pepper.as_bytes());
        match self {
            Self::RawSalt => hasher.update(salt),
            Self::Base64Salt => hasher.update(base64_encode(salt).as_bytes()),
            Self::HexSalt => hasher.update(hex::encode(salt).as_bytes()),
        }
        CandidateKey {
            strategy: *self,
            key: hasher.finalize().into(),
        }
    }
}

impl fmt::Display for DerivationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived AES-256 key, tagged with the strategy that produced it.
/// Key bytes are zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CandidateKey {
    #[zeroize(skip)]
    strategy: DerivationStrategy,
    key: [u8; AES_KEY_LENGTH],
}

impl CandidateKey {
    pub fn strategy(&self) -> DerivationStrategy {
        self.strategy
    }

    pub fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateKey")
            .field("strategy", &self.strategy)
            .field("key", &"[redacted]")
            .finish()
    }
}

/// Derive every candidate key for an envelope, in trial order.
///
/// Pure and deterministic: the same inputs always yield the same keys in the
/// same order.
pub fn derive_candidates(user_id: &str, pepper: &str, salt: &[u8]) -> Vec<CandidateKey> {
    DerivationStrategy::ALL
        .iter()
        .map(|strategy| strategy.derive(user_id, pepper, salt))
        .collect()
}
