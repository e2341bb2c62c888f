//! The cipher step of a reveal, behind an async seam.
//!
//! The facade awaits this and nothing else. The default backend runs the
//! in-process AES-256-GCM decryptor; hosts can substitute a platform
//! primitive, and tests wrap it to count cryptographic work.

use async_trait::async_trait;

use keyreveal_crypto::{open_envelope, CandidateKey, CryptoError, EncryptedEnvelope, Opened};

#[async_trait]
pub trait CipherBackend: Send + Sync {
    /// Open `envelope` with the first candidate whose tag verifies.
    async fn open(
        &self,
        envelope: &EncryptedEnvelope,
        candidates: &[CandidateKey],
    ) -> Result<Opened, CryptoError>;
}

/// Decrypts on the calling task with RustCrypto `aes-gcm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCipher;

#[async_trait]
impl CipherBackend for InlineCipher {
    async fn open(
        &self,
        envelope: &EncryptedEnvelope,
        candidates: &[CandidateKey],
    ) -> Result<Opened, CryptoError> {
        open_envelope(envelope, candidates)
    }
}
