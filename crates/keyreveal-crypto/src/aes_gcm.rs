//! AES-256-GCM opening with a list of candidate keys.
//!
//! Tag is detached on the wire, so decryption runs in place over a scratch
//! copy of the ciphertext. Scratch buffers from failed attempts are zeroized
//! before the next candidate is tried.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::Zeroizing;

use crate::envelope::EncryptedEnvelope;
use crate::error::CryptoError;
use crate::kdf::{CandidateKey, DerivationStrategy};
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH};

/// Plaintext recovered by the first candidate whose tag verified.
pub struct Opened {
    pub plaintext: Zeroizing<Vec<u8>>,
    pub strategy: DerivationStrategy,
}

/// Try each candidate in order; return the plaintext of the first that
/// authenticates.
///
/// Every failure collapses to [`CryptoError::AuthenticationFailed`]: a
/// corrupted record, a different owner and an unknown derivation rule are
/// indistinguishable here.
pub fn try_decrypt(
    candidates: &[CandidateKey],
    iv: &[u8; AES_GCM_IV_LENGTH],
    ciphertext: &[u8],
    tag: &[u8; AES_GCM_TAG_LENGTH],
) -> Result<Opened, CryptoError> {
    if candidates.is_empty() {
        return Err(CryptoError::NoCandidates);
    }

    let nonce = Nonce::from_slice(iv);
    let tag = Tag::from_slice(tag);

    for candidate in candidates {
        let cipher = Aes256Gcm::new_from_slice(candidate.as_bytes()).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: AES_KEY_LENGTH,
                got: candidate.as_bytes().len(),
            }
        })?;

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        if cipher
            .decrypt_in_place_detached(nonce, b"", buffer.as_mut_slice(), tag)
            .is_ok()
        {
            return Ok(Opened {
                plaintext: buffer,
                strategy: candidate.strategy(),
            });
        }
    }

    Err(CryptoError::AuthenticationFailed {
        attempted: candidates.len(),
    })
}

/// [`try_decrypt`] over a parsed envelope.
pub fn open_envelope(
    envelope: &EncryptedEnvelope,
    candidates: &[CandidateKey],
) -> Result<Opened, CryptoError> {
    try_decrypt(candidates, &envelope.iv, &envelope.ciphertext, &envelope.tag)
}
