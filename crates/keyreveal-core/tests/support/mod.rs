//! Shared helpers: build envelopes the way the key service does, and count
//! cipher calls.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use async_trait::async_trait;
use keyreveal_core::{CipherBackend, EncryptionFacade, InlineCipher, RevealConfig};
use keyreveal_crypto::{
    CandidateKey, CryptoError, DerivationStrategy, EncryptedEnvelope, Opened,
};

pub const PEPPER: &str = "test-pepper";

/// Encrypt `plaintext` for `user_id` into a wire string.
pub fn seal_with(
    user_id: &str,
    plaintext: &str,
    salt: [u8; 32],
    iv: [u8; 12],
    strategy: DerivationStrategy,
) -> String {
    let key = strategy.derive(user_id, PEPPER, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).unwrap();
    let mut ciphertext = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut ciphertext)
        .unwrap();
    EncryptedEnvelope {
        version: "v2".into(),
        salt,
        iv,
        ciphertext,
        tag: tag.into(),
    }
    .to_wire()
}

/// Random salt and IV, raw-salt derivation.
pub fn seal(user_id: &str, plaintext: &str) -> String {
    let mut salt = [0u8; 32];
    let mut iv = [0u8; 12];
    getrandom::getrandom(&mut salt).unwrap();
    getrandom::getrandom(&mut iv).unwrap();
    seal_with(user_id, plaintext, salt, iv, DerivationStrategy::RawSalt)
}

/// Wraps the inline cipher and counts how often it is invoked.
#[derive(Default)]
pub struct CountingCipher {
    calls: AtomicUsize,
}

impl CountingCipher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CipherBackend for CountingCipher {
    async fn open(
        &self,
        envelope: &EncryptedEnvelope,
        candidates: &[CandidateKey],
    ) -> Result<Opened, CryptoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        InlineCipher.open(envelope, candidates).await
    }
}

pub fn counting_facade() -> (EncryptionFacade, Arc<CountingCipher>) {
    let cipher = Arc::new(CountingCipher::default());
    let facade = EncryptionFacade::new(RevealConfig::new(PEPPER))
        .unwrap()
        .with_cipher(cipher.clone());
    (facade, cipher)
}
