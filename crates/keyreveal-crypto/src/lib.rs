//! Envelope parsing, candidate key derivation and AES-256-GCM opening for
//! issued API keys.

pub mod aes_gcm;
pub mod base64;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod types;

pub use crate::aes_gcm::{open_envelope, try_decrypt, Opened};
pub use base64::{base64_decode, base64_encode};
pub use envelope::{is_valid_format, parse_envelope, EncryptedEnvelope};
pub use error::CryptoError;
pub use kdf::{derive_candidates, CandidateKey, DerivationStrategy};
pub use types::{
    AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH, CIPHER_NAME, CURRENT_VERSION,
    SALT_LENGTH,
};
