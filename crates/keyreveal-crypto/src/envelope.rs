//! Wire format of an issued-key envelope.
//!
//! `<version>:<salt_b64>:<iv_b64>:<ciphertext_b64>:<tag_b64>`
//!
//! Every binary field is standard base64. Salt, IV and tag lengths are exact;
//! the ciphertext is as long as the plaintext. The version tag is carried
//! through untouched and checked by the caller.

use std::fmt;
use std::str::FromStr;

use crate::base64::{base64_decode, base64_encode};
use crate::error::CryptoError;
use crate::types::{
    AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, ENVELOPE_FIELD_COUNT, ENVELOPE_SEPARATOR, SALT_LENGTH,
};

/// A parsed envelope. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// Scheme revision tag (e.g. "v2").
    pub version: String,
    /// Per-record key derivation salt.
    pub salt: [u8; SALT_LENGTH],
    /// GCM nonce.
    pub iv: [u8; AES_GCM_IV_LENGTH],
    /// Encrypted secret, without the tag.
    pub ciphertext: Vec<u8>,
    /// GCM authentication tag.
    pub tag: [u8; AES_GCM_TAG_LENGTH],
}

impl EncryptedEnvelope {
    /// Serialize back into the `:`-delimited wire string.
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EncryptedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = ENVELOPE_SEPARATOR;
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}",
            self.version,
            base64_encode(&self.salt),
            base64_encode(&self.iv),
            base64_encode(&self.ciphertext),
            base64_encode(&self.tag),
        )
    }
}

impl FromStr for EncryptedEnvelope {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_envelope(s)
    }
}

/// Parse and validate an envelope string.
///
/// Fails with [`CryptoError::FieldCount`] unless there are exactly five fields,
/// [`CryptoError::InvalidBase64`] if a binary field does not decode, and
/// [`CryptoError::InvalidFieldLength`] if salt, IV or tag have the wrong size.
pub fn parse_envelope(raw: &str) -> Result<EncryptedEnvelope, CryptoError> {
    let parts: Vec<&str> = raw.split(ENVELOPE_SEPARATOR).collect();
    if parts.len() != ENVELOPE_FIELD_COUNT {
        return Err(CryptoError::FieldCount {
            expected: ENVELOPE_FIELD_COUNT,
            got: parts.len(),
        });
    }

    let version = parts[0];
    let salt = decode_field("salt", parts[1])?;
    let iv = decode_field("iv", parts[2])?;
    let ciphertext = decode_field("ciphertext", parts[3])?;
    let tag = decode_field("tag", parts[4])?;

    Ok(EncryptedEnvelope {
        version: version.to_string(),
        salt: exact_length::<SALT_LENGTH>("salt", &salt)?,
        iv: exact_length::<AES_GCM_IV_LENGTH>("iv", &iv)?,
        ciphertext,
        tag: exact_length::<AES_GCM_TAG_LENGTH>("tag", &tag)?,
    })
}

/// Structural pre-check: does `raw` parse as an envelope? No decryption.
pub fn is_valid_format(raw: &str) -> bool {
    parse_envelope(raw).is_ok()
}

fn decode_field(field: &'static str, encoded: &str) -> Result<Vec<u8>, CryptoError> {
    base64_decode(encoded).map_err(|_| CryptoError::InvalidBase64 { field })
}

fn exact_length<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N], CryptoError> {
    <[u8; N]>::try_from(bytes).map_err(|_| CryptoError::InvalidFieldLength {
        field,
        expected: N,
        got: bytes.len(),
    })
}
