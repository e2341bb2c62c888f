/// Envelope scheme revision issued by the key service.
///
/// Format: `v2:<salt_b64>:<iv_b64>:<ciphertext_b64>:<tag_b64>`
/// Salt is mixed with the user id and the application pepper to derive the key.
pub const CURRENT_VERSION: &str = "v2";

/// Number of `:`-delimited fields in the wire string.
pub const ENVELOPE_FIELD_COUNT: usize = 5;

/// Field separator in the wire string.
pub const ENVELOPE_SEPARATOR: char = ':';

/// Per-record salt length in bytes.
pub const SALT_LENGTH: usize = 32;

/// AES-GCM IV length in bytes (96 bits per NIST recommendation).
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// Name of the authenticated cipher, as reported by environment probes.
pub const CIPHER_NAME: &str = "AES-256-GCM";
