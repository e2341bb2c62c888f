use serde::Serialize;
use thiserror::Error;

use keyreveal_crypto::CryptoError;

/// Uniform message for every failure. Callers render this instead of the
/// specific error so the view cannot be used as a decryption oracle.
pub const UNAVAILABLE_MESSAGE: &str = "Cannot display key";

/// Coarse failure category of a reveal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Format,
    Length,
    Version,
    Authentication,
    Environment,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptError {
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Length error: {0}")]
    Length(String),

    #[error("Unsupported envelope version: {found} (supported: {supported})")]
    Version { found: String, supported: String },

    #[error("Authentication failed: no candidate key verified the tag")]
    Authentication,

    #[error("Incompatible environment: {0}")]
    Environment(String),
}

impl DecryptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Format(_) => ErrorKind::Format,
            Self::Length(_) => ErrorKind::Length,
            Self::Version { .. } => ErrorKind::Version,
            Self::Authentication => ErrorKind::Authentication,
            Self::Environment(_) => ErrorKind::Environment,
        }
    }

    /// Every kind is deterministic for a given input, so none are retryable.
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn user_message(&self) -> &'static str {
        UNAVAILABLE_MESSAGE
    }
}

impl From<CryptoError> for DecryptError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::FieldCount { .. } | CryptoError::InvalidBase64 { .. } => {
                Self::Format(e.to_string())
            }
            CryptoError::InvalidFieldLength { .. } => Self::Length(e.to_string()),
            CryptoError::InvalidKeyLength { .. }
            | CryptoError::NoCandidates
            | CryptoError::AuthenticationFailed { .. } => Self::Authentication,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
