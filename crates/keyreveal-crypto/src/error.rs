use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Malformed envelope: expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("Malformed envelope: {field} is not valid base64")]
    InvalidBase64 { field: &'static str },

    #[error("Invalid {field} length: expected {expected} bytes, got {got}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("No candidate keys supplied")]
    NoCandidates,

    #[error("Authentication failed for all {attempted} candidate keys")]
    AuthenticationFailed { attempted: usize },
}
