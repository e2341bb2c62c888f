//! Host capability introspection.

use serde::Serialize;
use serde_json::json;

use keyreveal_crypto::CIPHER_NAME;

/// Result of probing the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentInfo {
    /// Whether reveals can run here at all.
    pub compatible: bool,
    /// Human-readable explanation, suitable for diagnostics.
    pub reason: String,
    /// Cipher, backend, secure-context flag and target architecture.
    pub details: serde_json::Value,
}

/// Reports whether the host provides the authenticated-cipher primitive and
/// runs in a secure execution context.
pub trait Environment: Send + Sync {
    fn probe(&self) -> EnvironmentInfo;
}

/// In-process host: the RustCrypto AES-256-GCM implementation is compiled
/// in, and a native process is treated as a secure context unless told
/// otherwise.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    secure_context: bool,
}

impl HostEnvironment {
    pub fn new() -> Self {
        Self {
            secure_context: true,
        }
    }

    /// Embedders that proxy an insecure origin (e.g. a plain-HTTP webview)
    /// mark the context as insecure so reveals are refused.
    pub fn with_secure_context(mut self, secure: bool) -> Self {
        self.secure_context = secure;
        self
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for HostEnvironment {
    fn probe(&self) -> EnvironmentInfo {
        let details = json!({
            "cipher": CIPHER_NAME,
            "backend": "rustcrypto-aes-gcm",
            "secureContext": self.secure_context,
            "targetArch": std::env::consts::ARCH,
        });

        if self.secure_context {
            EnvironmentInfo {
                compatible: true,
                reason: format!("{CIPHER_NAME} available in a secure context"),
                details,
            }
        } else {
            EnvironmentInfo {
                compatible: false,
                reason: "not running in a secure context".to_string(),
                details,
            }
        }
    }
}
