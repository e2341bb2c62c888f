//! Reveal core: owner-bound decryption cache, configuration, environment
//! probing and the async facade that ties the crypto crate together.

pub mod backend;
pub mod cache;
pub mod config;
pub mod environment;
pub mod error;
pub mod facade;
pub mod types;

pub use backend::{CipherBackend, InlineCipher};
pub use cache::{CacheKey, CacheStats, DecryptionCache};
pub use config::{Pepper, RevealConfig};
pub use environment::{Environment, EnvironmentInfo, HostEnvironment};
pub use error::{ConfigError, DecryptError, ErrorKind, UNAVAILABLE_MESSAGE};
pub use facade::EncryptionFacade;
pub use types::{DecryptionResult, RevealedSecret};
