//! Crypto error type.

use thiserror::Error;

/// Error type for key handling and signature operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Invalid key format.
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// Invalid certificate.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Malformed PEM envelope.
    #[error("invalid PEM: {0}")]
    InvalidPem(String),
}
