//! Signature creation for outbound redirect messages.

use std::fmt;

use crate::error::{SamlError, SamlResult};

use super::SignatureAlgorithm;

/// Produces raw signature bytes with the SP private key.
///
/// The facade only ever hands this the canonical signed-query bytes.
/// Implementations may wrap an HSM or KMS; [`RsaKeySigner`] signs with an
/// in-memory key.
pub trait KeySigner: Send + Sync {
    /// Signs `data` with `algorithm`.
    fn sign(&self, data: &[u8], algorithm: SignatureAlgorithm) -> SamlResult<Vec<u8>>;
}

/// Signs with an RSA private key held in memory.
pub struct RsaKeySigner {
    /// The private key in DER format (PKCS#1 or PKCS#8).
    private_key_der: Vec<u8>,
}

impl RsaKeySigner {
    /// Creates a signer from a DER-encoded RSA private key.
    #[must_use]
    pub fn new(private_key_der: Vec<u8>) -> Self {
        Self { private_key_der }
    }

    /// Creates a signer from a PEM-encoded private key.
    pub fn from_pem(private_key_pem: &str) -> SamlResult<Self> {
        Ok(Self::new(sp_crypto::private_key_der(private_key_pem)?))
    }
}

impl KeySigner for RsaKeySigner {
    fn sign(&self, data: &[u8], algorithm: SignatureAlgorithm) -> SamlResult<Vec<u8>> {
        let rsa = algorithm.rsa().ok_or_else(|| {
            SamlError::SignatureCreation(format!("unsupported signature algorithm: {algorithm}"))
        })?;

        sp_crypto::rsa_sign(&self.private_key_der, data, rsa)
            .map_err(|e| SamlError::SignatureCreation(e.to_string()))
    }
}

impl fmt::Debug for RsaKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeySigner")
            .field("private_key_der", &"[REDACTED]")
            .finish()
    }
}
