//! Signature validation for inbound messages.
//!
//! Redirect-bound logout messages carry a detached signature over the
//! canonical query string, verified here against the IdP certificates.
//! Enveloped XML signatures on POST-bound responses need XML
//! canonicalization, which is delegated to an [`XmlSignatureVerifier`].

use base64::Engine;
use tracing::debug;

use crate::error::ValidationError;

use super::SignatureAlgorithm;

/// Verifies enveloped XML signatures.
///
/// The caller has already checked that every `ds:Signature` in `xml` is a
/// child of the response or of its assertion and that its single
/// `Reference` points at that parent. `signed_ids` lists the `ID` of each
/// signed element. Implementations must verify the signature covering each
/// of them against one of `idp_certificates`, resolving the reference to
/// that exact element. Whether a signature is required is decided by the
/// caller.
pub trait XmlSignatureVerifier: Send + Sync {
    /// Verifies the signatures over the elements named by `signed_ids`.
    fn verify(
        &self,
        xml: &str,
        signed_ids: &[&str],
        idp_certificates: &[String],
    ) -> Result<(), ValidationError>;
}

/// Verifies HTTP-Redirect binding signatures.
#[derive(Debug, Clone)]
pub struct RedirectSignatureValidator {
    /// PKCS#1 public keys of the trusted IdP certificates.
    public_keys: Vec<Vec<u8>>,
}

impl RedirectSignatureValidator {
    /// Creates a validator trusting the given PEM or bare base64 certificates.
    pub fn from_certificates(certificates: &[String]) -> Result<Self, ValidationError> {
        let public_keys = certificates
            .iter()
            .map(|cert| sp_crypto::certificate_public_key(cert))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;

        if public_keys.is_empty() {
            return Err(ValidationError::InvalidSignature(
                "no IdP certificate configured to verify the signature".to_string(),
            ));
        }

        Ok(Self { public_keys })
    }

    /// Validates a detached redirect-binding signature over `signed_query`.
    pub fn validate(
        &self,
        signed_query: &str,
        signature_b64: &str,
        sig_alg: &str,
    ) -> Result<(), ValidationError> {
        let algorithm = SignatureAlgorithm::from_uri(sig_alg).ok_or_else(|| {
            ValidationError::InvalidSignature(format!("unknown signature algorithm: {sig_alg}"))
        })?;

        if algorithm.is_deprecated() {
            return Err(ValidationError::InvalidSignature(
                "SHA-1 signatures are not allowed".to_string(),
            ));
        }

        let rsa = algorithm.rsa().ok_or_else(|| {
            ValidationError::InvalidSignature(format!("unsupported signature algorithm: {sig_alg}"))
        })?;

        let cleaned: String = signature_b64.chars().filter(|c| !c.is_whitespace()).collect();
        let signature = base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| ValidationError::InvalidSignature(format!("invalid signature encoding: {e}")))?;

        // Try each trusted certificate
        for (index, key) in self.public_keys.iter().enumerate() {
            if sp_crypto::rsa_verify(key, signed_query.as_bytes(), &signature, rsa) {
                debug!("Redirect signature verified with IdP certificate #{index}");
                return Ok(());
            }
        }

        Err(ValidationError::InvalidSignature(
            "signature verification failed with all trusted certificates".to_string(),
        ))
    }
}
