//! RSA PKCS#1 v1.5 signatures over raw bytes.
//!
//! SAML 2.0 deployments overwhelmingly use `rsa-sha256`, which is why the
//! SHA-256 variant is available here alongside SHA-384 and SHA-512.

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{self, RsaKeyPair, UnparsedPublicKey},
};

use crate::error::CryptoError;

/// RSA signature algorithms usable for redirect-binding signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256.
    Rs256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    Rs384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    Rs512,
}

impl RsaAlgorithm {
    /// Returns the XML-DSig algorithm URI.
    #[must_use]
    pub const fn xml_dsig_uri(self) -> &'static str {
        match self {
            Self::Rs256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            Self::Rs384 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384",
            Self::Rs512 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512",
        }
    }
}

/// Signs data with an RSA private key.
///
/// # Arguments
///
/// * `key_der` - RSA private key in DER format (PKCS#1 or PKCS#8)
/// * `data` - Data to sign
/// * `algorithm` - Signature algorithm
///
/// # Errors
///
/// Returns an error if the key cannot be parsed or signing fails.
pub fn rsa_sign(
    key_der: &[u8],
    data: &[u8],
    algorithm: RsaAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    let key_pair = RsaKeyPair::from_der(key_der)
        .or_else(|_| RsaKeyPair::from_pkcs8(key_der))
        .map_err(|e| CryptoError::InvalidKey(format!("Invalid RSA key: {e}")))?;

    let rng = SystemRandom::new();
    let mut sig = vec![0u8; key_pair.public_modulus_len()];

    let padding = match algorithm {
        RsaAlgorithm::Rs256 => &signature::RSA_PKCS1_SHA256,
        RsaAlgorithm::Rs384 => &signature::RSA_PKCS1_SHA384,
        RsaAlgorithm::Rs512 => &signature::RSA_PKCS1_SHA512,
    };

    key_pair
        .sign(padding, &rng, data, &mut sig)
        .map_err(|e| CryptoError::Signing(format!("RSA signing failed: {e}")))?;

    Ok(sig)
}

/// Verifies an RSA signature.
///
/// `public_key_der` is the PKCS#1 `RSAPublicKey` as returned by
/// [`certificate_public_key`](crate::certificate_public_key).
///
/// Returns `false` for any signature that does not verify; malformed keys
/// are indistinguishable from bad signatures to the caller.
#[must_use]
pub fn rsa_verify(public_key_der: &[u8], data: &[u8], sig: &[u8], algorithm: RsaAlgorithm) -> bool {
    use aws_lc_rs::signature::{
        RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
    };

    let verification_alg: &dyn signature::VerificationAlgorithm = match algorithm {
        RsaAlgorithm::Rs256 => &RSA_PKCS1_2048_8192_SHA256,
        RsaAlgorithm::Rs384 => &RSA_PKCS1_2048_8192_SHA384,
        RsaAlgorithm::Rs512 => &RSA_PKCS1_2048_8192_SHA512,
    };

    UnparsedPublicKey::new(verification_alg, public_key_der)
        .verify(data, sig)
        .is_ok()
}
