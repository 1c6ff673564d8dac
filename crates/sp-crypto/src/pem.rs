//! PEM and X.509 helpers.
//!
//! SAML settings usually carry keys and certificates as PEM, but IdP
//! metadata often hands out the bare base64 body of a certificate. Both
//! shapes are accepted.

use base64::Engine;

use crate::error::CryptoError;

/// Extracts DER data from a PEM string with the given label.
#[must_use]
pub fn pem_to_der(pem: &str, label: &str) -> Option<Vec<u8>> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");

    let start = pem.find(&begin)? + begin.len();
    let end_pos = pem.find(&end)?;
    if end_pos < start {
        return None;
    }

    decode_body(&pem[start..end_pos])
}

/// Decodes an SP private key (PKCS#8 or PKCS#1 PEM) into DER.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPem`] when no supported envelope is found.
pub fn private_key_der(pem: &str) -> Result<Vec<u8>, CryptoError> {
    pem_to_der(pem, "PRIVATE KEY")
        .or_else(|| pem_to_der(pem, "RSA PRIVATE KEY"))
        .ok_or_else(|| CryptoError::InvalidPem("expected a PRIVATE KEY block".to_string()))
}

/// Extracts the RSA public key from a certificate.
///
/// Accepts either a PEM `CERTIFICATE` block or the bare base64 body.
/// Returns the PKCS#1 `RSAPublicKey` bytes carried in the certificate's
/// `SubjectPublicKeyInfo`.
///
/// # Errors
///
/// Returns an error if the certificate cannot be decoded or parsed.
pub fn certificate_public_key(certificate: &str) -> Result<Vec<u8>, CryptoError> {
    use x509_parser::prelude::{FromDer, X509Certificate};

    let der = if certificate.contains("-----BEGIN") {
        pem_to_der(certificate, "CERTIFICATE")
    } else {
        decode_body(certificate)
    }
    .ok_or_else(|| CryptoError::InvalidCertificate("undecodable certificate".to_string()))?;

    let (_, cert) = X509Certificate::from_der(&der)
        .map_err(|e| CryptoError::InvalidCertificate(format!("Failed to parse certificate: {e}")))?;

    Ok(cert.public_key().subject_public_key.data.to_vec())
}

fn decode_body(body: &str) -> Option<Vec<u8>> {
    let b64_data: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(b64_data).ok()
}
