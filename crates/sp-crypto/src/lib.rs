//! # sp-crypto
//!
//! Raw-byte cryptography for the SAML service provider, backed by aws-lc-rs.
//!
//! SAML redirect-binding signatures are computed over a query string rather
//! than an XML document, so this crate only needs three things:
//!
//! - RSA PKCS#1 v1.5 signing with the SP private key
//! - RSA PKCS#1 v1.5 verification against IdP certificates
//! - PEM decoding and X.509 public key extraction
//!
//! SHA-1 and ECDSA are intentionally absent.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod pem;
pub mod rsa;

pub use error::CryptoError;
pub use pem::{certificate_public_key, pem_to_der, private_key_der};
pub use rsa::{rsa_sign, rsa_verify, RsaAlgorithm};
