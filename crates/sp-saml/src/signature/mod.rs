//! Redirect-binding signature support.
//!
//! HTTP-Redirect messages are not signed as XML documents. Instead the
//! sender signs a canonical query string built from the encoded message,
//! the optional RelayState and the algorithm URI, and transmits the result
//! in the `Signature` parameter.
//!
//! # Signing Algorithms
//!
//! Outbound signing and inbound verification support:
//! - RSA-SHA256 (recommended)
//! - RSA-SHA384
//! - RSA-SHA512
//!
//! ECDSA and legacy SHA-1 URIs are recognized so they can be reported, but
//! are rejected.

mod query;
mod signer;
mod validator;

pub use query::*;
pub use signer::*;
pub use validator::*;

use std::fmt;

use serde::{Deserialize, Serialize};
use sp_crypto::RsaAlgorithm;

use crate::types::signature_algorithms;

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SignatureAlgorithm {
    /// RSA with SHA-256 (recommended).
    #[default]
    RsaSha256,
    /// RSA with SHA-384.
    RsaSha384,
    /// RSA with SHA-512.
    RsaSha512,
    /// ECDSA with SHA-256.
    EcdsaSha256,
    /// ECDSA with SHA-384.
    EcdsaSha384,
    /// ECDSA with SHA-512.
    EcdsaSha512,
    /// Legacy RSA with SHA-1 (not recommended).
    RsaSha1,
}

impl SignatureAlgorithm {
    /// Returns the URI for this signature algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
            Self::EcdsaSha256 => signature_algorithms::ECDSA_SHA256,
            Self::EcdsaSha384 => signature_algorithms::ECDSA_SHA384,
            Self::EcdsaSha512 => signature_algorithms::ECDSA_SHA512,
            Self::RsaSha1 => signature_algorithms::RSA_SHA1,
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            signature_algorithms::RSA_SHA256 => Some(Self::RsaSha256),
            signature_algorithms::RSA_SHA384 => Some(Self::RsaSha384),
            signature_algorithms::RSA_SHA512 => Some(Self::RsaSha512),
            signature_algorithms::ECDSA_SHA256 => Some(Self::EcdsaSha256),
            signature_algorithms::ECDSA_SHA384 => Some(Self::EcdsaSha384),
            signature_algorithms::ECDSA_SHA512 => Some(Self::EcdsaSha512),
            signature_algorithms::RSA_SHA1 => Some(Self::RsaSha1),
            _ => None,
        }
    }

    /// Returns true if this algorithm uses ECDSA.
    #[must_use]
    pub const fn is_ecdsa(&self) -> bool {
        matches!(
            self,
            Self::EcdsaSha256 | Self::EcdsaSha384 | Self::EcdsaSha512
        )
    }

    /// Returns true if this algorithm uses a deprecated hash (SHA-1).
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::RsaSha1)
    }

    /// Maps to the RSA primitive used for signing and verification.
    ///
    /// Returns `None` for ECDSA and SHA-1, which are not supported.
    #[must_use]
    pub const fn rsa(&self) -> Option<RsaAlgorithm> {
        match self {
            Self::RsaSha256 => Some(RsaAlgorithm::Rs256),
            Self::RsaSha384 => Some(RsaAlgorithm::Rs384),
            Self::RsaSha512 => Some(RsaAlgorithm::Rs512),
            _ => None,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

impl TryFrom<String> for SignatureAlgorithm {
    type Error = String;

    fn try_from(uri: String) -> Result<Self, Self::Error> {
        Self::from_uri(&uri).ok_or_else(|| format!("unknown signature algorithm: {uri}"))
    }
}

impl From<SignatureAlgorithm> for String {
    fn from(alg: SignatureAlgorithm) -> Self {
        alg.uri().to_string()
    }
}
