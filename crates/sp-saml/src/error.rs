//! SAML error types.
//!
//! Errors come in two tiers:
//!
//! - [`SamlError`] aborts an operation. It signals misuse or misconfiguration
//!   (missing binding parameter, missing key, no SLO endpoint) and is
//!   returned as `Err` from the facade.
//! - [`ValidationError`] describes why an inbound message was rejected. It is
//!   never returned as `Err` from a consume operation; the facade records it
//!   in its error record and returns normally.

use std::fmt;

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// Fatal SAML errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// The POST-bound `SAMLResponse` was not present on an SSO consume.
    #[error("SAML Response not found, only HTTP-POST binding is supported")]
    ResponseNotFound,

    /// Neither `SAMLResponse` nor `SAMLRequest` was present on an SLO consume.
    #[error("SAML LogoutRequest/LogoutResponse not found, only HTTP-Redirect binding is supported")]
    LogoutMessageNotFound,

    /// Signing is required but no SP private key is configured.
    #[error("trying to sign the {0} but no SP private key is configured")]
    MissingKey(&'static str),

    /// The IdP has no single logout endpoint configured.
    #[error("the IdP does not support Single Logout")]
    SloNotSupported,

    /// Settings are incomplete or inconsistent.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// The redirect dispatcher failed.
    #[error("redirect failed: {0}")]
    Redirect(String),

    /// The session termination capability failed.
    #[error("session termination failed: {0}")]
    SessionTermination(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// Deflate compression or decompression error.
    #[error("deflate error: {0}")]
    Deflate(String),

    /// An inflated message exceeded the size limit.
    #[error("inflated message exceeds {0} bytes")]
    MessageTooLarge(usize),

    /// Cryptographic operation error.
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl SamlError {
    /// Returns the caller-facing error code for errors that have one.
    ///
    /// Binding errors carry `invalid_binding` on the error value itself; they
    /// never reach the facade's error record.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::ResponseNotFound | Self::LogoutMessageNotFound => Some(ErrorCode::InvalidBinding),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

impl From<std::io::Error> for SamlError {
    fn from(err: std::io::Error) -> Self {
        Self::Deflate(err.to_string())
    }
}

impl From<roxmltree::Error> for SamlError {
    fn from(err: roxmltree::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<sp_crypto::CryptoError> for SamlError {
    fn from(err: sp_crypto::CryptoError) -> Self {
        Self::Crypto(err.to_string())
    }
}

/// Error-code tokens surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The SSO response failed validation.
    InvalidResponse,
    /// The expected binding parameter was absent.
    InvalidBinding,
    /// The logout response failed validation.
    InvalidLogoutResponse,
    /// The logout request failed validation.
    InvalidLogoutRequest,
    /// The logout response was valid but did not report Success.
    LogoutNotSuccess,
}

impl ErrorCode {
    /// Returns the wire token for this code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidResponse => "invalid_response",
            Self::InvalidBinding => "invalid_binding",
            Self::InvalidLogoutResponse => "invalid_logout_response",
            Self::InvalidLogoutRequest => "invalid_logout_request",
            Self::LogoutNotSuccess => "logout_not_success",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an inbound SAML message was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The payload could not be decoded or parsed.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The root element was not the expected protocol message.
    #[error("unexpected root element: expected {expected}, got {actual}")]
    UnexpectedRoot {
        /// The expected element name.
        expected: &'static str,
        /// The element actually found.
        actual: String,
    },

    /// Missing required element or attribute.
    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    /// Unsupported SAML version.
    #[error("unsupported SAML version: {0}")]
    UnsupportedVersion(String),

    /// The message reports a non-Success status.
    #[error("the status code of the message was not Success, was {code}{}", .message.as_deref().map(|m| format!(" -> {m}")).unwrap_or_default())]
    StatusNotSuccess {
        /// The top-level status code URI.
        code: String,
        /// The optional status message.
        message: Option<String>,
    },

    /// Invalid destination.
    #[error("invalid destination: expected {expected}, got {actual}")]
    InvalidDestination {
        /// The expected destination URL.
        expected: String,
        /// The actual destination URL.
        actual: String,
    },

    /// Invalid issuer.
    #[error("invalid issuer: expected {expected}, got {actual}")]
    InvalidIssuer {
        /// The expected issuer.
        expected: String,
        /// The actual issuer.
        actual: String,
    },

    /// InResponseTo does not correlate with the request we sent.
    #[error("InResponseTo mismatch: expected {expected}, got {}", .actual.as_deref().unwrap_or("none"))]
    InResponseToMismatch {
        /// The request id we expected.
        expected: String,
        /// The value on the message.
        actual: Option<String>,
    },

    /// Invalid audience.
    #[error("invalid audience: {0} is not a valid audience for this response")]
    InvalidAudience(String),

    /// The message or assertion is not yet valid.
    #[error("not yet valid")]
    NotYetValid,

    /// The message or assertion has expired.
    #[error("expired")]
    Expired,

    /// The response carried no assertion.
    #[error("the response has no assertion")]
    NoAssertion,

    /// The response carried more than one assertion.
    #[error("the response must contain exactly one assertion")]
    MultipleAssertions,

    /// Encrypted content cannot be processed.
    #[error("encrypted {0} is not supported")]
    Encrypted(&'static str),

    /// A required signature is absent.
    #[error("the {0} is not signed")]
    MissingSignature(&'static str),

    /// A signature was present but did not verify.
    #[error("signature validation failed: {0}")]
    InvalidSignature(String),

    /// Two attributes share the same name or friendly name.
    #[error("found an Attribute element with duplicated {0}")]
    DuplicateAttribute(String),

    /// A timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl From<roxmltree::Error> for ValidationError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<SamlError> for ValidationError {
    fn from(err: SamlError) -> Self {
        Self::Malformed(err.to_string())
    }
}
