//! Protocol message builders and validators.
//!
//! Builders turn settings plus per-call options into an encoded outbound
//! message. Validators are constructed from the raw inbound payload, expose
//! the decoded XML for the operation trace, and then either return the
//! message's claims or the [`ValidationError`] that rejected it.

mod authn_request;
mod logout_request;
mod logout_response;
mod response;
mod xml;

pub use authn_request::*;
pub use logout_request::*;
pub use logout_response::*;
pub use response::*;

use chrono::{DateTime, Duration, Utc};

use crate::bindings::{SamlMessageType, UrlEncoding};
use crate::context::RequestContext;
use crate::error::ValidationError;
use crate::settings::Settings;
use crate::signature::{
    assemble_signed_query, signed_query, RedirectSignatureValidator, XmlSignatureVerifier,
};

/// An outbound message ready for the redirect binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltMessage {
    /// Deflated (per settings) and base64-encoded XML, not yet
    /// percent-encoded.
    pub encoded: String,
    /// The message `ID`.
    pub id: String,
    /// The XML as sent.
    pub xml: String,
}

/// Everything a validator needs besides the message itself.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// SP and IdP configuration.
    pub settings: &'a Settings,
    /// Reference time for validity windows.
    pub now: DateTime<Utc>,
    /// Verifier for enveloped XML signatures, if one is configured.
    pub xml_verifier: Option<&'a dyn XmlSignatureVerifier>,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context evaluated at the current time.
    #[must_use]
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            now: Utc::now(),
            xml_verifier: None,
        }
    }

    /// Uses `verifier` for enveloped XML signatures.
    #[must_use]
    pub fn with_xml_verifier(mut self, verifier: Option<&'a dyn XmlSignatureVerifier>) -> Self {
        self.xml_verifier = verifier;
        self
    }

    /// Evaluates validity windows at `now`.
    #[must_use]
    pub const fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub(crate) fn drift(&self) -> Duration {
        let secs = u32::try_from(self.settings.security.allowed_clock_drift_secs).unwrap_or(u32::MAX);
        Duration::seconds(i64::from(secs))
    }

    pub(crate) fn strict(&self) -> bool {
        self.settings.strict
    }

    pub(crate) fn check_issuer(&self, issuer: Option<String>) -> Result<(), ValidationError> {
        match issuer {
            Some(actual) if actual != self.settings.idp.entity_id => {
                Err(ValidationError::InvalidIssuer {
                    expected: self.settings.idp.entity_id.clone(),
                    actual,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Checks `Destination` against the SP's logout endpoint, falling back to
/// the URL the message actually arrived at.
fn check_logout_destination(
    ctx: &ValidationContext<'_>,
    request: &RequestContext,
    destination: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(actual) = destination.filter(|d| !d.is_empty()) else {
        return Ok(());
    };
    let expected = ctx
        .settings
        .sp
        .single_logout_service_url
        .clone()
        .or_else(|| request.current_url.clone());

    match expected {
        Some(expected) if expected != actual => Err(ValidationError::InvalidDestination {
            expected,
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Verifies the detached signature of a redirect-bound logout message.
///
/// With `retrieve_parameters_from_server` the canonical string is rebuilt
/// from the raw query values exactly as received, otherwise from the
/// decoded values re-encoded under the configured encoding.
fn check_redirect_signature(
    ctx: &ValidationContext<'_>,
    request: &RequestContext,
    message_type: SamlMessageType,
    retrieve_parameters_from_server: bool,
    what: &'static str,
) -> Result<(), ValidationError> {
    let Some(signature) = request.signature.as_deref() else {
        if ctx.settings.security.want_messages_signed {
            return Err(ValidationError::MissingSignature(what));
        }
        return Ok(());
    };

    let sig_alg = request
        .sig_alg
        .as_deref()
        .ok_or(ValidationError::MissingElement("SigAlg"))?;

    let param = message_type.form_param();
    let signed = if retrieve_parameters_from_server {
        let message = request
            .raw_param(param)
            .ok_or(ValidationError::MissingElement("raw query parameters"))?;
        let raw_sig_alg = request
            .raw_param("SigAlg")
            .ok_or(ValidationError::MissingElement("raw query parameters"))?;
        assemble_signed_query(message_type, message, request.raw_param("RelayState"), raw_sig_alg)
    } else {
        let message = match message_type {
            SamlMessageType::Request => request.saml_request.as_deref(),
            SamlMessageType::Response => request.saml_response.as_deref(),
        }
        .ok_or(ValidationError::MissingElement("message parameter"))?;
        signed_query(
            message_type,
            message,
            request.relay_state.as_deref(),
            sig_alg,
            UrlEncoding::from_policy(ctx.settings.security.lowercase_url_encoding),
        )
    };

    RedirectSignatureValidator::from_certificates(&ctx.settings.idp.x509_certs)?
        .validate(&signed, signature, sig_alg)
}
