//! Canonical signed-query construction for the HTTP-Redirect binding.
//!
//! The IdP recomputes exactly this byte sequence, so parameter order, names
//! and percent-encoding are fixed:
//!
//! ```text
//! SAMLRequest=<enc>[&RelayState=<enc>]&SigAlg=<enc>
//! ```
//!
//! The RelayState segment is left out entirely when there is no RelayState.

use base64::Engine;

use crate::bindings::{SamlMessageType, UrlEncoding};
use crate::error::SamlResult;

use super::{KeySigner, SignatureAlgorithm};

/// Builds the canonical string to sign from unencoded values.
///
/// `message` is the base64 message as placed in the query parameter, before
/// percent-encoding.
#[must_use]
pub fn signed_query(
    message_type: SamlMessageType,
    message: &str,
    relay_state: Option<&str>,
    sig_alg: &str,
    encoding: UrlEncoding,
) -> String {
    let relay_state = relay_state.map(|rs| encoding.encode(rs));
    assemble_signed_query(
        message_type,
        &encoding.encode(message),
        relay_state.as_deref(),
        &encoding.encode(sig_alg),
    )
}

/// Joins already percent-encoded pieces into the canonical string.
///
/// Used directly when verifying against the raw, as-received query values.
#[must_use]
pub fn assemble_signed_query(
    message_type: SamlMessageType,
    encoded_message: &str,
    encoded_relay_state: Option<&str>,
    encoded_sig_alg: &str,
) -> String {
    let mut query = format!("{}={encoded_message}", message_type.form_param());
    if let Some(rs) = encoded_relay_state {
        query.push_str("&RelayState=");
        query.push_str(rs);
    }
    query.push_str("&SigAlg=");
    query.push_str(encoded_sig_alg);
    query
}

/// Signs the canonical string and returns the base64 signature.
pub fn build_signature(
    signer: &dyn KeySigner,
    message_type: SamlMessageType,
    message: &str,
    relay_state: Option<&str>,
    algorithm: SignatureAlgorithm,
    encoding: UrlEncoding,
) -> SamlResult<String> {
    let to_sign = signed_query(message_type, message, relay_state, algorithm.uri(), encoding);
    let signature = signer.sign(to_sign.as_bytes(), algorithm)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(signature))
}
