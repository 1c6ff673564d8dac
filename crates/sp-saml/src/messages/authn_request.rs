//! AuthnRequest builder.

use tracing::debug;

use crate::bindings::HttpRedirectBinding;
use crate::error::SamlResult;
use crate::settings::Settings;
use crate::types::{AuthnRequest, NameIdPolicy, RequestedAuthnContext};

use super::BuiltMessage;

/// Per-call knobs for an `AuthnRequest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthnRequestOptions {
    /// Ask the IdP to re-authenticate the user.
    pub force_authn: bool,
    /// Ask the IdP not to interact with the user.
    pub is_passive: bool,
    /// Include a `NameIDPolicy` for the SP's configured format.
    pub set_name_id_policy: bool,
}

/// Builds an `AuthnRequest` for the IdP's SSO endpoint.
pub fn build_authn_request(
    settings: &Settings,
    options: AuthnRequestOptions,
) -> SamlResult<BuiltMessage> {
    let mut request = AuthnRequest::new(
        &settings.sp.entity_id,
        &settings.idp.single_sign_on_service_url,
        &settings.sp.assertion_consumer_service_url,
    )
    .force_authn(options.force_authn)
    .is_passive(options.is_passive);

    if options.set_name_id_policy {
        request = request.with_name_id_policy(NameIdPolicy::for_format(&settings.sp.name_id_format));
    }

    if !settings.security.requested_authn_context.is_empty() {
        request = request.with_authn_context(RequestedAuthnContext::exact(
            settings.security.requested_authn_context.iter().cloned(),
        ));
    }

    let xml = request.to_xml();
    let encoded = HttpRedirectBinding::encode_message(&xml, settings.compress.requests)?;
    debug!("Built AuthnRequest {} for {}", request.id, request.destination);

    Ok(BuiltMessage {
        encoded,
        id: request.id,
        xml,
    })
}
