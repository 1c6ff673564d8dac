//! LogoutResponse builder and validator.

use tracing::debug;

use crate::bindings::{HttpRedirectBinding, SamlMessageType};
use crate::context::RequestContext;
use crate::error::{SamlError, SamlResult, ValidationError};
use crate::settings::Settings;
use crate::types::{LogoutResponse, Status};

use super::{check_logout_destination, check_redirect_signature, xml, BuiltMessage, ValidationContext};

/// Builds a `LogoutResponse` answering `in_response_to`.
///
/// Sent to the IdP's SLO response endpoint, or its SLO endpoint when no
/// dedicated response endpoint is configured.
pub fn build_logout_response(
    settings: &Settings,
    in_response_to: &str,
    status: Status,
) -> SamlResult<BuiltMessage> {
    let destination = settings
        .idp_slo_response_url()
        .ok_or(SamlError::SloNotSupported)?;

    let response = LogoutResponse::new(&settings.sp.entity_id, destination, status)
        .in_response_to(in_response_to);

    let xml = response.to_xml();
    let encoded = HttpRedirectBinding::encode_message(&xml, settings.compress.responses)?;
    debug!(
        "Built LogoutResponse {} in response to {in_response_to}",
        response.id
    );

    Ok(BuiltMessage {
        encoded,
        id: response.id,
        xml,
    })
}

/// What an authentic `LogoutResponse` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutResponseClaims {
    /// The response `ID`.
    pub id: String,
    /// The request this answers.
    pub in_response_to: Option<String>,
    /// The issuing entity.
    pub issuer: Option<String>,
    /// The reported outcome. A non-Success status is still a valid message.
    pub status: Status,
}

/// Validates an inbound redirect-bound `LogoutResponse`.
#[derive(Debug, Clone)]
pub struct LogoutResponseValidator {
    decoded: Result<String, ValidationError>,
}

impl LogoutResponseValidator {
    /// Decodes the `SAMLResponse` parameter value.
    #[must_use]
    pub fn new(encoded: &str) -> Self {
        Self {
            decoded: HttpRedirectBinding::decode_message(encoded).map_err(ValidationError::from),
        }
    }

    /// The decoded XML, if the payload could be decoded.
    #[must_use]
    pub fn xml(&self) -> Option<&str> {
        self.decoded.as_deref().ok()
    }

    /// Validates authenticity and correlation, and returns the claims.
    ///
    /// `request_id` is the ID of the `LogoutRequest` this SP sent; `None`
    /// skips the `InResponseTo` check.
    pub fn validate(
        &self,
        ctx: &ValidationContext<'_>,
        request: &RequestContext,
        request_id: Option<&str>,
        retrieve_parameters_from_server: bool,
    ) -> Result<LogoutResponseClaims, ValidationError> {
        let xml = self.decoded.as_deref().map_err(Clone::clone)?;
        let doc = xml::parse(xml)?;
        let root = xml::protocol_root(&doc, "LogoutResponse")?;

        let status = xml::status(root)?;
        let issuer = xml::issuer(root);
        let in_response_to = root.attribute("InResponseTo").map(str::to_string);

        if ctx.strict() {
            if let Some(expected) = request_id {
                if in_response_to.as_deref() != Some(expected) {
                    return Err(ValidationError::InResponseToMismatch {
                        expected: expected.to_string(),
                        actual: in_response_to,
                    });
                }
            }
            check_logout_destination(ctx, request, root.attribute("Destination"))?;
            ctx.check_issuer(issuer.clone())?;
        }

        check_redirect_signature(
            ctx,
            request,
            SamlMessageType::Response,
            retrieve_parameters_from_server,
            "logout response",
        )?;

        Ok(LogoutResponseClaims {
            id: root.attribute("ID").unwrap_or_default().to_string(),
            in_response_to,
            issuer,
            status,
        })
    }
}
