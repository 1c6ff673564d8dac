//! LogoutRequest builder and validator.

use tracing::debug;

use crate::bindings::{HttpRedirectBinding, SamlMessageType};
use crate::context::RequestContext;
use crate::error::{SamlError, SamlResult, ValidationError};
use crate::settings::Settings;
use crate::types::{LogoutRequest, NameId, NameIdFormat, SAMLP_NS, SAML_NS};

use super::{check_logout_destination, check_redirect_signature, xml, BuiltMessage, ValidationContext};

/// Subject of an outbound `LogoutRequest`, already resolved by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutRequestOptions {
    /// NameID value. `None` falls back to the SP entity ID.
    pub name_id: Option<String>,
    /// NameID format URI.
    pub name_id_format: Option<String>,
    /// NameID `NameQualifier`.
    pub name_id_name_qualifier: Option<String>,
    /// NameID `SPNameQualifier`.
    pub name_id_sp_name_qualifier: Option<String>,
    /// Session to terminate at the IdP.
    pub session_index: Option<String>,
}

/// Builds a `LogoutRequest` for the IdP's SLO endpoint.
pub fn build_logout_request(
    settings: &Settings,
    options: &LogoutRequestOptions,
) -> SamlResult<BuiltMessage> {
    let destination = settings
        .idp
        .single_logout_service_url
        .as_deref()
        .ok_or(SamlError::SloNotSupported)?;

    let name_id = match options.name_id {
        Some(ref value) => {
            let format = options
                .name_id_format
                .clone()
                .or_else(|| Some(settings.sp.name_id_format.clone()))
                .filter(|f| f.as_str() != NameIdFormat::Unspecified.uri() && !f.is_empty());
            NameId {
                value: value.clone(),
                format,
                name_qualifier: options.name_id_name_qualifier.clone(),
                sp_name_qualifier: options.name_id_sp_name_qualifier.clone(),
            }
        }
        None => NameId::new(&settings.sp.entity_id).with_format(NameIdFormat::Entity.uri()),
    };

    let mut request = LogoutRequest::new(&settings.sp.entity_id, destination, name_id);
    if let Some(ref index) = options.session_index {
        request = request.with_session_index(index);
    }

    let xml = request.to_xml();
    let encoded = HttpRedirectBinding::encode_message(&xml, settings.compress.requests)?;
    debug!("Built LogoutRequest {} for {destination}", request.id);

    Ok(BuiltMessage {
        encoded,
        id: request.id,
        xml,
    })
}

/// What an accepted `LogoutRequest` asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutRequestClaims {
    /// The request `ID`.
    pub id: String,
    /// The issuing entity.
    pub issuer: Option<String>,
    /// The subject to log out.
    pub name_id: NameId,
    /// Sessions to terminate.
    pub session_indexes: Vec<String>,
}

/// Validates an inbound redirect-bound `LogoutRequest`.
#[derive(Debug, Clone)]
pub struct LogoutRequestValidator {
    decoded: Result<String, ValidationError>,
}

impl LogoutRequestValidator {
    /// Decodes the `SAMLRequest` parameter value.
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

    /// Validates the request and returns its claims.
    pub fn validate(
        &self,
        ctx: &ValidationContext<'_>,
        request: &RequestContext,
        retrieve_parameters_from_server: bool,
    ) -> Result<LogoutRequestClaims, ValidationError> {
        let xml = self.decoded.as_deref().map_err(Clone::clone)?;
        let doc = xml::parse(xml)?;
        let root = xml::protocol_root(&doc, "LogoutRequest")?;
        let id = root.attribute("ID").unwrap_or_default().to_string();

        if xml::child(root, SAML_NS, "EncryptedID").is_some() {
            return Err(ValidationError::Encrypted("NameID"));
        }
        let name_id = xml::child(root, SAML_NS, "NameID")
            .map(xml::name_id)
            .ok_or(ValidationError::MissingElement("NameID"))?;

        let issuer = xml::issuer(root);

        if ctx.strict() {
            check_logout_destination(ctx, request, root.attribute("Destination"))?;
            ctx.check_issuer(issuer.clone())?;
            let not_on_or_after = xml::instant_attr(root, "NotOnOrAfter")?;
            xml::check_window(None, not_on_or_after, ctx.now, ctx.drift())?;
        }

        check_redirect_signature(
            ctx,
            request,
            SamlMessageType::Request,
            retrieve_parameters_from_server,
            "logout request",
        )?;

        Ok(LogoutRequestClaims {
            id,
            issuer,
            name_id,
            session_indexes: xml::children(root, SAMLP_NS, "SessionIndex")
                .filter_map(xml::text)
                .collect(),
        })
    }
}
