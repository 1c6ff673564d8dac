//! SSO `Response` validator.
//!
//! Checks performed, in order:
//!
//! 1. Structure: `samlp:Response`, version, ID, status
//! 2. Exactly one plaintext assertion (encrypted content is rejected)
//! 3. Signatures: required ones present, present ones verified
//! 4. In strict mode: destination, InResponseTo, issuers, audience, time
//!    windows and a usable bearer subject confirmation
//! 5. Subject, attributes and session data extraction

use chrono::{DateTime, Utc};
use roxmltree::Node;
use tracing::debug;

use crate::bindings::HttpPostBinding;
use crate::error::ValidationError;
use crate::types::{Attributes, NameId, CM_BEARER, SAML_NS, XMLDSIG_NS};

use super::{xml, ValidationContext};

/// What an accepted SSO response asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseClaims {
    /// The response `ID`.
    pub response_id: String,
    /// The assertion `ID`.
    pub assertion_id: String,
    /// The subject, if the assertion names one.
    pub name_id: Option<NameId>,
    /// Attributes keyed by `Name`.
    pub attributes: Attributes,
    /// Attributes keyed by `FriendlyName`.
    pub attributes_with_friendly_name: Attributes,
    /// `SessionIndex` of the first AuthnStatement.
    pub session_index: Option<String>,
    /// `SessionNotOnOrAfter` of the first AuthnStatement.
    pub session_expiration: Option<DateTime<Utc>>,
    /// `NotOnOrAfter` of the accepted bearer confirmation.
    pub assertion_not_on_or_after: Option<DateTime<Utc>>,
}

/// Validates a POST-bound SSO `Response`.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    decoded: Result<String, ValidationError>,
}

impl ResponseValidator {
    /// Decodes the `SAMLResponse` form value.
    #[must_use]
    pub fn new(encoded: &str) -> Self {
        Self {
            decoded: HttpPostBinding::decode_message(encoded).map_err(ValidationError::from),
        }
    }

    /// The decoded XML, if the payload could be decoded.
    #[must_use]
    pub fn xml(&self) -> Option<&str> {
        self.decoded.as_deref().ok()
    }

    /// Validates the response and returns its claims.
    ///
    /// `request_id` is the ID of the `AuthnRequest` this SP sent; `None`
    /// accepts unsolicited responses.
    pub fn validate(
        &self,
        ctx: &ValidationContext<'_>,
        request_id: Option<&str>,
    ) -> Result<ResponseClaims, ValidationError> {
        let raw = self.decoded.as_deref().map_err(Clone::clone)?;
        let doc = xml::parse(raw)?;
        let root = xml::protocol_root(&doc, "Response")?;
        let response_id = root.attribute("ID").unwrap_or_default().to_string();

        let status = xml::status(root)?;
        if !status.is_success() {
            return Err(ValidationError::StatusNotSuccess {
                code: status.status_code.value,
                message: status.status_message,
            });
        }

        if xml::child(root, SAML_NS, "EncryptedAssertion").is_some() {
            return Err(ValidationError::Encrypted("assertion"));
        }
        let assertion = single_assertion(root)?;
        let assertion_id = assertion
            .attribute("ID")
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingElement("Assertion ID"))?
            .to_string();

        check_signatures(ctx, raw, root, assertion)?;

        let subject = xml::child(assertion, SAML_NS, "Subject");
        let mut assertion_not_on_or_after = None;

        if ctx.strict() {
            check_response_envelope(ctx, root, request_id)?;
            ctx.check_issuer(xml::issuer(assertion))?;
            check_conditions(ctx, assertion)?;
            assertion_not_on_or_after = Some(check_bearer_confirmation(ctx, subject, request_id)?);
        } else if let Some(subject) = subject {
            assertion_not_on_or_after = bearer_confirmations(subject)
                .find_map(|data| xml::instant_attr(data, "NotOnOrAfter").ok().flatten());
        }

        let name_id = extract_name_id(ctx, subject)?;
        let (attributes, attributes_with_friendly_name) = extract_attributes(assertion)?;

        let authn_statement = xml::child(assertion, SAML_NS, "AuthnStatement");
        let session_index = authn_statement
            .and_then(|s| s.attribute("SessionIndex"))
            .map(str::to_string);
        let session_expiration = authn_statement
            .map(|s| xml::instant_attr(s, "SessionNotOnOrAfter"))
            .transpose()?
            .flatten();

        if ctx.strict() && session_expiration.is_some_and(|exp| exp + ctx.drift() <= ctx.now) {
            return Err(ValidationError::Expired);
        }

        debug!("Accepted Response {response_id} carrying assertion {assertion_id}");

        Ok(ResponseClaims {
            response_id,
            assertion_id,
            name_id,
            attributes,
            attributes_with_friendly_name,
            session_index,
            session_expiration,
            assertion_not_on_or_after,
        })
    }
}

fn single_assertion<'a, 'input>(
    root: Node<'a, 'input>,
) -> Result<Node<'a, 'input>, ValidationError> {
    let mut assertions = xml::children(root, SAML_NS, "Assertion");
    let first = assertions.next().ok_or(ValidationError::NoAssertion)?;
    if assertions.next().is_some() {
        return Err(ValidationError::MultipleAssertions);
    }
    Ok(first)
}

fn check_signatures<'a, 'input>(
    ctx: &ValidationContext<'_>,
    raw: &str,
    root: Node<'a, 'input>,
    assertion: Node<'a, 'input>,
) -> Result<(), ValidationError> {
    let security = &ctx.settings.security;
    let response_signed = xml::is_signed(root);
    let assertion_signed = xml::is_signed(assertion);

    if security.want_messages_signed && !response_signed {
        return Err(ValidationError::MissingSignature("response"));
    }
    if security.want_assertions_signed && !assertion_signed {
        return Err(ValidationError::MissingSignature("assertion"));
    }
    if !response_signed && !assertion_signed {
        return Err(ValidationError::MissingSignature("response or assertion"));
    }

    let signed_ids = signed_element_ids(root, assertion)?;

    let verifier = ctx.xml_verifier.ok_or_else(|| {
        ValidationError::InvalidSignature("no XML signature verifier configured".to_string())
    })?;
    verifier.verify(raw, &signed_ids, &ctx.settings.idp.x509_certs)
}

/// IDs of the signed elements, after checking that every signature in the
/// document sits on the response or its assertion and references its parent.
fn signed_element_ids<'a, 'input>(
    root: Node<'a, 'input>,
    assertion: Node<'a, 'input>,
) -> Result<Vec<&'a str>, ValidationError> {
    let mut seen_ids = std::collections::HashSet::new();
    for id in root.document().descendants().filter_map(|n| n.attribute("ID")) {
        if !seen_ids.insert(id) {
            return Err(ValidationError::InvalidSignature(format!("duplicated ID {id}")));
        }
    }

    let mut signed_ids = Vec::new();
    for signature in root
        .document()
        .descendants()
        .filter(|n| n.has_tag_name((XMLDSIG_NS, "Signature")))
    {
        let parent = signature
            .parent_element()
            .filter(|p| *p == root || *p == assertion)
            .ok_or_else(|| {
                ValidationError::InvalidSignature("unexpected Signature element".to_string())
            })?;
        let id = parent.attribute("ID").unwrap_or_default();
        if signed_ids.contains(&id) {
            return Err(ValidationError::InvalidSignature(format!(
                "element {id} carries more than one signature"
            )));
        }

        let mut references = xml::child(signature, XMLDSIG_NS, "SignedInfo")
            .into_iter()
            .flat_map(|info| xml::children(info, XMLDSIG_NS, "Reference"));
        let uri = match (references.next(), references.next()) {
            (Some(reference), None) => reference.attribute("URI").unwrap_or_default(),
            _ => {
                return Err(ValidationError::InvalidSignature(
                    "signature must carry exactly one Reference".to_string(),
                ))
            }
        };
        if id.is_empty() || uri.strip_prefix('#') != Some(id) {
            return Err(ValidationError::InvalidSignature(format!(
                "signature reference {uri} does not match signed element {id}"
            )));
        }
        signed_ids.push(id);
    }

    Ok(signed_ids)
}

fn check_response_envelope(
    ctx: &ValidationContext<'_>,
    root: Node<'_, '_>,
    request_id: Option<&str>,
) -> Result<(), ValidationError> {
    let acs = &ctx.settings.sp.assertion_consumer_service_url;
    if let Some(destination) = root.attribute("Destination") {
        if destination != acs {
            return Err(ValidationError::InvalidDestination {
                expected: acs.clone(),
                actual: destination.to_string(),
            });
        }
    }

    let in_response_to = root.attribute("InResponseTo");
    if let Some(expected) = request_id {
        if in_response_to != Some(expected) {
            return Err(ValidationError::InResponseToMismatch {
                expected: expected.to_string(),
                actual: in_response_to.map(str::to_string),
            });
        }
    }

    ctx.check_issuer(xml::issuer(root))
}

fn check_conditions(ctx: &ValidationContext<'_>, assertion: Node<'_, '_>) -> Result<(), ValidationError> {
    let Some(conditions) = xml::child(assertion, SAML_NS, "Conditions") else {
        return Ok(());
    };

    xml::check_window(
        xml::instant_attr(conditions, "NotBefore")?,
        xml::instant_attr(conditions, "NotOnOrAfter")?,
        ctx.now,
        ctx.drift(),
    )?;

    let audiences: Vec<String> = xml::children(conditions, SAML_NS, "AudienceRestriction")
        .flat_map(|r| xml::children(r, SAML_NS, "Audience"))
        .filter_map(xml::text)
        .collect();
    if !audiences.is_empty() && !audiences.contains(&ctx.settings.sp.entity_id) {
        return Err(ValidationError::InvalidAudience(audiences.join(", ")));
    }

    Ok(())
}

fn bearer_confirmations<'a, 'input: 'a>(
    subject: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    xml::children(subject, SAML_NS, "SubjectConfirmation")
        .filter(|sc| sc.attribute("Method") == Some(CM_BEARER))
        .filter_map(|sc| xml::child(sc, SAML_NS, "SubjectConfirmationData"))
}

/// Finds a bearer confirmation that is usable now and returns its
/// `NotOnOrAfter`.
fn check_bearer_confirmation(
    ctx: &ValidationContext<'_>,
    subject: Option<Node<'_, '_>>,
    request_id: Option<&str>,
) -> Result<DateTime<Utc>, ValidationError> {
    let subject = subject.ok_or(ValidationError::MissingElement("Subject"))?;
    let acs = ctx.settings.sp.assertion_consumer_service_url.as_str();

    for data in bearer_confirmations(subject) {
        if data.attribute("Recipient").is_some_and(|r| r != acs) {
            continue;
        }
        if let (Some(expected), Some(actual)) = (request_id, data.attribute("InResponseTo")) {
            if expected != actual {
                continue;
            }
        }
        let Ok(not_on_or_after) = xml::instant_attr(data, "NotOnOrAfter") else {
            continue;
        };
        let Some(not_on_or_after) = not_on_or_after else {
            continue;
        };
        let not_before = xml::instant_attr(data, "NotBefore").ok().flatten();
        if xml::check_window(not_before, Some(not_on_or_after), ctx.now, ctx.drift()).is_err() {
            continue;
        }
        return Ok(not_on_or_after);
    }

    Err(ValidationError::MissingElement("valid bearer SubjectConfirmation"))
}

fn extract_name_id(
    ctx: &ValidationContext<'_>,
    subject: Option<Node<'_, '_>>,
) -> Result<Option<NameId>, ValidationError> {
    if subject.is_some_and(|s| xml::child(s, SAML_NS, "EncryptedID").is_some()) {
        return Err(ValidationError::Encrypted("NameID"));
    }

    let name_id = subject
        .and_then(|s| xml::child(s, SAML_NS, "NameID"))
        .map(xml::name_id);

    match name_id {
        None if ctx.settings.security.want_name_id => Err(ValidationError::MissingElement("NameID")),
        Some(ref id) if ctx.strict() && id.value.is_empty() => {
            Err(ValidationError::MissingElement("NameID value"))
        }
        other => Ok(other),
    }
}

fn extract_attributes(assertion: Node<'_, '_>) -> Result<(Attributes, Attributes), ValidationError> {
    let mut by_name = Attributes::new();
    let mut by_friendly_name = Attributes::new();

    for statement in xml::children(assertion, SAML_NS, "AttributeStatement") {
        if xml::child(statement, SAML_NS, "EncryptedAttribute").is_some() {
            return Err(ValidationError::Encrypted("attribute"));
        }

        for attribute in xml::children(statement, SAML_NS, "Attribute") {
            let name = attribute
                .attribute("Name")
                .ok_or(ValidationError::MissingElement("Attribute Name"))?;
            let values: Vec<String> = xml::children(attribute, SAML_NS, "AttributeValue")
                .map(|v| xml::text(v).unwrap_or_default())
                .collect();

            if let Some(friendly) = attribute.attribute("FriendlyName") {
                if !by_friendly_name.insert(friendly, values.clone()) {
                    return Err(ValidationError::DuplicateAttribute(format!("FriendlyName {friendly}")));
                }
            }
            if !by_name.insert(name, values) {
                return Err(ValidationError::DuplicateAttribute(format!("Name {name}")));
            }
        }
    }

    Ok((by_name, by_friendly_name))
}
