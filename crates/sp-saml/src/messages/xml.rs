//! Small roxmltree helpers shared by the inbound message validators.

use chrono::{DateTime, Duration, Utc};
use roxmltree::{Document, Node};

use crate::error::ValidationError;
use crate::types::{parse_instant, NameId, Status, StatusCode, SAMLP_NS, SAML_NS, XMLDSIG_NS};

/// Parses `xml`. DTDs are rejected by roxmltree's default options.
pub(crate) fn parse(xml: &str) -> Result<Document<'_>, ValidationError> {
    Ok(Document::parse(xml)?)
}

/// Returns the root element if it is `samlp:<name>` with version 2.0.
pub(crate) fn protocol_root<'a, 'input>(
    doc: &'a Document<'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, ValidationError> {
    let root = doc.root_element();
    if !root.has_tag_name((SAMLP_NS, name)) {
        return Err(ValidationError::UnexpectedRoot {
            expected: name,
            actual: root.tag_name().name().to_string(),
        });
    }

    match root.attribute("Version") {
        Some("2.0") => {}
        Some(other) => return Err(ValidationError::UnsupportedVersion(other.to_string())),
        None => return Err(ValidationError::MissingElement("Version")),
    }

    if matches!(root.attribute("ID"), None | Some("")) {
        return Err(ValidationError::MissingElement("ID"));
    }

    Ok(root)
}

/// First child element `ns:name`.
pub(crate) fn child<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((ns, name)))
}

/// All child elements `ns:name`.
pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    ns: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name((ns, name)))
}

/// Trimmed text content of `node`, if non-empty.
pub(crate) fn text(node: Node<'_, '_>) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Text of the `saml:Issuer` child.
pub(crate) fn issuer(node: Node<'_, '_>) -> Option<String> {
    child(node, SAML_NS, "Issuer").and_then(text)
}

/// True if `node` has an enveloped `ds:Signature` child.
pub(crate) fn is_signed(node: Node<'_, '_>) -> bool {
    child(node, XMLDSIG_NS, "Signature").is_some()
}

/// Parses an optional `xs:dateTime` attribute.
pub(crate) fn instant_attr(
    node: Node<'_, '_>,
    name: &str,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    node.attribute(name)
        .map(|value| {
            parse_instant(value)
                .ok_or_else(|| ValidationError::InvalidTimestamp(format!("{name}={value}")))
        })
        .transpose()
}

/// Checks `[not_before, not_on_or_after)` against `now`, widened by `drift`.
pub(crate) fn check_window(
    not_before: Option<DateTime<Utc>>,
    not_on_or_after: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    drift: Duration,
) -> Result<(), ValidationError> {
    if not_before.is_some_and(|nb| nb > now + drift) {
        return Err(ValidationError::NotYetValid);
    }
    if not_on_or_after.is_some_and(|noa| noa + drift <= now) {
        return Err(ValidationError::Expired);
    }
    Ok(())
}

/// Parses the mandatory `samlp:Status` child.
pub(crate) fn status(root: Node<'_, '_>) -> Result<Status, ValidationError> {
    let status = child(root, SAMLP_NS, "Status").ok_or(ValidationError::MissingElement("Status"))?;
    let code = child(status, SAMLP_NS, "StatusCode")
        .ok_or(ValidationError::MissingElement("StatusCode"))?;
    let value = code
        .attribute("Value")
        .ok_or(ValidationError::MissingElement("StatusCode Value"))?;

    let mut status_code = StatusCode::new(value);
    if let Some(sub) = child(code, SAMLP_NS, "StatusCode").and_then(|n| n.attribute("Value")) {
        status_code = status_code.with_sub_status(StatusCode::new(sub));
    }

    Ok(Status {
        status_code,
        status_message: child(status, SAMLP_NS, "StatusMessage").and_then(text),
    })
}

/// Parses a `saml:NameID` element.
pub(crate) fn name_id(node: Node<'_, '_>) -> NameId {
    NameId {
        value: text(node).unwrap_or_default(),
        format: node.attribute("Format").map(str::to_string),
        name_qualifier: node.attribute("NameQualifier").map(str::to_string),
        sp_name_qualifier: node.attribute("SPNameQualifier").map(str::to_string),
    }
}
