//! SAML Logout types.
//!
//! Single Logout (SLO) request and response messages issued by the SP.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use super::{format_instant, generate_id, NameId, Status, SAMLP_NS, SAML_NS};

/// SAML Logout Request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Unique identifier for this request.
    pub id: String,

    /// Timestamp when this request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the requester.
    pub issuer: String,

    /// The IdP endpoint this request is sent to.
    pub destination: String,

    /// The name identifier of the principal to log out.
    pub name_id: NameId,

    /// Session indexes to terminate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_indexes: Vec<String>,
}

impl LogoutRequest {
    /// Creates a new logout request.
    #[must_use]
    pub fn new(issuer: impl Into<String>, destination: impl Into<String>, name_id: NameId) -> Self {
        Self {
            id: generate_id(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            destination: destination.into(),
            name_id,
            session_indexes: Vec::new(),
        }
    }

    /// Adds a session index to terminate.
    #[must_use]
    pub fn with_session_index(mut self, index: impl Into<String>) -> Self {
        self.session_indexes.push(index.into());
        self
    }

    /// Renders the request as XML.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let indexes: String = self
            .session_indexes
            .iter()
            .map(|i| format!("<samlp:SessionIndex>{}</samlp:SessionIndex>", escape(i)))
            .collect();
        format!(
            r#"<samlp:LogoutRequest xmlns:samlp="{SAMLP_NS}" xmlns:saml="{SAML_NS}" ID="{id}" Version="2.0" IssueInstant="{instant}" Destination="{destination}"><saml:Issuer>{issuer}</saml:Issuer>{name_id}{indexes}</samlp:LogoutRequest>"#,
            id = escape(&self.id),
            instant = format_instant(&self.issue_instant),
            destination = escape(&self.destination),
            issuer = escape(&self.issuer),
            name_id = self.name_id.to_xml(),
        )
    }
}

/// SAML Logout Response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Unique identifier for this response.
    pub id: String,

    /// Timestamp when this response was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the responder.
    pub issuer: String,

    /// The ID of the request this response is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// The IdP endpoint this response is sent to.
    pub destination: String,

    /// The status of the response.
    pub status: Status,
}

impl LogoutResponse {
    /// Creates a new logout response with the given status.
    #[must_use]
    pub fn new(issuer: impl Into<String>, destination: impl Into<String>, status: Status) -> Self {
        Self {
            id: generate_id(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            in_response_to: None,
            destination: destination.into(),
            status,
        }
    }

    /// Sets the request ID this response is for.
    #[must_use]
    pub fn in_response_to(mut self, request_id: impl Into<String>) -> Self {
        self.in_response_to = Some(request_id.into());
        self
    }

    /// Returns true if this response indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Renders the response as XML.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let in_response_to = self
            .in_response_to
            .as_deref()
            .map(|irt| format!(r#" InResponseTo="{}""#, escape(irt)))
            .unwrap_or_default();
        format!(
            r#"<samlp:LogoutResponse xmlns:samlp="{SAMLP_NS}" xmlns:saml="{SAML_NS}" ID="{id}" Version="2.0" IssueInstant="{instant}" Destination="{destination}"{in_response_to}><saml:Issuer>{issuer}</saml:Issuer>{status}</samlp:LogoutResponse>"#,
            id = escape(&self.id),
            instant = format_instant(&self.issue_instant),
            destination = escape(&self.destination),
            issuer = escape(&self.issuer),
            status = self.status.to_xml(),
        )
    }
}
