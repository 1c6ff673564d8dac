//! SAML AuthnRequest types.
//!
//! Authentication request message sent by the service provider to the
//! identity provider.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use super::{format_instant, generate_id, NameIdPolicy, SamlBinding, SAMLP_NS, SAML_NS};

/// SAML Authentication Request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthnRequest {
    /// Unique identifier for this request.
    pub id: String,

    /// Timestamp when this request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the service provider issuing the request.
    pub issuer: String,

    /// The URL where the response should be sent.
    pub assertion_consumer_service_url: String,

    /// The IdP endpoint this request is sent to.
    pub destination: String,

    /// Binding the IdP should use for the response.
    pub protocol_binding: String,

    /// Name ID policy constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id_policy: Option<NameIdPolicy>,

    /// Requested authentication context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_authn_context: Option<RequestedAuthnContext>,

    /// Whether the IdP must authenticate the user directly.
    #[serde(default)]
    pub force_authn: bool,

    /// Whether the IdP must not interact with the user.
    #[serde(default)]
    pub is_passive: bool,
}

impl AuthnRequest {
    /// Creates a new authentication request asking for an HTTP-POST response.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        destination: impl Into<String>,
        acs_url: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            assertion_consumer_service_url: acs_url.into(),
            destination: destination.into(),
            protocol_binding: SamlBinding::HttpPost.uri().to_string(),
            name_id_policy: None,
            requested_authn_context: None,
            force_authn: false,
            is_passive: false,
        }
    }

    /// Sets the name ID policy.
    #[must_use]
    pub fn with_name_id_policy(mut self, policy: NameIdPolicy) -> Self {
        self.name_id_policy = Some(policy);
        self
    }

    /// Sets the requested authentication context.
    #[must_use]
    pub fn with_authn_context(mut self, context: RequestedAuthnContext) -> Self {
        self.requested_authn_context = Some(context);
        self
    }

    /// Sets force authentication.
    #[must_use]
    pub const fn force_authn(mut self, force: bool) -> Self {
        self.force_authn = force;
        self
    }

    /// Sets passive authentication.
    #[must_use]
    pub const fn is_passive(mut self, passive: bool) -> Self {
        self.is_passive = passive;
        self
    }

    /// Renders the request as XML.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut flags = String::new();
        if self.force_authn {
            flags.push_str(r#" ForceAuthn="true""#);
        }
        if self.is_passive {
            flags.push_str(r#" IsPassive="true""#);
        }

        let policy = self
            .name_id_policy
            .as_ref()
            .map(NameIdPolicy::to_xml)
            .unwrap_or_default();
        let context = self
            .requested_authn_context
            .as_ref()
            .map(RequestedAuthnContext::to_xml)
            .unwrap_or_default();

        format!(
            r#"<samlp:AuthnRequest xmlns:samlp="{SAMLP_NS}" xmlns:saml="{SAML_NS}" ID="{id}" Version="2.0" IssueInstant="{instant}" Destination="{destination}"{flags} ProtocolBinding="{binding}" AssertionConsumerServiceURL="{acs}"><saml:Issuer>{issuer}</saml:Issuer>{policy}{context}</samlp:AuthnRequest>"#,
            id = escape(&self.id),
            instant = format_instant(&self.issue_instant),
            destination = escape(&self.destination),
            binding = escape(&self.protocol_binding),
            acs = escape(&self.assertion_consumer_service_url),
            issuer = escape(&self.issuer),
        )
    }
}

/// Requested authentication context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedAuthnContext {
    /// Comparison method for the authentication context.
    #[serde(default)]
    pub comparison: AuthnContextComparison,

    /// Acceptable authentication context class references.
    #[serde(default)]
    pub authn_context_class_refs: Vec<String>,
}

impl RequestedAuthnContext {
    /// Creates a context requiring an exact match of one of `class_refs`.
    #[must_use]
    pub fn exact<I, S>(class_refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comparison: AuthnContextComparison::Exact,
            authn_context_class_refs: class_refs.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the comparison method.
    #[must_use]
    pub const fn with_comparison(mut self, comparison: AuthnContextComparison) -> Self {
        self.comparison = comparison;
        self
    }

    fn to_xml(&self) -> String {
        let refs: String = self
            .authn_context_class_refs
            .iter()
            .map(|r| format!("<saml:AuthnContextClassRef>{}</saml:AuthnContextClassRef>", escape(r)))
            .collect();
        format!(
            r#"<samlp:RequestedAuthnContext Comparison="{}">{refs}</samlp:RequestedAuthnContext>"#,
            self.comparison.as_str()
        )
    }
}

/// Authentication context comparison methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthnContextComparison {
    /// Exact match required.
    #[default]
    Exact,
    /// Match must be at least as strong.
    Minimum,
    /// Match must be at most as strong.
    Maximum,
    /// Match must be stronger than any listed.
    Better,
}

impl AuthnContextComparison {
    /// Returns the string value for this comparison.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Better => "better",
        }
    }
}
