//! SAML Name ID types.
//!
//! Name identifiers are used to identify subjects in SAML assertions and
//! logout requests.

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use super::NameIdFormat;

/// SAML Name ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameId {
    /// The actual identifier value.
    pub value: String,

    /// The format URI of the name identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// The security or administrative domain that qualifies the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_qualifier: Option<String>,

    /// The service provider's entity ID that qualifies the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,
}

impl NameId {
    /// Creates a new name ID with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Sets the format for this name ID.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the name qualifier.
    #[must_use]
    pub fn with_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.name_qualifier = Some(qualifier.into());
        self
    }

    /// Sets the SP name qualifier.
    #[must_use]
    pub fn with_sp_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.sp_name_qualifier = Some(qualifier.into());
        self
    }

    /// Returns the parsed name ID format.
    #[must_use]
    pub fn parsed_format(&self) -> NameIdFormat {
        self.format
            .as_deref()
            .and_then(NameIdFormat::from_uri)
            .unwrap_or_default()
    }

    /// Serializes this name ID as a `saml:NameID` element.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut attrs = String::new();
        if let Some(ref qualifier) = self.name_qualifier {
            attrs.push_str(&format!(r#" NameQualifier="{}""#, escape(qualifier)));
        }
        if let Some(ref qualifier) = self.sp_name_qualifier {
            attrs.push_str(&format!(r#" SPNameQualifier="{}""#, escape(qualifier)));
        }
        if let Some(ref format) = self.format {
            attrs.push_str(&format!(r#" Format="{}""#, escape(format)));
        }
        format!("<saml:NameID{attrs}>{}</saml:NameID>", escape(&self.value))
    }
}

/// Name ID policy for authentication requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameIdPolicy {
    /// The requested name ID format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Whether a new identifier may be created for this request.
    #[serde(default)]
    pub allow_create: bool,
}

impl NameIdPolicy {
    /// Creates a policy requesting a specific format URI.
    ///
    /// `AllowCreate` is requested for every format except `entity`, which
    /// does not permit it.
    #[must_use]
    pub fn for_format(format: impl Into<String>) -> Self {
        let format = format.into();
        let allow_create = NameIdFormat::from_uri(&format) != Some(NameIdFormat::Entity);
        Self {
            format: Some(format),
            allow_create,
        }
    }

    /// Serializes this policy as a `samlp:NameIDPolicy` element.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut attrs = String::new();
        if let Some(ref format) = self.format {
            attrs.push_str(&format!(r#" Format="{}""#, escape(format)));
        }
        if self.allow_create {
            attrs.push_str(r#" AllowCreate="true""#);
        }
        format!("<samlp:NameIDPolicy{attrs} />")
    }
}
