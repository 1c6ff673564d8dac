//! Service provider settings.
//!
//! Settings are loaded once (from TOML or built in code), validated, and
//! then shared read-only as `Arc<Settings>` by every exchange.
//!
//! ```toml
//! strict = true
//!
//! [sp]
//! entity_id = "https://sp.example.com/metadata"
//! assertion_consumer_service_url = "https://sp.example.com/acs"
//! single_logout_service_url = "https://sp.example.com/sls"
//!
//! [idp]
//! entity_id = "https://idp.example.com/metadata"
//! single_sign_on_service_url = "https://idp.example.com/sso"
//! single_logout_service_url = "https://idp.example.com/slo"
//! x509_certs = ["MIIC..."]
//!
//! [security]
//! authn_requests_signed = true
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SamlError, SamlResult};
use crate::signature::SignatureAlgorithm;
use crate::types::NameIdFormat;

/// Complete service provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enforce destination, issuer, audience, InResponseTo and time checks.
    #[serde(default = "default_true")]
    pub strict: bool,

    /// This service provider.
    pub sp: SpSettings,

    /// The identity provider.
    pub idp: IdpSettings,

    /// Signing and validation policy.
    #[serde(default)]
    pub security: SecuritySettings,

    /// Outbound message compression.
    #[serde(default)]
    pub compress: CompressSettings,
}

/// Service provider identity and endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpSettings {
    /// SP entity ID, used as `Issuer` and expected `Audience`.
    pub entity_id: String,

    /// Assertion Consumer Service URL (HTTP-POST).
    pub assertion_consumer_service_url: String,

    /// Single Logout Service URL (HTTP-Redirect).
    #[serde(default)]
    pub single_logout_service_url: Option<String>,

    /// Requested NameID format URI.
    #[serde(default = "default_name_id_format")]
    pub name_id_format: String,

    /// SP certificate (PEM).
    #[serde(default)]
    pub x509_cert: Option<String>,

    /// SP private key (PEM), used to sign outbound redirect messages.
    #[serde(default)]
    pub private_key: Option<String>,
}

impl Default for SpSettings {
    fn default() -> Self {
        Self {
            entity_id: String::new(),
            assertion_consumer_service_url: String::new(),
            single_logout_service_url: None,
            name_id_format: default_name_id_format(),
            x509_cert: None,
            private_key: None,
        }
    }
}

impl fmt::Debug for SpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpSettings")
            .field("entity_id", &self.entity_id)
            .field(
                "assertion_consumer_service_url",
                &self.assertion_consumer_service_url,
            )
            .field("single_logout_service_url", &self.single_logout_service_url)
            .field("name_id_format", &self.name_id_format)
            .field("x509_cert", &self.x509_cert.as_ref().map(|_| "[PEM]"))
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Identity provider identity, endpoints and certificates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdpSettings {
    /// IdP entity ID, the expected `Issuer` of inbound messages.
    pub entity_id: String,

    /// Single Sign-On endpoint (HTTP-Redirect).
    pub single_sign_on_service_url: String,

    /// Single Logout endpoint (HTTP-Redirect). SLO is unavailable without it.
    #[serde(default)]
    pub single_logout_service_url: Option<String>,

    /// Endpoint for LogoutResponses, when it differs from the SLO endpoint.
    #[serde(default)]
    pub single_logout_service_response_url: Option<String>,

    /// Trusted IdP signing certificates (PEM or bare base64 DER).
    #[serde(default)]
    pub x509_certs: Vec<String>,
}

/// Signing requirements and validation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Sign outbound `AuthnRequest`s.
    pub authn_requests_signed: bool,

    /// Sign outbound `LogoutRequest`s.
    pub logout_request_signed: bool,

    /// Sign outbound `LogoutResponse`s.
    pub logout_response_signed: bool,

    /// Require inbound messages to be signed.
    pub want_messages_signed: bool,

    /// Require assertions in SSO responses to be signed.
    pub want_assertions_signed: bool,

    /// Require a NameID in SSO responses.
    pub want_name_id: bool,

    /// Algorithm for outbound signatures.
    pub signature_algorithm: SignatureAlgorithm,

    /// Encode redirect query values per RFC 3986 (space as `%20`, `~` kept)
    /// instead of form encoding (space as `+`). Needed for ADFS.
    pub lowercase_url_encoding: bool,

    /// AuthnContextClassRef values to request. Empty means none requested.
    pub requested_authn_context: Vec<String>,

    /// Tolerated clock skew for time-window checks, in seconds.
    pub allowed_clock_drift_secs: u64,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            authn_requests_signed: false,
            logout_request_signed: false,
            logout_response_signed: false,
            want_messages_signed: false,
            want_assertions_signed: false,
            want_name_id: true,
            signature_algorithm: SignatureAlgorithm::default(),
            lowercase_url_encoding: false,
            requested_authn_context: Vec::new(),
            allowed_clock_drift_secs: 180,
        }
    }
}

/// DEFLATE compression of outbound redirect messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressSettings {
    /// Compress `AuthnRequest`s and `LogoutRequest`s.
    pub requests: bool,

    /// Compress `LogoutResponse`s.
    pub responses: bool,
}

impl Default for CompressSettings {
    fn default() -> Self {
        Self {
            requests: true,
            responses: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_name_id_format() -> String {
    NameIdFormat::Unspecified.uri().to_string()
}

impl Settings {
    /// Creates strict settings with default security and compression policy.
    #[must_use]
    pub fn new(sp: SpSettings, idp: IdpSettings) -> Self {
        Self {
            strict: true,
            sp,
            idp,
            security: SecuritySettings::default(),
            compress: CompressSettings::default(),
        }
    }

    /// Parses and validates settings from a TOML document.
    pub fn from_toml_str(content: &str) -> SamlResult<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| SamlError::InvalidSettings(format!("failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads and validates settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SamlResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SamlError::InvalidSettings(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks that the settings are complete and consistent.
    pub fn validate(&self) -> SamlResult<()> {
        require_non_empty("sp.entity_id", &self.sp.entity_id)?;
        require_non_empty("idp.entity_id", &self.idp.entity_id)?;
        require_url(
            "sp.assertion_consumer_service_url",
            &self.sp.assertion_consumer_service_url,
        )?;
        require_url(
            "idp.single_sign_on_service_url",
            &self.idp.single_sign_on_service_url,
        )?;

        if let Some(ref url) = self.sp.single_logout_service_url {
            require_url("sp.single_logout_service_url", url)?;
        }
        if let Some(ref url) = self.idp.single_logout_service_url {
            require_url("idp.single_logout_service_url", url)?;
        }
        if let Some(ref url) = self.idp.single_logout_service_response_url {
            require_url("idp.single_logout_service_response_url", url)?;
        }

        if self.idp.x509_certs.is_empty()
            && (self.security.want_messages_signed || self.security.want_assertions_signed)
        {
            return Err(SamlError::InvalidSettings(
                "signed messages or assertions are required but no IdP certificate is configured"
                    .to_string(),
            ));
        }

        let alg = self.security.signature_algorithm;
        if alg.rsa().is_none() && self.signs_anything() {
            return Err(SamlError::InvalidSettings(format!(
                "unsupported signature algorithm for signing: {alg}"
            )));
        }

        Ok(())
    }

    /// URL for outbound LogoutResponses: the dedicated response endpoint if
    /// configured, else the SLO endpoint.
    #[must_use]
    pub fn idp_slo_response_url(&self) -> Option<&str> {
        self.idp
            .single_logout_service_response_url
            .as_deref()
            .or(self.idp.single_logout_service_url.as_deref())
    }

    fn signs_anything(&self) -> bool {
        self.security.authn_requests_signed
            || self.security.logout_request_signed
            || self.security.logout_response_signed
    }
}

fn require_non_empty(field: &str, value: &str) -> SamlResult<()> {
    if value.trim().is_empty() {
        return Err(SamlError::InvalidSettings(format!("{field} is required")));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> SamlResult<()> {
    require_non_empty(field, value)?;
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| SamlError::InvalidSettings(format!("{field} is not a valid URL: {e}")))
}
