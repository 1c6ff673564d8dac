//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::Mutex;

use sp_saml::bindings::HttpRedirectBinding;
use sp_saml::settings::{IdpSettings, SpSettings};
use sp_saml::{
    KeySigner, NameIdFormat, SamlResult, ServiceProvider, Settings, SignatureAlgorithm,
    ValidationError, XmlSignatureVerifier,
};

pub const SP_ENTITY_ID: &str = "https://sp.example.com/metadata";
pub const ACS_URL: &str = "https://sp.example.com/acs";
pub const SP_SLO_URL: &str = "https://sp.example.com/sls";
pub const IDP_ENTITY_ID: &str = "https://idp.example.com/metadata";
pub const IDP_SSO_URL: &str = "https://idp.example.com/sso";
pub const IDP_SLO_URL: &str = "https://idp.example.com/slo";

/// Self-signed IdP certificate and its RSA-2048 key.
pub const IDP_CERT: &str = include_str!("../fixtures/idp-cert.pem");
pub const IDP_KEY: &str = include_str!("../fixtures/idp-key.pem");

pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

/// Initializes tracing once for the test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sp_saml=debug")
        .with_test_writer()
        .try_init();
}

/// Strict settings for one SP and one IdP, nothing signed.
pub fn settings() -> Settings {
    Settings::new(
        SpSettings {
            entity_id: SP_ENTITY_ID.to_string(),
            assertion_consumer_service_url: ACS_URL.to_string(),
            single_logout_service_url: Some(SP_SLO_URL.to_string()),
            name_id_format: NameIdFormat::Email.uri().to_string(),
            ..SpSettings::default()
        },
        IdpSettings {
            entity_id: IDP_ENTITY_ID.to_string(),
            single_sign_on_service_url: IDP_SSO_URL.to_string(),
            single_logout_service_url: Some(IDP_SLO_URL.to_string()),
            x509_certs: vec!["MIIB".to_string()],
            ..IdpSettings::default()
        },
    )
}

/// A service provider that trusts every enveloped XML signature.
pub fn service_provider(settings: Settings) -> anyhow::Result<ServiceProvider> {
    init_tracing();
    Ok(ServiceProvider::new(Arc::new(settings))?.with_xml_signature_verifier(Arc::new(AcceptAll)))
}

/// Accepts any enveloped signature.
pub struct AcceptAll;

impl XmlSignatureVerifier for AcceptAll {
    fn verify(
        &self,
        _xml: &str,
        _signed_ids: &[&str],
        _idp_certificates: &[String],
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Records every byte string it is asked to sign.
#[derive(Clone, Default)]
pub struct RecordingSigner {
    signed: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingSigner {
    /// The bytes passed to the last `sign` call, as text.
    pub fn last_signed(&self) -> Option<String> {
        self.signed
            .lock()
            .last()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl KeySigner for RecordingSigner {
    fn sign(&self, data: &[u8], _algorithm: SignatureAlgorithm) -> SamlResult<Vec<u8>> {
        self.signed.lock().push(data.to_vec());
        Ok(b"recorded-signature".to_vec())
    }
}

/// Query parameters of `url` in order, values still percent-encoded.
pub fn raw_params(url: &str) -> Vec<(String, String)> {
    url.split_once('?')
        .map(|(_, query)| query)
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Raw value of the query parameter `name` in `url`.
pub fn raw_param(url: &str, name: &str) -> Option<String> {
    raw_params(url)
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

/// Decodes the redirect-bound message carried in `url` under `name`.
pub fn redirect_message(url: &str, name: &str) -> anyhow::Result<String> {
    let raw = raw_param(url, name).ok_or_else(|| anyhow::anyhow!("{name} missing from {url}"))?;
    let value = urlencoding::decode(&raw)?;
    Ok(HttpRedirectBinding::decode_message(&value)?)
}

fn instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn redirect_encode(xml: &str) -> anyhow::Result<String> {
    let encoded = HttpRedirectBinding::encode_message(xml, true)?;
    Ok(urlencoding::encode(&encoded).into_owned())
}

/// An IdP `Response` for the POST binding.
pub struct SsoResponse {
    pub in_response_to: Option<String>,
    pub status: &'static str,
    pub audience: &'static str,
    pub signed: bool,
    pub valid_for: Duration,
}

impl Default for SsoResponse {
    fn default() -> Self {
        Self {
            in_response_to: None,
            status: SUCCESS,
            audience: SP_ENTITY_ID,
            signed: true,
            valid_for: Duration::minutes(5),
        }
    }
}

impl SsoResponse {
    /// Answers the `AuthnRequest` with the given ID.
    pub fn answering(request_id: &str) -> Self {
        Self {
            in_response_to: Some(request_id.to_string()),
            ..Self::default()
        }
    }

    /// The response XML.
    pub fn xml(&self) -> String {
        let now = Utc::now();
        let issued = instant(now);
        let not_before = instant(now - Duration::minutes(1));
        let not_on_or_after = instant(now + self.valid_for);
        let session_not_on_or_after = instant(now + Duration::hours(8));
        let in_response_to = self
            .in_response_to
            .as_deref()
            .map(|id| format!(r#" InResponseTo="{id}""#))
            .unwrap_or_default();
        let signature = if self.signed {
            r##"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:SignedInfo><ds:Reference URI="#_assertion-1"/></ds:SignedInfo></ds:Signature>"##
        } else {
            ""
        };

        format!(
            r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_resp-sso" Version="2.0" IssueInstant="{issued}" Destination="{ACS_URL}"{in_response_to}><saml:Issuer>{IDP_ENTITY_ID}</saml:Issuer><samlp:Status><samlp:StatusCode Value="{status}"/></samlp:Status><saml:Assertion ID="_assertion-1" Version="2.0" IssueInstant="{issued}"><saml:Issuer>{IDP_ENTITY_ID}</saml:Issuer>{signature}<saml:Subject><saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress" NameQualifier="{IDP_ENTITY_ID}" SPNameQualifier="{SP_ENTITY_ID}">jdoe@example.com</saml:NameID><saml:SubjectConfirmation Method="urn:oasis:names:tc:SAML:2.0:cm:bearer"><saml:SubjectConfirmationData NotOnOrAfter="{not_on_or_after}" Recipient="{ACS_URL}"{in_response_to}/></saml:SubjectConfirmation></saml:Subject><saml:Conditions NotBefore="{not_before}" NotOnOrAfter="{not_on_or_after}"><saml:AudienceRestriction><saml:Audience>{audience}</saml:Audience></saml:AudienceRestriction></saml:Conditions><saml:AuthnStatement AuthnInstant="{issued}" SessionIndex="_session-1" SessionNotOnOrAfter="{session_not_on_or_after}"/><saml:AttributeStatement><saml:Attribute Name="urn:oid:0.9.2342.19200300.100.1.1" FriendlyName="uid"><saml:AttributeValue>jdoe</saml:AttributeValue></saml:Attribute><saml:Attribute Name="groups"><saml:AttributeValue>admins</saml:AttributeValue><saml:AttributeValue>users</saml:AttributeValue></saml:Attribute></saml:AttributeStatement></saml:Assertion></samlp:Response>"#,
            status = self.status,
            audience = self.audience,
        )
    }

    /// The `application/x-www-form-urlencoded` POST body carrying the response.
    pub fn post_form(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.xml());
        format!("SAMLResponse={}", urlencoding::encode(&encoded))
    }
}

/// Query string of an IdP-initiated `LogoutRequest` for `jdoe@example.com`.
pub fn logout_request_query(id: &str, relay_state: Option<&str>) -> anyhow::Result<String> {
    let xml = format!(
        r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{id}" Version="2.0" IssueInstant="{issued}" Destination="{SP_SLO_URL}"><saml:Issuer>{IDP_ENTITY_ID}</saml:Issuer><saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">jdoe@example.com</saml:NameID><samlp:SessionIndex>_session-1</samlp:SessionIndex></samlp:LogoutRequest>"#,
        issued = instant(Utc::now()),
    );
    let mut query = format!("SAMLRequest={}", redirect_encode(&xml)?);
    if let Some(rs) = relay_state {
        query.push_str("&RelayState=");
        query.push_str(&urlencoding::encode(rs));
    }
    Ok(query)
}

/// Query string of an IdP `LogoutResponse` to the request `in_response_to`.
pub fn logout_response_query(in_response_to: &str, status: &str) -> anyhow::Result<String> {
    let xml = format!(
        r#"<samlp:LogoutResponse xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_logout-resp-1" Version="2.0" IssueInstant="{issued}" Destination="{SP_SLO_URL}" InResponseTo="{in_response_to}"><saml:Issuer>{IDP_ENTITY_ID}</saml:Issuer><samlp:Status><samlp:StatusCode Value="{status}"/></samlp:Status></samlp:LogoutResponse>"#,
        issued = instant(Utc::now()),
    );
    Ok(format!("SAMLResponse={}", redirect_encode(&xml)?))
}

/// Signs a redirect query with the IdP key: appends `SigAlg`, then a
/// `Signature` over the query as it stands.
pub fn idp_sign_query(query: &str) -> anyhow::Result<String> {
    let signed = format!(
        "{query}&SigAlg={}",
        urlencoding::encode(SignatureAlgorithm::RsaSha256.uri())
    );
    let key = sp_crypto::private_key_der(IDP_KEY)?;
    let signature = sp_crypto::rsa_sign(&key, signed.as_bytes(), sp_crypto::RsaAlgorithm::Rs256)?;
    let signature = base64::engine::general_purpose::STANDARD.encode(signature);
    Ok(format!("{signed}&Signature={}", urlencoding::encode(&signature)))
}
