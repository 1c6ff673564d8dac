//! SP-initiated SSO: AuthnRequest out, Response in.

use sp_saml::{ErrorCode, LoginOptions, RequestContext, SamlError, ValidationError};

use crate::common::{self, SsoResponse, RESPONDER};

/// Logs in and returns the provider together with the request ID it sent.
fn login(
    settings: sp_saml::Settings,
) -> anyhow::Result<(sp_saml::ServiceProvider, String)> {
    let mut sp = common::service_provider(settings)?;
    sp.login(LoginOptions {
        stay: true,
        ..LoginOptions::default()
    })?;
    let request_id = sp
        .last_request_id()
        .ok_or_else(|| anyhow::anyhow!("no AuthnRequest recorded"))?
        .to_string();
    Ok((sp, request_id))
}

#[test]
fn test_login_url_carries_return_to() -> anyhow::Result<()> {
    let mut sp = common::service_provider(common::settings())?;

    let url = sp
        .login(LoginOptions {
            return_to: Some("https://app.example/dashboard".to_string()),
            stay: true,
            ..LoginOptions::default()
        })?
        .ok_or_else(|| anyhow::anyhow!("stay should return the URL"))?;

    assert!(url.starts_with(common::IDP_SSO_URL));
    assert!(url.contains("SAMLRequest="));
    assert!(url.contains("RelayState=https%3A%2F%2Fapp.example%2Fdashboard"));
    assert!(!url.contains("SigAlg="));
    assert!(!url.contains("Signature="));

    let xml = common::redirect_message(&url, "SAMLRequest")?;
    assert!(xml.contains(&format!(r#"AssertionConsumerServiceURL="{}""#, common::ACS_URL)));
    assert!(xml.contains("NameIDPolicy"));
    assert_eq!(sp.last_request_xml(), Some(xml.as_str()));

    Ok(())
}

#[test]
fn test_login_requests_authn_context() -> anyhow::Result<()> {
    let mut settings = common::settings();
    settings.security.requested_authn_context =
        vec!["urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport".to_string()];
    let mut sp = common::service_provider(settings)?;

    let url = sp
        .login(LoginOptions {
            force_authn: true,
            set_name_id_policy: false,
            stay: true,
            ..LoginOptions::default()
        })?
        .ok_or_else(|| anyhow::anyhow!("stay should return the URL"))?;

    let xml = common::redirect_message(&url, "SAMLRequest")?;
    assert!(xml.contains(r#"ForceAuthn="true""#));
    assert!(xml.contains(r#"Comparison="exact""#));
    assert!(xml.contains("PasswordProtectedTransport"));
    assert!(!xml.contains("NameIDPolicy"));

    Ok(())
}

#[test]
fn test_sso_round_trip_populates_session() -> anyhow::Result<()> {
    let (mut sp, request_id) = login(common::settings())?;
    let form = SsoResponse::answering(&request_id).post_form();

    sp.process_response(&RequestContext::from_post_form(&form), Some(&request_id))?;

    assert!(sp.errors().is_empty(), "unexpected errors: {:?}", sp.last_error_reason());
    assert!(sp.is_authenticated());
    assert_eq!(sp.name_id(), Some("jdoe@example.com"));
    assert_eq!(
        sp.name_id_format(),
        Some("urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress")
    );
    assert_eq!(sp.name_id_name_qualifier(), Some(common::IDP_ENTITY_ID));
    assert_eq!(sp.name_id_sp_name_qualifier(), Some(common::SP_ENTITY_ID));
    assert_eq!(sp.session_index(), Some("_session-1"));
    assert!(sp.session_expiration().is_some());

    assert_eq!(
        sp.attribute("groups"),
        Some(&["admins".to_string(), "users".to_string()][..])
    );
    assert_eq!(sp.attribute_with_friendly_name("uid"), Some(&["jdoe".to_string()][..]));
    assert!(sp.attribute_with_friendly_name("groups").is_none());
    let names: Vec<&str> = sp.attributes().names().collect();
    assert_eq!(names, ["urn:oid:0.9.2342.19200300.100.1.1", "groups"]);

    assert_eq!(sp.last_message_id(), Some("_resp-sso"));
    assert_eq!(sp.last_assertion_id(), Some("_assertion-1"));
    assert!(sp.last_assertion_not_on_or_after().is_some());
    assert!(sp.last_response_xml().is_some_and(|xml| xml.contains("_assertion-1")));

    Ok(())
}

#[test]
fn test_response_to_other_request_is_rejected() -> anyhow::Result<()> {
    let (mut sp, request_id) = login(common::settings())?;
    let form = SsoResponse::answering("_someone-else").post_form();

    sp.process_response(&RequestContext::from_post_form(&form), Some(&request_id))?;

    assert_eq!(sp.errors(), [ErrorCode::InvalidResponse]);
    assert!(matches!(
        sp.last_error(),
        Some(ValidationError::InResponseToMismatch { .. })
    ));
    assert!(!sp.is_authenticated());
    assert!(sp.attributes().is_empty());
    // The trace still records what arrived.
    assert!(sp.last_response_xml().is_some());
    assert!(sp.last_message_id().is_none());

    Ok(())
}

#[test]
fn test_unsigned_response_is_rejected() -> anyhow::Result<()> {
    let (mut sp, request_id) = login(common::settings())?;
    let form = SsoResponse {
        signed: false,
        ..SsoResponse::answering(&request_id)
    }
    .post_form();

    sp.process_response(&RequestContext::from_post_form(&form), Some(&request_id))?;

    assert_eq!(sp.errors(), [ErrorCode::InvalidResponse]);
    assert!(matches!(sp.last_error(), Some(ValidationError::MissingSignature(_))));
    assert!(!sp.is_authenticated());

    Ok(())
}

#[test]
fn test_idp_error_status_is_rejected() -> anyhow::Result<()> {
    let (mut sp, request_id) = login(common::settings())?;
    let form = SsoResponse {
        status: RESPONDER,
        ..SsoResponse::answering(&request_id)
    }
    .post_form();

    sp.process_response(&RequestContext::from_post_form(&form), Some(&request_id))?;

    assert_eq!(sp.errors(), [ErrorCode::InvalidResponse]);
    let reason = sp.last_error_reason().unwrap_or_default();
    assert!(reason.contains(RESPONDER), "reason was {reason}");

    Ok(())
}

#[test]
fn test_lax_mode_skips_audience() -> anyhow::Result<()> {
    let mut settings = common::settings();
    settings.strict = false;
    let (mut sp, request_id) = login(settings)?;
    let form = SsoResponse {
        audience: "https://other-sp.example.com",
        ..SsoResponse::answering(&request_id)
    }
    .post_form();

    sp.process_response(&RequestContext::from_post_form(&form), Some(&request_id))?;

    assert!(sp.errors().is_empty());
    assert!(sp.is_authenticated());

    Ok(())
}

#[test]
fn test_errors_reset_on_every_consume() -> anyhow::Result<()> {
    let (mut sp, request_id) = login(common::settings())?;

    let bad = SsoResponse::answering("_stale").post_form();
    sp.process_response(&RequestContext::from_post_form(&bad), Some(&request_id))?;
    assert_eq!(sp.errors(), [ErrorCode::InvalidResponse]);

    let good = SsoResponse::answering(&request_id).post_form();
    sp.process_response(&RequestContext::from_post_form(&good), Some(&request_id))?;
    assert!(sp.errors().is_empty());
    assert!(sp.last_error().is_none());
    assert!(sp.is_authenticated());

    Ok(())
}

#[test]
fn test_missing_response_is_a_binding_error() -> anyhow::Result<()> {
    let mut sp = common::service_provider(common::settings())?;

    let bad = SsoResponse::answering("_stale").post_form();
    sp.process_response(&RequestContext::from_post_form(&bad), Some("_req"))?;
    assert!(!sp.errors().is_empty());

    let err = sp
        .process_response(&RequestContext::from_post_form("RelayState=%2F"), None)
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected ResponseNotFound"))?;

    assert!(matches!(err, SamlError::ResponseNotFound));
    assert_eq!(err.error_code(), Some(ErrorCode::InvalidBinding));
    assert!(sp.errors().is_empty());

    Ok(())
}
