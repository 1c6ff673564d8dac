//! Single logout in both roles.

use std::cell::Cell;
use std::sync::Arc;

use sp_saml::bindings::{HttpRedirectBinding, MAX_INFLATED_SIZE};
use sp_saml::{
    AuthenticationState, ErrorCode, LogoutOptions, RequestContext, SamlError, SamlResult,
    SloOptions,
};

use crate::common::{self, RecordingSigner, SsoResponse, RESPONDER, SUCCESS};

/// A provider with an authenticated session from a full SSO exchange.
fn logged_in(settings: sp_saml::Settings) -> anyhow::Result<sp_saml::ServiceProvider> {
    let mut sp = common::service_provider(settings)?;
    let form = SsoResponse::default().post_form();
    sp.process_response(&RequestContext::from_post_form(&form), None)?;
    anyhow::ensure!(sp.is_authenticated(), "login failed: {:?}", sp.last_error_reason());
    Ok(sp)
}

/// Settings trusting the fixture IdP certificate.
fn trusting_idp_cert(lowercase_url_encoding: bool) -> sp_saml::Settings {
    let mut settings = common::settings();
    settings.idp.x509_certs = vec![common::IDP_CERT.to_string()];
    settings.security.lowercase_url_encoding = lowercase_url_encoding;
    settings
}

/// An IdP-signed `LogoutRequest` whose `RelayState` is `relay_state` as sent.
fn signed_logout_request(id: &str, relay_state: &str) -> anyhow::Result<String> {
    let unsigned = common::logout_request_query(id, None)?;
    common::idp_sign_query(&format!("{unsigned}&RelayState={relay_state}"))
}

fn slo_options(retrieve_parameters_from_server: bool) -> SloOptions {
    SloOptions {
        retrieve_parameters_from_server,
        stay: true,
        ..SloOptions::default()
    }
}

#[test]
fn test_idp_initiated_logout_replies_signed_success() -> anyhow::Result<()> {
    let mut settings = common::settings();
    settings.security.logout_response_signed = true;
    let signer = RecordingSigner::default();
    let mut sp = logged_in(settings)?.with_signer(Arc::new(signer.clone()));

    let query = common::logout_request_query("_req123", Some("https://app.example/bye"))?;
    let url = sp
        .process_slo(
            &RequestContext::from_query(&query),
            SloOptions {
                stay: true,
                ..SloOptions::default()
            },
        )?
        .ok_or_else(|| anyhow::anyhow!("stay should return the reply URL"))?;

    assert!(sp.errors().is_empty(), "unexpected errors: {:?}", sp.last_error_reason());
    assert!(!sp.is_authenticated());
    assert!(sp.name_id().is_none());

    assert!(url.starts_with(common::IDP_SLO_URL));
    let names: Vec<String> = common::raw_params(&url).into_iter().map(|(k, _)| k).collect();
    assert_eq!(names, ["SAMLResponse", "RelayState", "SigAlg", "Signature"]);

    let reply = common::redirect_message(&url, "SAMLResponse")?;
    assert!(reply.contains(r#"InResponseTo="_req123""#));
    assert!(reply.contains(SUCCESS));
    assert_eq!(sp.last_response_xml(), Some(reply.as_str()));

    let expected = format!(
        "SAMLResponse={}&RelayState={}&SigAlg={}",
        common::raw_param(&url, "SAMLResponse").unwrap_or_default(),
        common::raw_param(&url, "RelayState").unwrap_or_default(),
        common::raw_param(&url, "SigAlg").unwrap_or_default(),
    );
    assert_eq!(signer.last_signed(), Some(expected));
    assert_eq!(
        common::raw_param(&url, "RelayState").as_deref(),
        Some("https%3A%2F%2Fapp.example%2Fbye")
    );

    Ok(())
}

#[test]
fn test_idp_initiated_logout_dispatches_reply() -> anyhow::Result<()> {
    let pending = sp_saml::PendingRedirect::new();
    let mut sp = logged_in(common::settings())?.with_redirector(pending.clone());

    let query = common::logout_request_query("_req456", None)?;
    let returned = sp.process_slo(&RequestContext::from_query(&query), SloOptions::default())?;

    assert!(returned.is_none());
    let location = pending
        .take()
        .ok_or_else(|| anyhow::anyhow!("no redirect dispatched"))?;
    assert!(location.starts_with(common::IDP_SLO_URL));
    assert!(common::raw_param(&location, "RelayState").is_none());
    assert!(sp.last_request_xml().is_some_and(|xml| xml.contains("_req456")));

    Ok(())
}

#[test]
fn test_unsuccessful_logout_response_keeps_session() -> anyhow::Result<()> {
    let mut sp = logged_in(common::settings())?;
    sp.logout(LogoutOptions {
        stay: true,
        ..LogoutOptions::default()
    })?;
    let request_id = sp.last_request_id().unwrap_or_default().to_string();

    let invoked = Cell::new(false);
    let mut terminator = |_: &mut AuthenticationState| -> SamlResult<()> {
        invoked.set(true);
        Ok(())
    };
    let query = common::logout_response_query(&request_id, RESPONDER)?;
    sp.process_slo_with(
        &RequestContext::from_query(&query),
        SloOptions {
            request_id: Some(request_id),
            ..SloOptions::default()
        },
        &mut terminator,
    )?;

    assert_eq!(sp.errors(), [ErrorCode::LogoutNotSuccess]);
    assert!(!invoked.get());
    assert!(sp.is_authenticated());

    Ok(())
}

#[test]
fn test_sp_initiated_logout_round_trip() -> anyhow::Result<()> {
    let mut sp = logged_in(common::settings())?;

    let url = sp
        .logout(LogoutOptions {
            return_to: Some("https://app.example/goodbye".to_string()),
            session_index: sp.session_index().map(str::to_string),
            stay: true,
            ..LogoutOptions::default()
        })?
        .ok_or_else(|| anyhow::anyhow!("stay should return the URL"))?;

    let request = common::redirect_message(&url, "SAMLRequest")?;
    assert!(request.contains(">jdoe@example.com</saml:NameID>"));
    assert!(request.contains(&format!(r#"NameQualifier="{}""#, common::IDP_ENTITY_ID)));
    assert!(request.contains("<samlp:SessionIndex>_session-1</samlp:SessionIndex>"));
    let request_id = sp.last_request_id().unwrap_or_default().to_string();

    let query = common::logout_response_query(&request_id, SUCCESS)?;
    let out = sp.process_slo(
        &RequestContext::from_query(&query),
        SloOptions {
            request_id: Some(request_id),
            ..SloOptions::default()
        },
    )?;

    assert!(out.is_none());
    assert!(sp.errors().is_empty());
    assert!(!sp.is_authenticated());
    assert_eq!(sp.last_message_id(), Some("_logout-resp-1"));

    Ok(())
}

#[test]
fn test_missing_slo_message_is_fatal() -> anyhow::Result<()> {
    let mut sp = logged_in(common::settings())?;

    let stale = common::logout_response_query("_other", SUCCESS)?;
    sp.process_slo(
        &RequestContext::from_query(&stale),
        SloOptions {
            request_id: Some("_mine".to_string()),
            ..SloOptions::default()
        },
    )?;
    assert_eq!(sp.errors(), [ErrorCode::InvalidLogoutResponse]);

    let err = sp
        .process_slo(&RequestContext::from_query("RelayState=%2F"), SloOptions::default())
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected LogoutMessageNotFound"))?;

    assert!(matches!(err, SamlError::LogoutMessageNotFound));
    assert_eq!(err.error_code(), Some(ErrorCode::InvalidBinding));
    assert!(sp.errors().is_empty());
    assert!(sp.is_authenticated());

    Ok(())
}

#[test]
fn test_terminator_failure_propagates() -> anyhow::Result<()> {
    let mut sp = logged_in(common::settings())?;
    let mut terminator = |_: &mut AuthenticationState| -> SamlResult<()> {
        Err(SamlError::SessionTermination("session store unavailable".to_string()))
    };

    let query = common::logout_request_query("_req789", None)?;
    let result = sp.process_slo_with(
        &RequestContext::from_query(&query),
        SloOptions {
            stay: true,
            ..SloOptions::default()
        },
        &mut terminator,
    );

    assert!(matches!(result, Err(SamlError::SessionTermination(_))));
    assert!(sp.last_response_xml().is_some_and(|xml| !xml.contains("_req789")));

    Ok(())
}

#[test]
fn test_signed_reply_without_key_fails() -> anyhow::Result<()> {
    let mut settings = common::settings();
    settings.security.logout_response_signed = true;
    let mut sp = logged_in(settings)?;

    let query = common::logout_request_query("_req000", None)?;
    let result = sp.process_slo(&RequestContext::from_query(&query), SloOptions::default());

    assert!(matches!(result, Err(SamlError::MissingKey("LogoutResponse"))));
    assert!(sp.is_authenticated());

    Ok(())
}

#[test]
fn test_signed_logout_request_is_verified() -> anyhow::Result<()> {
    // (RelayState as sent, verify the raw query, RFC 3986 policy)
    let cases = [
        ("next+page", false, false),
        ("next%20page", false, true),
        ("next+page", true, false),
        ("next%20page", true, false),
        ("next%20page", true, true),
    ];

    for (relay_state, retrieve, rfc3986) in cases {
        let mut sp = logged_in(trusting_idp_cert(rfc3986))?;
        let query = signed_logout_request("_req-signed", relay_state)?;

        let reply = sp.process_slo(&RequestContext::from_query(&query), slo_options(retrieve))?;

        assert!(
            sp.errors().is_empty(),
            "{relay_state} retrieve={retrieve}: {:?}",
            sp.last_error_reason()
        );
        assert!(reply.is_some());
        assert!(!sp.is_authenticated());
    }

    Ok(())
}

#[test]
fn test_re_encoded_signature_follows_encoding_policy() -> anyhow::Result<()> {
    let mut sp = logged_in(trusting_idp_cert(false))?;
    let query = signed_logout_request("_req-rfc", "next%20page")?;

    sp.process_slo(&RequestContext::from_query(&query), slo_options(false))?;

    assert_eq!(sp.errors(), [ErrorCode::InvalidLogoutRequest]);
    assert!(sp.is_authenticated());

    Ok(())
}

#[test]
fn test_tampered_relay_state_is_rejected() -> anyhow::Result<()> {
    let query = signed_logout_request("_req-tampered", "next+page")?
        .replace("RelayState=next+page", "RelayState=https%3A%2F%2Fevil.example");

    for retrieve in [true, false] {
        let mut sp = logged_in(trusting_idp_cert(false))?;
        let reply = sp.process_slo(&RequestContext::from_query(&query), slo_options(retrieve))?;

        assert!(reply.is_none());
        assert_eq!(sp.errors(), [ErrorCode::InvalidLogoutRequest]);
        assert!(sp.is_authenticated());
    }

    Ok(())
}

#[test]
fn test_signed_logout_response_is_verified() -> anyhow::Result<()> {
    let mut sp = logged_in(trusting_idp_cert(false))?;
    sp.logout(LogoutOptions {
        stay: true,
        ..LogoutOptions::default()
    })?;
    let request_id = sp.last_request_id().unwrap_or_default().to_string();

    let query = common::idp_sign_query(&common::logout_response_query(&request_id, SUCCESS)?)?;
    sp.process_slo(
        &RequestContext::from_query(&query),
        SloOptions {
            request_id: Some(request_id),
            ..slo_options(true)
        },
    )?;

    assert!(sp.errors().is_empty(), "{:?}", sp.last_error_reason());
    assert!(!sp.is_authenticated());

    Ok(())
}

#[test]
fn test_oversized_logout_request_is_recorded() -> anyhow::Result<()> {
    let mut sp = logged_in(common::settings())?;
    let xml = format!("<{}", " ".repeat(MAX_INFLATED_SIZE * 4));
    let encoded = HttpRedirectBinding::encode_message(&xml, true)?;
    let query = format!("SAMLRequest={}", urlencoding::encode(&encoded));

    let reply = sp.process_slo(&RequestContext::from_query(&query), slo_options(false))?;

    assert!(reply.is_none());
    assert_eq!(sp.errors(), [ErrorCode::InvalidLogoutRequest]);
    assert!(sp.last_request_xml().is_none());
    assert!(sp.is_authenticated());

    Ok(())
}
