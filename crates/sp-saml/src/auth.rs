//! The service provider facade.
//!
//! One [`ServiceProvider`] handles one inbound exchange. It owns the
//! authentication state, the operation trace and the error record of that
//! exchange, and exposes the four protocol operations:
//!
//! - [`login`](ServiceProvider::login): SP-initiated SSO
//! - [`process_response`](ServiceProvider::process_response): SSO consume
//! - [`logout`](ServiceProvider::logout): SP-initiated SLO
//! - [`process_slo`](ServiceProvider::process_slo): SLO consume, in either
//!   role
//!
//! Consume operations never return protocol-validation failures as `Err`;
//! those land in the error record. `Err` is reserved for misuse and
//! misconfiguration.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::bindings::{HttpRedirectBinding, SamlMessageType, UrlEncoding};
use crate::context::{CurrentUrlProvider, RequestContext, StaticCurrentUrl};
use crate::dispatch::{PendingRedirect, Redirector};
use crate::error::{ErrorCode, SamlError, SamlResult, ValidationError};
use crate::messages::{
    build_authn_request, build_logout_request, build_logout_response, AuthnRequestOptions,
    LogoutRequestOptions, LogoutRequestValidator, LogoutResponseValidator, ResponseValidator,
    ValidationContext,
};
use crate::session::{AuthenticationState, ClearLocalSession, SessionTerminator};
use crate::settings::Settings;
use crate::signature::{build_signature, KeySigner, RsaKeySigner, XmlSignatureVerifier};
use crate::state::{ErrorRecord, OperationTrace};
use crate::types::{Attributes, SamlBinding, Status};

const SAML_PARAMS: [&str; 5] = ["SAMLRequest", "SAMLResponse", "RelayState", "SigAlg", "Signature"];

/// Options for [`ServiceProvider::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    /// Where the user should land afterwards. Sent as RelayState.
    pub return_to: Option<String>,
    /// Extra query parameters for the IdP.
    pub parameters: Vec<(String, String)>,
    /// Ask the IdP to re-authenticate the user.
    pub force_authn: bool,
    /// Ask the IdP not to interact with the user.
    pub is_passive: bool,
    /// Return the URL instead of dispatching it.
    pub stay: bool,
    /// Include a `NameIDPolicy`.
    pub set_name_id_policy: bool,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            return_to: None,
            parameters: Vec::new(),
            force_authn: false,
            is_passive: false,
            stay: false,
            set_name_id_policy: true,
        }
    }
}

/// Options for [`ServiceProvider::logout`].
///
/// NameID fields left as `None` fall back to the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutOptions {
    /// Where the user should land afterwards. Sent as RelayState.
    pub return_to: Option<String>,
    /// Extra query parameters for the IdP.
    pub parameters: Vec<(String, String)>,
    /// Subject to log out.
    pub name_id: Option<String>,
    /// Session to terminate at the IdP. Never taken from the current session.
    pub session_index: Option<String>,
    /// Return the URL instead of dispatching it.
    pub stay: bool,
    /// NameID format URI.
    pub name_id_format: Option<String>,
    /// NameID `NameQualifier`.
    pub name_id_name_qualifier: Option<String>,
    /// NameID `SPNameQualifier`.
    pub name_id_sp_name_qualifier: Option<String>,
}

/// Options for [`ServiceProvider::process_slo`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SloOptions {
    /// Leave the local session alone.
    pub keep_local_session: bool,
    /// ID of the `LogoutRequest` this SP sent, to correlate the response.
    pub request_id: Option<String>,
    /// Verify signatures over the raw query string as received.
    pub retrieve_parameters_from_server: bool,
    /// Return the reply URL instead of dispatching it.
    pub stay: bool,
}

/// Which side of a logout exchange an inbound SLO message puts us on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SloRole<'a> {
    /// We sent a LogoutRequest; this is the IdP's LogoutResponse.
    Responder(&'a str),
    /// The IdP asks us to end a session.
    Initiator(&'a str),
    /// Neither message is present.
    NoBinding,
}

impl<'a> SloRole<'a> {
    fn resolve(request: &'a RequestContext) -> Self {
        if request.binding == Some(SamlBinding::HttpPost) {
            return Self::NoBinding;
        }
        match (request.saml_response.as_deref(), request.saml_request.as_deref()) {
            (Some(response), _) => Self::Responder(response),
            (None, Some(req)) => Self::Initiator(req),
            (None, None) => Self::NoBinding,
        }
    }
}

/// SAML service provider for one exchange.
pub struct ServiceProvider {
    settings: Arc<Settings>,
    signer: Option<Arc<dyn KeySigner>>,
    xml_verifier: Option<Arc<dyn XmlSignatureVerifier>>,
    redirector: Box<dyn Redirector>,
    current_url: Box<dyn CurrentUrlProvider>,
    session: AuthenticationState,
    trace: OperationTrace,
    errors: ErrorRecord,
}

impl ServiceProvider {
    /// Creates a service provider from validated settings.
    ///
    /// The SP private key, if configured, becomes the default signer. The
    /// default redirector is a [`PendingRedirect`] and the default current
    /// URL is the ACS URL.
    pub fn new(settings: Arc<Settings>) -> SamlResult<Self> {
        settings.validate()?;

        let signer = match settings.sp.private_key {
            Some(ref pem) => Some(Arc::new(RsaKeySigner::from_pem(pem)?) as Arc<dyn KeySigner>),
            None => None,
        };
        let current_url = StaticCurrentUrl::new(&settings.sp.assertion_consumer_service_url);

        Ok(Self {
            settings,
            signer,
            xml_verifier: None,
            redirector: Box::new(PendingRedirect::new()),
            current_url: Box::new(current_url),
            session: AuthenticationState::default(),
            trace: OperationTrace::default(),
            errors: ErrorRecord::default(),
        })
    }

    /// Replaces the signer, e.g. with an HSM-backed one.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn KeySigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Sets the verifier for enveloped XML signatures on SSO responses.
    #[must_use]
    pub fn with_xml_signature_verifier(mut self, verifier: Arc<dyn XmlSignatureVerifier>) -> Self {
        self.xml_verifier = Some(verifier);
        self
    }

    /// Sets the redirect dispatcher.
    #[must_use]
    pub fn with_redirector(mut self, redirector: impl Redirector + 'static) -> Self {
        self.redirector = Box::new(redirector);
        self
    }

    /// Sets the provider of the default RelayState.
    #[must_use]
    pub fn with_current_url(mut self, provider: impl CurrentUrlProvider + 'static) -> Self {
        self.current_url = Box::new(provider);
        self
    }

    /// Restores a previously authenticated session, e.g. from the web
    /// layer's session store, so that logout can default to it.
    #[must_use]
    pub fn with_session(mut self, session: AuthenticationState) -> Self {
        self.session = session;
        self
    }

    // ------------------------------------------------------------------
    // SSO
    // ------------------------------------------------------------------

    /// Starts SP-initiated SSO.
    ///
    /// Returns the IdP URL when `stay` is set, otherwise dispatches it and
    /// returns `None`.
    pub fn login(&mut self, options: LoginOptions) -> SamlResult<Option<String>> {
        let sign = self.settings.security.authn_requests_signed;
        if sign {
            self.require_signer("AuthnRequest")?;
        }

        let built = build_authn_request(
            &self.settings,
            AuthnRequestOptions {
                force_authn: options.force_authn,
                is_passive: options.is_passive,
                set_name_id_policy: options.set_name_id_policy,
            },
        )?;
        self.trace.last_request_id = Some(built.id.clone());
        self.trace.last_request_xml = Some(built.xml);

        let relay_state = self.relay_state(options.return_to);
        let params = self.outbound_params(
            SamlMessageType::Request,
            built.encoded,
            relay_state,
            sign.then_some("AuthnRequest"),
            options.parameters,
        )?;

        tracing::info!("SAML login: sending AuthnRequest '{}'", built.id);
        let sso_url = self.settings.idp.single_sign_on_service_url.clone();
        self.redirect_to(&sso_url, &params, options.stay)
    }

    /// Consumes the IdP's SSO `Response` from a POST request.
    ///
    /// `request_id` is the ID of the `AuthnRequest` this SP sent; `None`
    /// accepts unsolicited responses. Fails with
    /// [`SamlError::ResponseNotFound`] when the request carries no
    /// POST-bound `SAMLResponse`.
    pub fn process_response(
        &mut self,
        request: &RequestContext,
        request_id: Option<&str>,
    ) -> SamlResult<()> {
        self.errors.reset();

        let payload = request.post_response().ok_or(SamlError::ResponseNotFound)?;
        let validator = ResponseValidator::new(payload);
        self.trace.last_response_xml = validator.xml().map(str::to_string);

        let ctx = ValidationContext::new(&self.settings).with_xml_verifier(self.xml_verifier.as_deref());
        match validator.validate(&ctx, request_id) {
            Ok(claims) => {
                let name_id = claims.name_id.unwrap_or_default();
                self.session = AuthenticationState {
                    authenticated: true,
                    name_id: Some(name_id.value).filter(|v| !v.is_empty()),
                    name_id_format: name_id.format,
                    name_id_name_qualifier: name_id.name_qualifier,
                    name_id_sp_name_qualifier: name_id.sp_name_qualifier,
                    attributes: claims.attributes,
                    attributes_with_friendly_name: claims.attributes_with_friendly_name,
                    session_index: claims.session_index,
                    session_expiration: claims.session_expiration,
                };
                self.trace.last_message_id = Some(claims.response_id);
                self.trace.last_assertion_id = Some(claims.assertion_id);
                self.trace.last_assertion_not_on_or_after = claims.assertion_not_on_or_after;

                tracing::info!(
                    "SAML login completed for '{}'",
                    self.session.name_id.as_deref().unwrap_or("<no NameID>")
                );
            }
            Err(cause) => {
                tracing::warn!("SAML Response rejected: {}", cause);
                self.errors.record(ErrorCode::InvalidResponse, Some(cause));
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // SLO
    // ------------------------------------------------------------------

    /// Starts SP-initiated SLO.
    ///
    /// NameID, format and qualifiers default to the current session;
    /// the session index does not. Returns the IdP URL when `stay` is set,
    /// otherwise dispatches it and returns `None`.
    pub fn logout(&mut self, options: LogoutOptions) -> SamlResult<Option<String>> {
        let slo_url = self
            .settings
            .idp
            .single_logout_service_url
            .clone()
            .ok_or(SamlError::SloNotSupported)?;

        let sign = self.settings.security.logout_request_signed;
        if sign {
            self.require_signer("LogoutRequest")?;
        }

        let session = &self.session;
        let built = build_logout_request(
            &self.settings,
            &LogoutRequestOptions {
                name_id: options.name_id.or_else(|| session.name_id.clone()),
                name_id_format: options
                    .name_id_format
                    .or_else(|| session.name_id_format.clone()),
                name_id_name_qualifier: options
                    .name_id_name_qualifier
                    .or_else(|| session.name_id_name_qualifier.clone()),
                name_id_sp_name_qualifier: options
                    .name_id_sp_name_qualifier
                    .or_else(|| session.name_id_sp_name_qualifier.clone()),
                session_index: options.session_index,
            },
        )?;
        self.trace.last_request_id = Some(built.id.clone());
        self.trace.last_request_xml = Some(built.xml);

        let relay_state = self.relay_state(options.return_to);
        let params = self.outbound_params(
            SamlMessageType::Request,
            built.encoded,
            relay_state,
            sign.then_some("LogoutRequest"),
            options.parameters,
        )?;

        tracing::info!("SAML logout: sending LogoutRequest '{}'", built.id);
        self.redirect_to(&slo_url, &params, options.stay)
    }

    /// Consumes an inbound SLO message with the default session termination.
    ///
    /// See [`process_slo_with`](Self::process_slo_with).
    pub fn process_slo(
        &mut self,
        request: &RequestContext,
        options: SloOptions,
    ) -> SamlResult<Option<String>> {
        self.process_slo_with(request, options, &mut ClearLocalSession)
    }

    /// Consumes an inbound SLO message.
    ///
    /// A `LogoutResponse` completes a logout this SP started. A
    /// `LogoutRequest` is the IdP asking this SP to end a session: the
    /// session is terminated first, then a Success `LogoutResponse` is sent
    /// back. Returns the reply URL when `stay` is set and a reply was
    /// built, otherwise `None`.
    pub fn process_slo_with<T>(
        &mut self,
        request: &RequestContext,
        options: SloOptions,
        terminator: &mut T,
    ) -> SamlResult<Option<String>>
    where
        T: SessionTerminator + ?Sized,
    {
        self.errors.reset();

        match SloRole::resolve(request) {
            SloRole::NoBinding => Err(SamlError::LogoutMessageNotFound),
            SloRole::Responder(payload) => {
                self.consume_logout_response(request, payload, &options, terminator)?;
                Ok(None)
            }
            SloRole::Initiator(payload) => {
                self.answer_logout_request(request, payload, &options, terminator)
            }
        }
    }

    fn consume_logout_response<T>(
        &mut self,
        request: &RequestContext,
        payload: &str,
        options: &SloOptions,
        terminator: &mut T,
    ) -> SamlResult<()>
    where
        T: SessionTerminator + ?Sized,
    {
        let validator = LogoutResponseValidator::new(payload);
        self.trace.last_response_xml = validator.xml().map(str::to_string);

        let ctx = ValidationContext::new(&self.settings);
        let claims = match validator.validate(
            &ctx,
            request,
            options.request_id.as_deref(),
            options.retrieve_parameters_from_server,
        ) {
            Ok(claims) => claims,
            Err(cause) => {
                tracing::warn!("SAML LogoutResponse rejected: {}", cause);
                self.errors.record(ErrorCode::InvalidLogoutResponse, Some(cause));
                return Ok(());
            }
        };

        if !claims.status.is_success() {
            tracing::warn!(
                "SAML LogoutResponse '{}' reports status '{}'",
                claims.id,
                claims.status.status_code.value
            );
            self.errors.record(
                ErrorCode::LogoutNotSuccess,
                Some(ValidationError::StatusNotSuccess {
                    code: claims.status.status_code.value,
                    message: claims.status.status_message,
                }),
            );
            return Ok(());
        }

        self.trace.last_message_id = Some(claims.id.clone());
        if !options.keep_local_session {
            terminator.terminate(&mut self.session)?;
        }
        tracing::info!("SAML logout completed by LogoutResponse '{}'", claims.id);
        Ok(())
    }

    fn answer_logout_request<T>(
        &mut self,
        request: &RequestContext,
        payload: &str,
        options: &SloOptions,
        terminator: &mut T,
    ) -> SamlResult<Option<String>>
    where
        T: SessionTerminator + ?Sized,
    {
        let validator = LogoutRequestValidator::new(payload);
        self.trace.last_request_xml = validator.xml().map(str::to_string);

        let ctx = ValidationContext::new(&self.settings);
        let claims = match validator.validate(&ctx, request, options.retrieve_parameters_from_server) {
            Ok(claims) => claims,
            Err(cause) => {
                tracing::warn!("SAML LogoutRequest rejected: {}", cause);
                self.errors.record(ErrorCode::InvalidLogoutRequest, Some(cause));
                return Ok(None);
            }
        };

        let reply_url = self
            .settings
            .idp_slo_response_url()
            .ok_or(SamlError::SloNotSupported)?
            .to_string();
        let sign = self.settings.security.logout_response_signed;
        if sign {
            self.require_signer("LogoutResponse")?;
        }

        // Terminate before replying: the reply asserts Success.
        if !options.keep_local_session {
            terminator.terminate(&mut self.session)?;
        }

        let in_response_to = claims.id;
        self.trace.last_message_id = Some(in_response_to.clone());

        let built = build_logout_response(&self.settings, &in_response_to, Status::success())?;
        self.trace.last_response_xml = Some(built.xml);

        let params = self.outbound_params(
            SamlMessageType::Response,
            built.encoded,
            request.relay_state.clone(),
            sign.then_some("LogoutResponse"),
            Vec::new(),
        )?;

        tracing::info!(
            "SAML logout requested by IdP for '{}': replying to '{}'",
            claims.name_id.value,
            in_response_to
        );
        self.redirect_to(&reply_url, &params, options.stay)
    }

    // ------------------------------------------------------------------
    // Signatures
    // ------------------------------------------------------------------

    /// Signs a `SAMLRequest` value for the redirect binding.
    ///
    /// `saml_request` is the base64 message before percent-encoding.
    pub fn build_request_signature(
        &self,
        saml_request: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<String> {
        self.sign(SamlMessageType::Request, saml_request, relay_state, "SAMLRequest")
    }

    /// Signs a `SAMLResponse` value for the redirect binding.
    ///
    /// `saml_response` is the base64 message before percent-encoding.
    pub fn build_response_signature(
        &self,
        saml_response: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<String> {
        self.sign(SamlMessageType::Response, saml_response, relay_state, "SAMLResponse")
    }

    fn sign(
        &self,
        message_type: SamlMessageType,
        message: &str,
        relay_state: Option<&str>,
        what: &'static str,
    ) -> SamlResult<String> {
        let signer = self.require_signer(what)?;
        build_signature(
            signer,
            message_type,
            message,
            relay_state,
            self.settings.security.signature_algorithm,
            self.url_encoding(),
        )
    }

    fn require_signer(&self, what: &'static str) -> SamlResult<&dyn KeySigner> {
        self.signer.as_deref().ok_or(SamlError::MissingKey(what))
    }

    // ------------------------------------------------------------------
    // Dispatch helpers
    // ------------------------------------------------------------------

    fn url_encoding(&self) -> UrlEncoding {
        UrlEncoding::from_policy(self.settings.security.lowercase_url_encoding)
    }

    fn relay_state(&self, return_to: Option<String>) -> Option<String> {
        return_to
            .filter(|r| !r.is_empty())
            .or_else(|| Some(self.current_url.current_url()).filter(|u| !u.is_empty()))
    }

    /// Orders the query: message, RelayState, SigAlg, Signature, then any
    /// extra parameters that do not collide with SAML ones.
    fn outbound_params(
        &self,
        message_type: SamlMessageType,
        encoded: String,
        relay_state: Option<String>,
        sign_as: Option<&'static str>,
        extra: Vec<(String, String)>,
    ) -> SamlResult<Vec<(String, String)>> {
        let mut params = Vec::with_capacity(4 + extra.len());

        let signature = match sign_as {
            Some(what) => Some(self.sign(message_type, &encoded, relay_state.as_deref(), what)?),
            None => None,
        };

        params.push((message_type.form_param().to_string(), encoded));
        if let Some(rs) = relay_state {
            params.push(("RelayState".to_string(), rs));
        }
        if let Some(signature) = signature {
            tracing::debug!("Attaching {} redirect signature", self.settings.security.signature_algorithm);
            params.push((
                "SigAlg".to_string(),
                self.settings.security.signature_algorithm.uri().to_string(),
            ));
            params.push(("Signature".to_string(), signature));
        }

        params.extend(
            extra
                .into_iter()
                .filter(|(key, _)| !SAML_PARAMS.contains(&key.as_str())),
        );
        Ok(params)
    }

    fn redirect_to(
        &mut self,
        base: &str,
        params: &[(String, String)],
        stay: bool,
    ) -> SamlResult<Option<String>> {
        let url = HttpRedirectBinding::build_url(base, params, self.url_encoding());
        if stay {
            return Ok(Some(url));
        }
        tracing::debug!("Redirecting to '{}'", base);
        self.redirector.redirect(&url)?;
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The settings this SP runs with.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The full authentication state.
    #[must_use]
    pub fn session(&self) -> &AuthenticationState {
        &self.session
    }

    /// The raw record of the last exchange.
    #[must_use]
    pub fn trace(&self) -> &OperationTrace {
        &self.trace
    }

    /// Whether an SSO response has been accepted.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// Attributes keyed by `Name`.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.session.attributes
    }

    /// Values of the attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.session.attributes.get(name)
    }

    /// Attributes keyed by `FriendlyName`.
    #[must_use]
    pub fn attributes_with_friendly_name(&self) -> &Attributes {
        &self.session.attributes_with_friendly_name
    }

    /// Values of the attribute with friendly name `name`.
    #[must_use]
    pub fn attribute_with_friendly_name(&self, name: &str) -> Option<&[String]> {
        self.session.attributes_with_friendly_name.get(name)
    }

    /// Subject NameID.
    #[must_use]
    pub fn name_id(&self) -> Option<&str> {
        self.session.name_id.as_deref()
    }

    /// Subject NameID format.
    #[must_use]
    pub fn name_id_format(&self) -> Option<&str> {
        self.session.name_id_format.as_deref()
    }

    /// Subject NameID `NameQualifier`.
    #[must_use]
    pub fn name_id_name_qualifier(&self) -> Option<&str> {
        self.session.name_id_name_qualifier.as_deref()
    }

    /// Subject NameID `SPNameQualifier`.
    #[must_use]
    pub fn name_id_sp_name_qualifier(&self) -> Option<&str> {
        self.session.name_id_sp_name_qualifier.as_deref()
    }

    /// IdP session index.
    #[must_use]
    pub fn session_index(&self) -> Option<&str> {
        self.session.session_index.as_deref()
    }

    /// IdP session expiry.
    #[must_use]
    pub fn session_expiration(&self) -> Option<DateTime<Utc>> {
        self.session.session_expiration
    }

    /// Error codes of the last consume operation, in order.
    #[must_use]
    pub fn errors(&self) -> &[ErrorCode] {
        self.errors.errors()
    }

    /// Structured cause of the last validation failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&ValidationError> {
        self.errors.last_error()
    }

    /// Reason for the last validation failure.
    #[must_use]
    pub fn last_error_reason(&self) -> Option<String> {
        self.errors.last_error_reason()
    }

    /// ID of the last request built.
    #[must_use]
    pub fn last_request_id(&self) -> Option<&str> {
        self.trace.last_request_id.as_deref()
    }

    /// ID of the last inbound message accepted.
    #[must_use]
    pub fn last_message_id(&self) -> Option<&str> {
        self.trace.last_message_id.as_deref()
    }

    /// ID of the last accepted assertion.
    #[must_use]
    pub fn last_assertion_id(&self) -> Option<&str> {
        self.trace.last_assertion_id.as_deref()
    }

    /// `NotOnOrAfter` of the last accepted assertion.
    #[must_use]
    pub fn last_assertion_not_on_or_after(&self) -> Option<DateTime<Utc>> {
        self.trace.last_assertion_not_on_or_after
    }

    /// XML of the last request sent or received.
    #[must_use]
    pub fn last_request_xml(&self) -> Option<&str> {
        self.trace.last_request_xml.as_deref()
    }

    /// XML of the last response received or sent.
    #[must_use]
    pub fn last_response_xml(&self) -> Option<&str> {
        self.trace.last_response_xml.as_deref()
    }

    /// IdP SSO endpoint.
    #[must_use]
    pub fn sso_url(&self) -> &str {
        &self.settings.idp.single_sign_on_service_url
    }

    /// IdP SLO endpoint.
    #[must_use]
    pub fn slo_url(&self) -> Option<&str> {
        self.settings.idp.single_logout_service_url.as_deref()
    }

    /// IdP endpoint for LogoutResponses.
    #[must_use]
    pub fn slo_response_url(&self) -> Option<&str> {
        self.settings.idp_slo_response_url()
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("sp", &self.settings.sp.entity_id)
            .field("idp", &self.settings.idp.entity_id)
            .field("has_signer", &self.signer.is_some())
            .field("session", &self.session)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
