//! Inbound request context.
//!
//! The facade never reads ambient transport state. Whatever the web layer
//! received is captured here once and passed into each consume operation.

use std::borrow::Cow;

use url::form_urlencoded;

use crate::bindings::HttpRedirectBinding;
use crate::types::SamlBinding;

/// Supplies the URL of the current request without its query string.
///
/// Used as the default RelayState when the caller does not pass `return_to`.
pub trait CurrentUrlProvider: Send + Sync {
    /// Returns scheme, host, port and path of the current request.
    fn current_url(&self) -> String;
}

/// A fixed current URL, with any query string or fragment stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCurrentUrl(String);

impl StaticCurrentUrl {
    /// Wraps `url`, dropping its query string and fragment.
    #[must_use]
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(strip_query(url.as_ref()))
    }
}

impl CurrentUrlProvider for StaticCurrentUrl {
    fn current_url(&self) -> String {
        self.0.clone()
    }
}

/// Returns `url` without query string or fragment.
#[must_use]
pub fn strip_query(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Everything the SP needs from one inbound HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Binding the message arrived on, if any.
    pub binding: Option<SamlBinding>,
    /// Decoded `SAMLRequest` parameter.
    pub saml_request: Option<String>,
    /// Decoded `SAMLResponse` parameter.
    pub saml_response: Option<String>,
    /// Decoded `RelayState` parameter.
    pub relay_state: Option<String>,
    /// Decoded `SigAlg` parameter.
    pub sig_alg: Option<String>,
    /// Decoded `Signature` parameter.
    pub signature: Option<String>,
    /// Raw query string, exactly as received, for signature verification.
    pub raw_query: Option<String>,
    /// URL of the current request, without query string.
    pub current_url: Option<String>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from an HTTP-Redirect query string.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut ctx = Self {
            binding: Some(SamlBinding::HttpRedirect),
            raw_query: Some(query.to_string()),
            ..Self::default()
        };
        ctx.absorb(form_urlencoded::parse(query.as_bytes()));
        ctx
    }

    /// Builds a context from an HTTP-POST `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn from_post_form(body: &str) -> Self {
        let mut ctx = Self {
            binding: Some(SamlBinding::HttpPost),
            ..Self::default()
        };
        ctx.absorb(form_urlencoded::parse(body.as_bytes()));
        ctx
    }

    /// Sets the URL of the current request. Any query string is dropped.
    #[must_use]
    pub fn with_current_url(mut self, url: impl AsRef<str>) -> Self {
        self.current_url = Some(strip_query(url.as_ref()));
        self
    }

    /// Returns the raw, still percent-encoded value of a query parameter.
    #[must_use]
    pub fn raw_param(&self, name: &str) -> Option<&str> {
        self.raw_query
            .as_deref()
            .and_then(|q| HttpRedirectBinding::raw_query_param(q, name))
    }

    /// The POST-bound `SAMLResponse`, if this request carried one.
    #[must_use]
    pub fn post_response(&self) -> Option<&str> {
        match self.binding {
            Some(SamlBinding::HttpPost) => self.saml_response.as_deref(),
            _ => None,
        }
    }

    fn absorb<'a>(&mut self, pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) {
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "SAMLRequest" => &mut self.saml_request,
                "SAMLResponse" => &mut self.saml_response,
                "RelayState" => &mut self.relay_state,
                "SigAlg" => &mut self.sig_alg,
                "Signature" => &mut self.signature,
                _ => continue,
            };
            // First occurrence wins.
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
    }
}

impl CurrentUrlProvider for RequestContext {
    fn current_url(&self) -> String {
        self.current_url.clone().unwrap_or_default()
    }
}
