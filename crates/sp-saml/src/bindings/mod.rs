//! SAML bindings implementation.
//!
//! The service provider speaks two bindings:
//!
//! - **HTTP-Redirect** for outbound `AuthnRequest`/`LogoutRequest`/
//!   `LogoutResponse` and inbound logout messages. Messages are deflated,
//!   base64-encoded and carried in the query string.
//! - **HTTP-POST** for the inbound SSO `Response`, base64-encoded in a form
//!   field.

mod post;
mod redirect;

pub use post::*;
pub use redirect::*;

use std::borrow::Cow;

/// SAML message type for binding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlMessageType {
    /// Request message (`AuthnRequest`, `LogoutRequest`).
    Request,
    /// Response message (`Response`, `LogoutResponse`).
    Response,
}

impl SamlMessageType {
    /// Returns the query/form parameter name for this message type.
    #[must_use]
    pub const fn form_param(&self) -> &'static str {
        match self {
            Self::Request => "SAMLRequest",
            Self::Response => "SAMLResponse",
        }
    }
}

/// Percent-encoding applied to redirect-binding query values.
///
/// Both the signed string and the dispatched URL use the same encoding, so
/// the IdP recomputes exactly the bytes that were signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlEncoding {
    /// RFC 3986: unreserved characters are kept, space becomes `%20`.
    Rfc3986,
    /// `application/x-www-form-urlencoded`: space becomes `+` and `~` is
    /// escaped.
    #[default]
    Form,
}

impl UrlEncoding {
    /// Selects the encoding from the `lowercase_url_encoding` policy flag.
    ///
    /// The flag off gives form encoding, which most IdPs sign with. The flag
    /// on gives RFC 3986, which ADFS expects.
    #[must_use]
    pub const fn from_policy(lowercase_url_encoding: bool) -> Self {
        if lowercase_url_encoding {
            Self::Rfc3986
        } else {
            Self::Form
        }
    }

    /// Percent-encodes `value`.
    #[must_use]
    pub fn encode<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let encoded = urlencoding::encode(value);
        match self {
            Self::Rfc3986 => encoded,
            Self::Form if encoded.contains("%20") || encoded.contains('~') => {
                Cow::Owned(encoded.replace("%20", "+").replace('~', "%7E"))
            }
            Self::Form => encoded,
        }
    }
}
