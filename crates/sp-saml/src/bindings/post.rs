//! HTTP-POST Binding implementation.
//!
//! The IdP posts the SSO `Response` as a base64-encoded form field.

use base64::Engine;

use crate::error::{SamlError, SamlResult};

use super::redirect::{deflate_decompress, looks_like_xml};

/// HTTP-POST binding decoder.
pub struct HttpPostBinding;

impl HttpPostBinding {
    /// Decodes a POST-bound `SAMLResponse` value into XML.
    ///
    /// Some IdPs deflate POST payloads too; the payload is inflated only when
    /// it does not decode to XML directly.
    pub fn decode_message(encoded: &str) -> SamlResult<String> {
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let raw = base64::engine::general_purpose::STANDARD.decode(cleaned)?;

        if looks_like_xml(&raw) {
            return String::from_utf8(raw)
                .map_err(|e| SamlError::XmlParse(format!("invalid UTF-8 in message: {e}")));
        }

        let inflated = deflate_decompress(&raw)?;
        String::from_utf8(inflated)
            .map_err(|e| SamlError::XmlParse(format!("invalid UTF-8 in message: {e}")))
    }
}
