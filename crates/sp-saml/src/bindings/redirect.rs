//! HTTP-Redirect Binding implementation.
//!
//! Messages travel in URL query parameters, DEFLATE-compressed (raw, no zlib
//! header) and base64-encoded.

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{SamlError, SamlResult};

use super::UrlEncoding;

/// Upper bound on the size of an inflated message.
pub const MAX_INFLATED_SIZE: usize = 1024 * 1024;

/// HTTP-Redirect binding encoder/decoder.
pub struct HttpRedirectBinding;

impl HttpRedirectBinding {
    /// Encodes an XML message for a redirect query parameter.
    ///
    /// The returned value is base64 but not yet percent-encoded.
    pub fn encode_message(xml: &str, compress: bool) -> SamlResult<String> {
        let bytes = if compress {
            deflate_compress(xml.as_bytes())?
        } else {
            xml.as_bytes().to_vec()
        };
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Decodes a (percent-decoded) redirect query parameter into XML.
    ///
    /// Senders are not required to compress, so plain base64 is accepted when
    /// inflation fails. A payload that inflates past [`MAX_INFLATED_SIZE`] is
    /// rejected.
    pub fn decode_message(encoded: &str) -> SamlResult<String> {
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let raw = base64::engine::general_purpose::STANDARD.decode(cleaned)?;

        let bytes = match deflate_decompress(&raw) {
            Ok(inflated) if looks_like_xml(&inflated) => inflated,
            Err(err @ SamlError::MessageTooLarge(_)) => return Err(err),
            _ => raw,
        };

        String::from_utf8(bytes)
            .map_err(|e| SamlError::XmlParse(format!("invalid UTF-8 in message: {e}")))
    }

    /// Builds a redirect URL from a base URL and ordered query parameters.
    ///
    /// Keys and values are percent-encoded with `encoding`. A base URL that
    /// already carries a query string is extended with `&`.
    #[must_use]
    pub fn build_url(base: &str, params: &[(String, String)], encoding: UrlEncoding) -> String {
        if params.is_empty() {
            return base.to_string();
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", encoding.encode(key), encoding.encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}{query}")
    }

    /// Returns the raw, still percent-encoded value of `name` in `query`.
    ///
    /// Used to verify signatures over the parameters as received.
    #[must_use]
    pub fn raw_query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
        query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

/// Returns true if the first non-whitespace byte opens an XML tag.
pub(crate) fn looks_like_xml(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'<')
}

/// Compresses data using DEFLATE (raw, no zlib header).
pub(crate) fn deflate_compress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SamlError::Deflate(format!("compression error: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SamlError::Deflate(format!("compression finish error: {e}")))
}

/// Decompresses raw DEFLATE data, stopping at [`MAX_INFLATED_SIZE`].
pub(crate) fn deflate_decompress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data).take(MAX_INFLATED_SIZE as u64 + 1);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| SamlError::Deflate(format!("decompression error: {e}")))?;
    if decompressed.len() > MAX_INFLATED_SIZE {
        return Err(SamlError::MessageTooLarge(MAX_INFLATED_SIZE));
    }
    Ok(decompressed)
}
