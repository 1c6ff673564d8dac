//! SAML 2.0 types and data structures.
//!
//! Outbound protocol messages (`AuthnRequest`, `LogoutRequest`,
//! `LogoutResponse`) and the pieces they are made of. Each message knows how
//! to render itself as XML; parsing of inbound messages lives in
//! [`crate::messages`].

mod attributes;
mod authn_request;
mod constants;
mod logout;
mod name_id;
mod status;

pub use attributes::*;
pub use authn_request::*;
pub use constants::*;
pub use logout::*;
pub use name_id::*;
pub use status::*;

use chrono::{DateTime, SecondsFormat, Utc};

/// Generates a fresh message identifier.
///
/// Identifiers must be valid `xs:ID` values, so they never start with a digit.
#[must_use]
pub fn generate_id() -> String {
    format!("_{}", uuid::Uuid::new_v4().simple())
}

/// Formats a timestamp as a SAML `xs:dateTime` in UTC.
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a SAML `xs:dateTime`.
#[must_use]
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
