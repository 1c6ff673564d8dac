//! End-to-end SSO and SLO scenarios for the SAML service provider.
//!
//! The scenarios live under `tests/`; this crate has no library surface.
