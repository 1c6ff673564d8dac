//! End-to-end tests for the SAML service provider.
//!
//! Every scenario drives the public `ServiceProvider` facade with inbound
//! messages built in `common`, the way a web layer would.

mod common;
mod signatures;
mod slo_flow;
mod sso_flow;
