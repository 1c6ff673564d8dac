//! SAML 2.0 service provider.
//!
//! This crate drives the SP side of the Web Browser SSO and Single Logout
//! profiles against one configured IdP:
//!
//! - **SSO initiate** - build an `AuthnRequest` and send the browser to the IdP
//! - **SSO consume** - validate the POST-bound `Response` and populate the
//!   authentication state
//! - **SLO initiate** - build a `LogoutRequest` for the IdP
//! - **SLO consume** - process either a `LogoutResponse` to our request, or
//!   an IdP-initiated `LogoutRequest` that we answer
//! - **Redirect-binding signatures** - sign and verify the canonical query
//!   string
//!
//! # Architecture
//!
//! - [`auth`] - the [`ServiceProvider`] facade
//! - [`messages`] - message builders and validators
//! - [`types`] - SAML protocol data types
//! - [`bindings`] - HTTP-Redirect and HTTP-POST encodings
//! - [`signature`] - redirect-binding signatures and the XML signature seam
//! - [`settings`] - SP and IdP configuration
//! - [`context`], [`dispatch`], [`session`] - the capabilities the web
//!   layer provides: the inbound request, redirects and session termination
//! - [`state`] - the operation trace and error record
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sp_saml::{RequestContext, ServiceProvider, Settings};
//!
//! let settings = Arc::new(Settings::load("saml.toml")?);
//! let mut sp = ServiceProvider::new(settings)?;
//!
//! sp.process_response(&RequestContext::from_post_form(body), Some(&request_id))?;
//! if sp.errors().is_empty() && sp.is_authenticated() {
//!     println!("hello {:?}", sp.name_id());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod bindings;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod session;
pub mod settings;
pub mod signature;
pub mod state;
pub mod types;

pub use auth::{LoginOptions, LogoutOptions, ServiceProvider, SloOptions};
pub use context::{CurrentUrlProvider, RequestContext, StaticCurrentUrl};
pub use dispatch::{PendingRedirect, Redirector};
pub use error::{ErrorCode, SamlError, SamlResult, ValidationError};
pub use session::{AuthenticationState, ClearLocalSession, SessionTerminator};
pub use settings::Settings;
pub use signature::{KeySigner, RsaKeySigner, SignatureAlgorithm, XmlSignatureVerifier};
pub use types::*;
