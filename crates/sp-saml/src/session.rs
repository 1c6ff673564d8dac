//! Local authentication state and its termination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SamlResult;
use crate::types::Attributes;

/// What the SP knows about the authenticated principal.
///
/// Only a successful SSO consume populates this; failures never touch it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationState {
    /// Whether a valid SSO response has been consumed.
    pub authenticated: bool,
    /// Subject NameID value.
    pub name_id: Option<String>,
    /// Subject NameID format URI.
    pub name_id_format: Option<String>,
    /// NameID `NameQualifier`.
    pub name_id_name_qualifier: Option<String>,
    /// NameID `SPNameQualifier`.
    pub name_id_sp_name_qualifier: Option<String>,
    /// Attributes keyed by `Name`.
    pub attributes: Attributes,
    /// Attributes keyed by `FriendlyName`.
    pub attributes_with_friendly_name: Attributes,
    /// `SessionIndex` from the AuthnStatement.
    pub session_index: Option<String>,
    /// `SessionNotOnOrAfter` from the AuthnStatement.
    pub session_expiration: Option<DateTime<Utc>>,
}

impl AuthenticationState {
    /// Returns to the unauthenticated state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Ends the local session when a logout completes.
///
/// Invoked inline by SLO consume. Errors abort the operation and are
/// returned to the caller.
pub trait SessionTerminator {
    /// Terminates the local session described by `session`.
    fn terminate(&mut self, session: &mut AuthenticationState) -> SamlResult<()>;
}

/// Default termination: clears the SP's authentication state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearLocalSession;

impl SessionTerminator for ClearLocalSession {
    fn terminate(&mut self, session: &mut AuthenticationState) -> SamlResult<()> {
        info!(
            "Clearing local session{}",
            session
                .session_index
                .as_deref()
                .map(|idx| format!(" {idx}"))
                .unwrap_or_default()
        );
        session.clear();
        Ok(())
    }
}

impl<F> SessionTerminator for F
where
    F: FnMut(&mut AuthenticationState) -> SamlResult<()>,
{
    fn terminate(&mut self, session: &mut AuthenticationState) -> SamlResult<()> {
        self(session)
    }
}
