//! Redirect dispatch.
//!
//! Initiate operations end by handing a URL to a [`Redirector`]. The web
//! layer decides what a redirect means (a 302, a header on a pending
//! response, a test recorder); the facade only calls it.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::SamlResult;

/// Performs the side-effecting redirect.
pub trait Redirector: Send {
    /// Redirects the user agent to `url`.
    fn redirect(&mut self, url: &str) -> SamlResult<()>;
}

/// Default redirector: records the URL for the web layer to pick up.
///
/// Clones share the same slot, so the caller can keep one handle and give
/// another to the facade.
#[derive(Debug, Clone, Default)]
pub struct PendingRedirect {
    location: Arc<Mutex<Option<String>>>,
}

impl PendingRedirect {
    /// Creates an empty pending redirect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last dispatched URL.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.location.lock().clone()
    }

    /// Takes the last dispatched URL, leaving the slot empty.
    pub fn take(&self) -> Option<String> {
        self.location.lock().take()
    }
}

impl Redirector for PendingRedirect {
    fn redirect(&mut self, url: &str) -> SamlResult<()> {
        debug!("Recording pending redirect");
        *self.location.lock() = Some(url.to_string());
        Ok(())
    }
}

impl<F> Redirector for F
where
    F: FnMut(&str) -> SamlResult<()> + Send,
{
    fn redirect(&mut self, url: &str) -> SamlResult<()> {
        self(url)
    }
}
