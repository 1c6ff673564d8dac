//! SAML Status types.

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use super::status_codes;

/// SAML protocol status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// The status code.
    pub status_code: StatusCode,

    /// Optional status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl Status {
    /// Creates a success status.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status_code: StatusCode::new(status_codes::SUCCESS),
            status_message: None,
        }
    }

    /// Creates a status with the given top-level code.
    #[must_use]
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::new(code),
            status_message: None,
        }
    }

    /// Returns true if this status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code.is_success()
    }

    /// Sets the status message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    /// Serializes this status as a `samlp:Status` element.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let message = self
            .status_message
            .as_deref()
            .map(|m| format!("<samlp:StatusMessage>{}</samlp:StatusMessage>", escape(m)))
            .unwrap_or_default();
        format!("<samlp:Status>{}{message}</samlp:Status>", self.status_code.to_xml())
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::success()
    }
}

/// SAML status code. Codes nest: a top-level code with an optional sub-code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
    /// The status code URI value.
    pub value: String,

    /// Optional nested status code providing more detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Box<StatusCode>>,
}

impl StatusCode {
    /// Creates a new status code with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            status_code: None,
        }
    }

    /// Adds a sub-status code.
    #[must_use]
    pub fn with_sub_status(mut self, sub: StatusCode) -> Self {
        self.status_code = Some(Box::new(sub));
        self
    }

    /// Returns true if this is a success status code.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.value == status_codes::SUCCESS
    }

    /// Returns the sub-status code value if present.
    #[must_use]
    pub fn sub_status_value(&self) -> Option<&str> {
        self.status_code.as_ref().map(|s| s.value.as_str())
    }

    fn to_xml(&self) -> String {
        match self.status_code {
            Some(ref sub) => format!(
                r#"<samlp:StatusCode Value="{}">{}</samlp:StatusCode>"#,
                escape(&self.value),
                sub.to_xml()
            ),
            None => format!(r#"<samlp:StatusCode Value="{}" />"#, escape(&self.value)),
        }
    }
}
