//! Per-exchange bookkeeping: the operation trace and the error record.

use chrono::{DateTime, Utc};

use crate::error::{ErrorCode, ValidationError};

/// Raw record of the last protocol exchange.
///
/// Every operation overwrites the fields it touches, whether it succeeds or
/// fails, so the exchange can be audited afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationTrace {
    /// ID of the last request built by this SP.
    pub last_request_id: Option<String>,
    /// ID of the last inbound message accepted.
    pub last_message_id: Option<String>,
    /// ID of the assertion in the last accepted SSO response.
    pub last_assertion_id: Option<String>,
    /// `NotOnOrAfter` of that assertion's bearer confirmation.
    pub last_assertion_not_on_or_after: Option<DateTime<Utc>>,
    /// XML of the last request: built by this SP, or the inbound
    /// LogoutRequest of an IdP-initiated logout.
    pub last_request_xml: Option<String>,
    /// XML of the last response: received by this SP, or the LogoutResponse
    /// it sent back.
    pub last_response_xml: Option<String>,
}

/// Protocol-validation failures of the last consume operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRecord {
    errors: Vec<ErrorCode>,
    last_error: Option<ValidationError>,
}

impl ErrorRecord {
    /// Empties the record. Called at the start of every consume operation.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.last_error = None;
    }

    /// Appends `code` and remembers `cause` as the last error.
    pub fn record(&mut self, code: ErrorCode, cause: Option<ValidationError>) {
        self.errors.push(code);
        if cause.is_some() {
            self.last_error = cause;
        }
    }

    /// Error codes in the order they were recorded.
    #[must_use]
    pub fn errors(&self) -> &[ErrorCode] {
        &self.errors
    }

    /// The structured cause of the last failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&ValidationError> {
        self.last_error.as_ref()
    }

    /// Human-readable reason for the last failure.
    #[must_use]
    pub fn last_error_reason(&self) -> Option<String> {
        self.last_error.as_ref().map(ToString::to_string)
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
