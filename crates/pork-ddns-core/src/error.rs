//! Error types for the DDNS updater
//!
//! This module defines all error types used throughout the workspace.
//! Every failure is fatal to the current run: nothing here is retried.

use crate::types::DnsRecord;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration missing or invalid.
    ///
    /// Always raised before any network activity.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The provider answered, but not with a usable success response
    ///
    /// Covers non-200 statuses, a `status` field other than `SUCCESS`,
    /// and bodies missing an expected field.
    #[error("Provider error ({provider}): {message} status={status} response={body}")]
    Provider {
        /// Provider name
        provider: String,
        /// HTTP status code of the response
        status: u16,
        /// What went wrong
        message: String,
        /// Raw response body
        body: String,
    },

    /// More than one address record matches the target
    #[error("Could not update DNS record for {target} as multiple records were found: {records:?}")]
    Conflict {
        /// Fully qualified name of the target
        target: String,
        /// The offending records
        records: Vec<DnsRecord>,
    },

    /// Transport-level failure (DNS resolution, connection, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error
    pub fn provider(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            status,
            message: message.into(),
            body: body.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(target: impl Into<String>, records: Vec<DnsRecord>) -> Self {
        Self::Conflict {
            target: target.into(),
            records,
        }
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_carries_status_and_body() {
        let err = Error::provider("porkbun", 500, "Failed to get current IP", "oops");
        let msg = err.to_string();
        assert!(msg.contains("porkbun"));
        assert!(msg.contains("status=500"));
        assert!(msg.contains("response=oops"));
    }

    #[test]
    fn conflict_error_names_records() {
        let records = vec![
            DnsRecord::new("1", "home.example.com", "1.2.3.4"),
            DnsRecord::new("2", "home.example.com", "5.6.7.8"),
        ];
        let msg = Error::conflict("home.example.com", records).to_string();
        assert!(msg.contains("home.example.com"));
        assert!(msg.contains("1.2.3.4"));
        assert!(msg.contains("5.6.7.8"));
    }
}
