//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.
//!
//! Three variants are user-visible conditions of the update endpoint
//! ([`Error::MalformedRequest`], [`Error::Unauthorized`],
//! [`Error::ProviderUpdateFailed`]). The rest describe failures inside
//! providers or configuration and surface to callers as a provider failure.

use crate::traits::RecordType;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Required query parameters are missing or unusable
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Caller credentials did not match the configured ones
    #[error("Invalid credentials")]
    Unauthorized,

    /// The provider did not confirm a record update
    ///
    /// Non-success statuses and unreachable providers both end up here.
    #[error("Provider update failed for {record_type} record: {message}")]
    ProviderUpdateFailed {
        /// Record that was being written
        record_type: RecordType,
        /// Diagnostic detail (never shown to the caller)
        message: String,
    },

    /// Provider-specific error (transport, decoding, unexpected payload)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a malformed request error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Create a provider update failure for one record
    pub fn update_failed(record_type: RecordType, message: impl Into<String>) -> Self {
        Self::ProviderUpdateFailed {
            record_type,
            message: message.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
