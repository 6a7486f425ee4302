// # DNS Provider Trait
//
// Defines the interface for writing DNS records via provider APIs.
//
// ## Implementations
//
// - Porkbun: `ddns-provider-porkbun` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let status = provider.update_record(RecordType::A, "192.168.1.1").await?;
//     assert!(status.is_success());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status literal providers use to confirm a write
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// DNS record type written by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported by a provider for a single record update
///
/// Only `status` decides the outcome. `payload` keeps the whole reply so
/// failures can be logged with full provider detail.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStatus {
    /// Provider status string (`"SUCCESS"` on success)
    pub status: String,
    /// Complete decoded response body
    pub payload: serde_json::Value,
}

impl ProviderStatus {
    /// Build a status from a decoded response body
    ///
    /// Returns `None` when the body has no string `status` field.
    pub fn from_payload(payload: serde_json::Value) -> Option<Self> {
        let status = payload.get("status")?.as_str()?.to_string();
        Some(Self { status, payload })
    }

    /// A synthetic success, used where no provider round-trip happens
    pub fn success() -> Self {
        Self {
            status: SUCCESS_STATUS.to_string(),
            payload: serde_json::json!({ "status": SUCCESS_STATUS }),
        }
    }

    /// Whether the provider confirmed the update
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Trait for DNS provider implementations
///
/// This trait defines the interface for updating DNS records.
/// Implementations must handle the specifics of each provider's API.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
/// The endpoint may serve many requests concurrently through one instance.
///
/// # Contract
///
/// - One outbound API call per invocation, no retries
/// - Which record gets written is decided by the provider's own configuration
/// - A reply that decodes is returned as `Ok`, even when it reports failure;
///   judging the status is the caller's job
/// - Transport and decoding failures are returned as `Err`
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Point the configured record of `record_type` at `content`
    ///
    /// # Parameters
    ///
    /// - `record_type`: Which record (A or AAAA) to write
    /// - `content`: The new address, already validated for the record type
    ///
    /// # Returns
    ///
    /// - `Ok(ProviderStatus)`: The provider's decoded reply
    /// - `Err(Error)`: If the provider could not be reached or understood
    async fn update_record(
        &self,
        record_type: RecordType,
        content: &str,
    ) -> Result<ProviderStatus, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
