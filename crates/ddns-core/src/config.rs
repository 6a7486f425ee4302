//! Configuration types for the DDNS system
//!
//! This module defines all configuration structures used throughout the crate.
//! Values are provisioned once (the daemon reads them from the environment)
//! and handed to the handler and provider at construction time.

use crate::handler::Credentials;
use crate::traits::RecordType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Porkbun JSON API base URL
pub const PORKBUN_API_BASE: &str = "https://api.porkbun.com/api/json/v3";

/// Main updater configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Credentials callers must present
    pub credentials: Credentials,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Reject requests that carry no `ipv4` parameter
    #[serde(default = "default_require_ipv4")]
    pub require_ipv4: bool,
}

impl UpdaterConfig {
    /// Create a new configuration
    pub fn new(credentials: Credentials, provider: ProviderConfig) -> Self {
        Self {
            credentials,
            provider,
            require_ipv4: default_require_ipv4(),
        }
    }

    /// Set whether `ipv4` is mandatory
    pub fn with_require_ipv4(mut self, require_ipv4: bool) -> Self {
        self.require_ipv4 = require_ipv4;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.credentials.user.is_empty() {
            return Err(crate::Error::config("Expected user cannot be empty"));
        }
        if self.credentials.password.is_empty() {
            return Err(crate::Error::config("Expected password cannot be empty"));
        }

        self.provider.validate()?;

        if self.require_ipv4 && !self.provider.targets(RecordType::A) {
            return Err(crate::Error::config(
                "IPv4 is required but no A record is configured",
            ));
        }

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Porkbun provider
    Porkbun(PorkbunSettings),

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Porkbun(settings) => settings.validate(),
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Porkbun(_) => "porkbun",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }

    /// Whether a record of `record_type` can be written with this configuration
    ///
    /// Custom providers are assumed to handle both record types.
    pub fn targets(&self, record_type: RecordType) -> bool {
        match self {
            ProviderConfig::Porkbun(settings) => settings.records.supports(record_type),
            ProviderConfig::Custom { .. } => true,
        }
    }
}

/// Porkbun account and record settings
#[derive(Clone, Serialize, Deserialize)]
pub struct PorkbunSettings {
    /// API key
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// Secret API key
    /// ⚠️ NEVER log this value
    pub secret_api_key: String,

    /// Registered domain (e.g., "example.com")
    pub domain: String,

    /// How the records to update are addressed
    pub records: RecordTargets,

    /// API base URL; a trailing slash is dropped before use
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl PorkbunSettings {
    /// Create settings against the public Porkbun API
    pub fn new(
        api_key: impl Into<String>,
        secret_api_key: impl Into<String>,
        domain: impl Into<String>,
        records: RecordTargets,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
            domain: domain.into(),
            records,
            api_base: default_api_base(),
        }
    }

    /// Override the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config("Porkbun API key cannot be empty"));
        }
        if self.secret_api_key.is_empty() {
            return Err(crate::Error::config("Porkbun secret API key cannot be empty"));
        }
        validate_domain_name(&self.domain)?;

        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Porkbun API base must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            )));
        }

        self.records.validate()
    }
}

// Custom Debug implementation that hides the API keys
impl fmt::Debug for PorkbunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PorkbunSettings")
            .field("api_key", &"<REDACTED>")
            .field("secret_api_key", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("records", &self.records)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// How records are addressed at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecordTargets {
    /// Opaque provider record IDs
    ById {
        /// ID of the A record
        a_record_id: Option<String>,
        /// ID of the AAAA record
        aaaa_record_id: Option<String>,
    },

    /// Subdomain plus record type; the provider resolves the record
    ByNameType {
        /// Subdomain label(s); empty for the apex
        subdomain: String,
    },
}

impl RecordTargets {
    /// Whether a record of `record_type` is addressable
    pub fn supports(&self, record_type: RecordType) -> bool {
        match self {
            RecordTargets::ById {
                a_record_id,
                aaaa_record_id,
            } => match record_type {
                RecordType::A => a_record_id.is_some(),
                RecordType::Aaaa => aaaa_record_id.is_some(),
            },
            RecordTargets::ByNameType { .. } => true,
        }
    }

    /// Validate the targets
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RecordTargets::ById {
                a_record_id,
                aaaa_record_id,
            } => {
                if a_record_id.is_none() && aaaa_record_id.is_none() {
                    return Err(crate::Error::config(
                        "At least one of the A or AAAA record IDs must be configured",
                    ));
                }
                for id in [a_record_id, aaaa_record_id].into_iter().flatten() {
                    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                        return Err(crate::Error::config(format!(
                            "Invalid record ID: '{}'",
                            id
                        )));
                    }
                }
                Ok(())
            }
            RecordTargets::ByNameType { subdomain } => {
                if subdomain.is_empty() {
                    Ok(())
                } else {
                    validate_domain_name(subdomain)
                }
            }
        }
    }
}

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        // Alphanumeric and hyphen; '*' and '_' appear in real subdomains too
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '*')
        {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_require_ipv4() -> bool {
    true
}

fn default_api_base() -> String {
    PORKBUN_API_BASE.to_string()
}
