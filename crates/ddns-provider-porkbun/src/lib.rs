// # Porkbun DNS Provider
//
// This crate provides a Porkbun DNS provider implementation for the DDNS system.
//
// - One HTTP request per record update, no retries, no backoff
// - Records addressed either by opaque record ID or by subdomain + type
// - HTTP timeout configured (30 seconds)
// - Dry-run mode for safe testing
//
// ## Security Requirements
//
// - API keys NEVER appear in logs
// - Provider MUST fail fast if a key is empty
//
// ## API Reference
//
// - Porkbun API v3: https://porkbun.com/api/json/v3/documentation
// - Edit by ID: POST `/dns/edit/:domain/:id`
// - Edit by name and type: POST `/dns/editByNameType/:domain/:type/[:subdomain]`
//
// Both endpoints answer `{"status": "SUCCESS"}` or
// `{"status": "ERROR", "message": "..."}`; errors usually come with a 4xx code.

use async_trait::async_trait;
use ddns_core::config::{PorkbunSettings, ProviderConfig, RecordTargets};
use ddns_core::traits::{DnsProvider, DnsProviderFactory, ProviderStatus, RecordType};
use ddns_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "porkbun";

/// Porkbun DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider logs the request it would send
/// (keys redacted) and reports success without any network I/O.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API keys.
pub struct PorkbunProvider {
    /// Account and record settings
    /// ⚠️ Holds the API keys, NEVER log the raw values
    settings: PorkbunSettings,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, skip the POST and report success
    dry_run: bool,
}

// Custom Debug implementation that hides the API keys
impl std::fmt::Debug for PorkbunProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunProvider")
            .field("settings", &self.settings)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl PorkbunProvider {
    /// Create a new Porkbun provider
    ///
    /// # Parameters
    ///
    /// - `settings`: API keys, domain and record targets
    /// - `dry_run`: If true, log updates instead of sending them
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid or the HTTP
    /// client cannot be built.
    pub fn new(mut settings: PorkbunSettings, dry_run: bool) -> Result<Self> {
        settings.validate()?;
        settings.api_base = settings.api_base.trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            settings,
            client,
            dry_run,
        })
    }

    /// Create a new Porkbun provider (production/live mode)
    pub fn new_live(settings: PorkbunSettings) -> Result<Self> {
        Self::new(settings, false)
    }

    /// Create a new Porkbun provider (dry-run mode)
    pub fn new_dry_run(settings: PorkbunSettings) -> Result<Self> {
        Self::new(settings, true)
    }

    /// Build the endpoint URL for a record update
    ///
    /// Also reports whether the endpoint expects the record type in the body
    /// (edit-by-ID does, edit-by-name-type carries it in the path).
    fn endpoint(&self, record_type: RecordType) -> Result<(String, bool)> {
        let base = &self.settings.api_base;
        let domain = &self.settings.domain;

        match &self.settings.records {
            RecordTargets::ById {
                a_record_id,
                aaaa_record_id,
            } => {
                let id = match record_type {
                    RecordType::A => a_record_id,
                    RecordType::Aaaa => aaaa_record_id,
                }
                .as_ref()
                .ok_or_else(|| {
                    Error::config(format!("No {} record ID configured", record_type))
                })?;

                Ok((format!("{}/dns/edit/{}/{}", base, domain, id), true))
            }
            RecordTargets::ByNameType { subdomain } => {
                let mut url = format!(
                    "{}/dns/editByNameType/{}/{}",
                    base,
                    domain,
                    record_type.as_str()
                );
                if !subdomain.is_empty() {
                    url.push('/');
                    url.push_str(subdomain);
                }
                Ok((url, false))
            }
        }
    }

    /// Build the request body
    fn payload(&self, record_type: RecordType, content: &str, with_type: bool) -> Value {
        let mut payload = serde_json::json!({
            "secretapikey": self.settings.secret_api_key,
            "apikey": self.settings.api_key,
            "content": content,
        });
        if with_type {
            payload["type"] = Value::from(record_type.as_str());
        }
        payload
    }
}

/// Copy of a request body that is safe to log
fn redacted(payload: &Value) -> Value {
    let mut payload = payload.clone();
    for key in ["secretapikey", "apikey"] {
        if payload.get(key).is_some() {
            payload[key] = Value::from("<REDACTED>");
        }
    }
    payload
}

#[async_trait]
impl DnsProvider for PorkbunProvider {
    /// Update a DNS record with a new address
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /dns/edit/:domain/:id
    /// {
    ///   "secretapikey": "...",
    ///   "apikey": "...",
    ///   "type": "A" or "AAAA",
    ///   "content": "1.2.3.4"
    /// }
    /// ```
    ///
    /// The reply is decoded whatever the HTTP status, because Porkbun reports
    /// failures in the body. Only undecodable replies and transport failures
    /// are errors.
    async fn update_record(&self, record_type: RecordType, content: &str) -> Result<ProviderStatus> {
        let (url, with_type) = self.endpoint(record_type)?;
        let payload = self.payload(record_type, content, with_type);

        tracing::debug!(
            "Porkbun {} record update [mode: {}]: POST {}",
            record_type,
            if self.dry_run { "DRY-RUN" } else { "LIVE" },
            url
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                redacted(&payload)
            );
            return Ok(ProviderStatus::success());
        }

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let http_status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("Failed to parse response (HTTP {}): {}", http_status, e),
            )
        })?;

        let status = ProviderStatus::from_payload(json).ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                format!("Invalid response format (HTTP {}): status is not a string", http_status),
            )
        })?;

        tracing::debug!(
            "Porkbun replied HTTP {} with status {}",
            http_status,
            status.status
        );
        Ok(status)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Porkbun providers
#[derive(Debug, Clone, Copy, Default)]
pub struct PorkbunFactory {
    dry_run: bool,
}

impl PorkbunFactory {
    /// Create a factory
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl DnsProviderFactory for PorkbunFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Porkbun(settings) => {
                if self.dry_run {
                    tracing::warn!("Porkbun provider running in DRY-RUN mode - no changes will be made");
                }
                Ok(Box::new(PorkbunProvider::new(settings.clone(), self.dry_run)?))
            }
            _ => Err(Error::config("Invalid config for Porkbun provider")),
        }
    }
}

/// Register the Porkbun provider with a registry
///
/// Providers created through the registry inherit `dry_run`.
///
/// # Example
///
/// ```rust
/// use ddns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// ddns_provider_porkbun::register(&registry, false);
/// assert!(registry.has_provider("porkbun"));
/// ```
pub fn register(registry: &ddns_core::ProviderRegistry, dry_run: bool) {
    registry.register_provider(PROVIDER_NAME, Box::new(PorkbunFactory::new(dry_run)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_id() -> RecordTargets {
        RecordTargets::ById {
            a_record_id: Some("253884100".to_string()),
            aaaa_record_id: Some("253884101".to_string()),
        }
    }

    fn settings(records: RecordTargets) -> PorkbunSettings {
        PorkbunSettings::new("pk1_test", "sk1_test", "example.com", records)
    }

    #[test]
    fn test_factory_creation() {
        let factory = PorkbunFactory::new(false);
        let provider = factory.create(&ProviderConfig::Porkbun(settings(by_id())));
        assert!(provider.is_ok());
    }

    #[test]
    fn test_factory_missing_key() {
        let factory = PorkbunFactory::new(false);
        let mut bad = settings(by_id());
        bad.secret_api_key.clear();

        let provider = factory.create(&ProviderConfig::Porkbun(bad));
        assert!(matches!(provider.err(), Some(Error::Config(_))));
    }

    #[test]
    fn test_factory_rejects_foreign_config() {
        let factory = PorkbunFactory::new(false);
        let config = ProviderConfig::Custom {
            factory: "porkbun".to_string(),
            config: serde_json::json!({}),
        };
        assert!(factory.create(&config).is_err());
    }

    #[test]
    fn test_edit_by_id_endpoint() {
        let provider = PorkbunProvider::new_live(settings(by_id())).unwrap();

        let (url, with_type) = provider.endpoint(RecordType::A).unwrap();
        assert_eq!(
            url,
            "https://api.porkbun.com/api/json/v3/dns/edit/example.com/253884100"
        );
        assert!(with_type);

        let (url, _) = provider.endpoint(RecordType::Aaaa).unwrap();
        assert!(url.ends_with("/dns/edit/example.com/253884101"));
    }

    #[test]
    fn test_missing_record_id() {
        let provider = PorkbunProvider::new_live(settings(RecordTargets::ById {
            a_record_id: Some("1".to_string()),
            aaaa_record_id: None,
        }))
        .unwrap();
        assert!(matches!(
            provider.endpoint(RecordType::Aaaa),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_edit_by_name_type_endpoint() {
        let provider = PorkbunProvider::new_live(settings(RecordTargets::ByNameType {
            subdomain: "home".to_string(),
        }))
        .unwrap();
        let (url, with_type) = provider.endpoint(RecordType::Aaaa).unwrap();
        assert_eq!(
            url,
            "https://api.porkbun.com/api/json/v3/dns/editByNameType/example.com/AAAA/home"
        );
        assert!(!with_type);

        let apex = PorkbunProvider::new_live(settings(RecordTargets::ByNameType {
            subdomain: String::new(),
        }))
        .unwrap();
        let (url, _) = apex.endpoint(RecordType::A).unwrap();
        assert!(url.ends_with("/dns/editByNameType/example.com/A"));
    }

    #[test]
    fn test_api_base_trailing_slash_from_serde() {
        let settings: PorkbunSettings = serde_json::from_value(serde_json::json!({
            "api_key": "pk1_test",
            "secret_api_key": "sk1_test",
            "domain": "example.com",
            "records": { "mode": "by_name_type", "subdomain": "home" },
            "api_base": "http://127.0.0.1:8080/api/",
        }))
        .unwrap();
        let provider = PorkbunProvider::new_live(settings).unwrap();

        let (url, _) = provider.endpoint(RecordType::A).unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/api/dns/editByNameType/example.com/A/home");
    }

    #[test]
    fn test_payload_shape() {
        let provider = PorkbunProvider::new_live(settings(by_id())).unwrap();

        let payload = provider.payload(RecordType::A, "1.2.3.4", true);
        assert_eq!(payload["apikey"], "pk1_test");
        assert_eq!(payload["secretapikey"], "sk1_test");
        assert_eq!(payload["type"], "A");
        assert_eq!(payload["content"], "1.2.3.4");

        let payload = provider.payload(RecordType::A, "1.2.3.4", false);
        assert!(payload.get("type").is_none());
    }

    #[test]
    fn test_redacted_payload() {
        let provider = PorkbunProvider::new_live(settings(by_id())).unwrap();
        let logged = redacted(&provider.payload(RecordType::A, "1.2.3.4", true)).to_string();
        assert!(!logged.contains("pk1_test"));
        assert!(!logged.contains("sk1_test"));
        assert!(logged.contains("1.2.3.4"));
    }

    #[tokio::test]
    async fn test_dry_run_reports_success_without_network() {
        // Unroutable base: any real request would fail
        let provider =
            PorkbunProvider::new_dry_run(settings(by_id()).with_api_base("http://127.0.0.1:1"))
                .unwrap();

        let status = provider.update_record(RecordType::A, "1.2.3.4").await.unwrap();
        assert!(status.is_success());
    }

    #[tokio::test]
    async fn test_register_passes_dry_run_mode() {
        let registry = ddns_core::ProviderRegistry::new();
        register(&registry, true);

        let config = ProviderConfig::Porkbun(settings(by_id()).with_api_base("http://127.0.0.1:1"));
        let provider = registry.create_provider(&config).unwrap();

        // Dry-run never reaches the unroutable base
        let status = provider.update_record(RecordType::Aaaa, "2001:db8::1").await.unwrap();
        assert!(status.is_success());
    }

    #[test]
    fn test_provider_name() {
        let provider = PorkbunProvider::new_live(settings(by_id())).unwrap();
        assert_eq!(provider.provider_name(), "porkbun");
    }

    #[test]
    fn test_api_keys_not_exposed_in_debug() {
        let provider = PorkbunProvider::new_live(PorkbunSettings::new(
            "pk1_secret_12345",
            "sk1_secret_67890",
            "example.com",
            by_id(),
        ))
        .unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("pk1_secret_12345"));
        assert!(!debug_str.contains("sk1_secret_67890"));
        assert!(debug_str.contains("PorkbunProvider"));
    }
}
