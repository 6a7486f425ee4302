//! The update handler
//!
//! One request runs the whole flow: extract parameters, check credentials,
//! write the A record, then the AAAA record. Legs are strictly sequential and
//! the first failure ends the request; a skipped leg is simply never issued.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::{Credentials, UpdateHandler};
//!
//! let handler = UpdateHandler::new(Credentials::new("router", "pw"), provider, true);
//! let outcome = handler.handle(&query).await?;
//! ```

use crate::error::{Error, Result};
use crate::params::UpdateParams;
use crate::traits::{DnsProvider, ProviderStatus, RecordType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Credentials every caller must present
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Expected user name
    pub user: String,
    /// Expected password
    /// ⚠️ NEVER log this value
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Check presented credentials against the expected ones
    ///
    /// Both fields are always compared in full, so the time taken does not
    /// reveal which one differed or where.
    pub fn matches(&self, user: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(self.user.as_bytes(), user.as_bytes());
        let password_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        user_ok & password_ok
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

fn constant_time_eq(expected: &[u8], presented: &[u8]) -> bool {
    let mut diff = expected.len() ^ presented.len();
    for (i, byte) in presented.iter().enumerate() {
        let other = expected.get(i % expected.len().max(1)).copied().unwrap_or(0);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}

/// Records written by a successful request, in the order they were written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Updated record types
    pub updated: Vec<RecordType>,
}

/// Handler for inbound update requests
///
/// Holds only immutable configuration and a shared provider, so one instance
/// serves any number of concurrent requests.
pub struct UpdateHandler {
    credentials: Credentials,
    provider: Arc<dyn DnsProvider>,
    require_ipv4: bool,
}

impl UpdateHandler {
    /// Create a new handler
    ///
    /// # Parameters
    ///
    /// - `credentials`: Credentials callers must present
    /// - `provider`: Provider that writes the records
    /// - `require_ipv4`: Reject requests without an `ipv4` parameter
    pub fn new(
        credentials: Credentials,
        provider: Arc<dyn DnsProvider>,
        require_ipv4: bool,
    ) -> Self {
        Self {
            credentials,
            provider,
            require_ipv4,
        }
    }

    /// Handle one update request
    ///
    /// # Parameters
    ///
    /// - `query`: Decoded query-string parameters
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: Every supplied address was written
    /// - `Err(Error::MalformedRequest)`: Required parameters missing or invalid
    /// - `Err(Error::Unauthorized)`: Credentials did not match
    /// - `Err(Error::ProviderUpdateFailed)`: A provider write failed; later legs were skipped
    pub async fn handle(&self, query: &HashMap<String, String>) -> Result<UpdateOutcome> {
        let params = UpdateParams::from_query(query, self.require_ipv4).inspect_err(|e| {
            debug!("Rejecting update request: {}", e);
        })?;

        if !self.credentials.matches(&params.user, &params.password) {
            warn!("Rejecting update request for user '{}': invalid credentials", params.user);
            return Err(Error::Unauthorized);
        }

        let mut outcome = UpdateOutcome::default();

        if let Some(ipv4) = params.ipv4 {
            self.update(RecordType::A, &ipv4.to_string()).await?;
            outcome.updated.push(RecordType::A);
        }

        if let Some(ipv6) = params.ipv6 {
            self.update(RecordType::Aaaa, &ipv6.to_string()).await?;
            outcome.updated.push(RecordType::Aaaa);
        }

        if outcome.updated.is_empty() {
            debug!("Update request carried no addresses; nothing to do");
        }

        Ok(outcome)
    }

    /// Run one leg: write the record and judge the provider's own reply
    async fn update(&self, record_type: RecordType, content: &str) -> Result<()> {
        info!(
            "Updating {} record via {} -> {}",
            record_type,
            self.provider.provider_name(),
            content
        );

        let status = self
            .provider
            .update_record(record_type, content)
            .await
            .map_err(|e| {
                error!("{} record update did not complete: {}", record_type, e);
                Error::update_failed(record_type, e.to_string())
            })?;

        interpret_response(record_type, &status)?;

        info!("{} record updated -> {}", record_type, content);
        Ok(())
    }
}

/// Judge a provider reply
///
/// Anything other than `"SUCCESS"` is a failure. The full payload is logged
/// here and only here; callers of the endpoint never see it.
pub fn interpret_response(record_type: RecordType, status: &ProviderStatus) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    error!(
        "Provider rejected {} record update: {}",
        record_type, status.payload
    );
    Err(Error::update_failed(
        record_type,
        format!("provider status {}", status.status),
    ))
}
