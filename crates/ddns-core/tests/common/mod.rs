//! Test doubles and common utilities for update contract tests
//!
//! This module provides a scriptable provider that records every call
//! without touching the network.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, ProviderStatus, RecordType};
use ddns_core::{Credentials, UpdateHandler};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const USER: &str = "a";
pub const PASSWORD: &str = "b";

/// Scripted reply for one provider call
#[derive(Debug, Clone)]
pub enum Reply {
    /// Provider answers with this status string
    Status(&'static str),
    /// Provider cannot be reached
    Unreachable,
}

/// A mock DnsProvider that tracks calls and replays scripted replies
///
/// Once the script runs out every call succeeds.
pub struct MockDnsProvider {
    /// Call counter for update_record()
    update_call_count: Arc<AtomicUsize>,
    /// Recorded (record type, content) pairs, in call order
    calls: Arc<Mutex<Vec<(RecordType, String)>>>,
    /// Replies to hand out, front first
    script: Mutex<VecDeque<Reply>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<Reply>) -> Self {
        Self {
            update_call_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            script: Mutex::new(script.into()),
        }
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Get the recorded calls
    pub fn calls(&self) -> Vec<(RecordType, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, record_type: RecordType, content: &str) -> Result<ProviderStatus> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((record_type, content.to_string()));

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Status("SUCCESS"));

        match reply {
            Reply::Status(status) => Ok(ProviderStatus::from_payload(serde_json::json!({
                "status": status,
                "message": "scripted"
            }))
            .expect("scripted payload has a status")),
            Reply::Unreachable => Err(Error::provider("mock", "connection refused")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build a handler around a shared mock provider
pub fn handler(provider: &Arc<MockDnsProvider>, require_ipv4: bool) -> UpdateHandler {
    UpdateHandler::new(
        Credentials::new(USER, PASSWORD),
        provider.clone(),
        require_ipv4,
    )
}

/// Build a decoded query string
pub fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
